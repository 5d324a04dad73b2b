//! Event orderings
//!
//! - [`by_topological_order`]: insertion index only. A partial order; two
//!   nodes may insert concurrent events in different orders.
//! - [`by_lamport_timestamp`]: a total order. Lamport timestamp first
//!   (unset sorts as -1), then the signature bytes read as a big-endian
//!   unsigned integer. Depends only on event content, so every node sorts a
//!   given set of events identically.
//! - [`frame_event_order`]: the same total order over frame events, whose
//!   timestamps are always assigned.

use super::event::Event;
use super::frame::FrameEvent;
use shared_crypto::decode_hex;
use std::borrow::Borrow;
use std::cmp::Ordering;

/// Timestamp used for events without one.
const UNSET_TIMESTAMP: i64 = -1;

pub fn by_topological_order(a: &Event, b: &Event) -> Ordering {
    a.topological_index.cmp(&b.topological_index)
}

pub fn by_lamport_timestamp(a: &Event, b: &Event) -> Ordering {
    let at = a.lamport_timestamp().unwrap_or(UNSET_TIMESTAMP);
    let bt = b.lamport_timestamp().unwrap_or(UNSET_TIMESTAMP);
    at.cmp(&bt)
        .then_with(|| compare_signatures(a.signature(), b.signature()))
}

pub fn frame_event_order(a: &FrameEvent, b: &FrameEvent) -> Ordering {
    a.lamport_timestamp
        .cmp(&b.lamport_timestamp)
        .then_with(|| compare_signatures(a.core.signature(), b.core.signature()))
}

/// Stable sort by insertion index.
pub fn sort_topological<E: Borrow<Event>>(events: &mut [E]) {
    events.sort_by(|a, b| by_topological_order(a.borrow(), b.borrow()));
}

pub fn sort_lamport<E: Borrow<Event>>(events: &mut [E]) {
    events.sort_by(|a, b| by_lamport_timestamp(a.borrow(), b.borrow()));
}

pub fn sort_frame_events(events: &mut [FrameEvent]) {
    events.sort_by(frame_event_order);
}

/// Compare two textual signatures as unsigned big-endian integers.
///
/// Text that does not decode compares as zero.
fn compare_signatures(a: &str, b: &str) -> Ordering {
    let a = decode_hex(a).unwrap_or_default();
    let b = decode_hex(b).unwrap_or_default();
    let a = strip_leading_zeros(&a);
    let b = strip_leading_zeros(&b);
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}
