//! # Error Types
//!
//! Store-level error vocabulary shared by the caches and the persistence
//! layer. Every error names the store that raised it, the failure kind, and
//! the offending key.

use std::fmt;
use thiserror::Error;

/// Failure kinds raised by caches and stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorKind {
    /// No entry for the key.
    KeyNotFound,
    /// The requested index predates the retained window.
    TooLate,
    /// The requested index is past the last recorded index.
    PassedIndex,
    /// A write would leave a gap in a strictly increasing log.
    SkippedIndex,
    /// No root for the participant.
    NoRoot,
    /// The participant is not in the roster.
    UnknownParticipant,
    /// The log is empty.
    Empty,
    /// An immutable entry already exists for the key.
    KeyAlreadyExists,
    /// The store was expected to be empty.
    NonEmpty,
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StoreErrorKind::KeyNotFound => "Not Found",
            StoreErrorKind::TooLate => "Too Late",
            StoreErrorKind::PassedIndex => "Passed Index",
            StoreErrorKind::SkippedIndex => "Skipped Index",
            StoreErrorKind::NoRoot => "No Root",
            StoreErrorKind::UnknownParticipant => "Unknown Participant",
            StoreErrorKind::Empty => "Empty",
            StoreErrorKind::KeyAlreadyExists => "Key Already Exists",
            StoreErrorKind::NonEmpty => "Non Empty",
        };
        f.write_str(text)
    }
}

/// Error raised by a named cache or store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{store}, {key}, {kind}")]
pub struct StoreError {
    /// Name of the cache or store that failed.
    pub store: String,
    /// What went wrong.
    pub kind: StoreErrorKind,
    /// The key involved, rendered as text.
    pub key: String,
}

impl StoreError {
    /// Create a new store error.
    pub fn new(store: impl Into<String>, kind: StoreErrorKind, key: impl Into<String>) -> Self {
        Self {
            store: store.into(),
            kind,
            key: key.into(),
        }
    }

    /// Check the failure kind.
    pub fn is(&self, kind: StoreErrorKind) -> bool {
        self.kind == kind
    }
}
