//! # Test Fixtures
//!
//! A `TestNode` is one simulated participant: its key, its roster entry and
//! its own caches. Nodes never share caches; everything they learn about
//! each other travels as wire events.

use hg_01_consensus_types::{
    Block, BlockSignature, CommitHandler, CommitResponse, Event, Frame, FrameEvent,
    InternalTransaction, ModelResult, TransactionType, WireEvent,
};
use hg_02_consensus_caches::{CacheConfig, ConsensusCaches};
use shared_crypto::{KeccakHasher, Secp256k1KeyPair};
use shared_types::{Peer, PeerSet};
use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a `tracing` subscriber honouring `RUST_LOG`. Safe to call from
/// every test.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub struct TestNode {
    pub keypair: Secp256k1KeyPair,
    pub peer: Peer,
    pub caches: ConsensusCaches,
    /// Hex of the last event this node created.
    pub head: Option<String>,
    pub next_index: i64,
}

impl TestNode {
    pub fn new(moniker: &str) -> Self {
        let keypair = Secp256k1KeyPair::generate();
        let peer = Peer::new(
            keypair.public_key().to_identity(),
            format!("127.0.0.1:{}", 1337 + moniker.len()),
            moniker,
        );
        let caches = ConsensusCaches::new(&CacheConfig::default())
            .expect("default cache config is valid");
        Self {
            keypair,
            peer,
            caches,
            head: None,
            next_index: 0,
        }
    }

    /// Create, sign and index the node's next event.
    ///
    /// `other_parent` is `(creator, index, hex)` of the event being
    /// acknowledged, if any.
    pub fn create_event(
        &mut self,
        transactions: Vec<Vec<u8>>,
        internal_transactions: Vec<InternalTransaction>,
        block_signatures: Vec<BlockSignature>,
        other_parent: Option<(&Peer, i64, &str)>,
    ) -> Event {
        let index = self.next_index;
        let parents = match (&self.head, other_parent) {
            (None, None) => vec![],
            (head, other) => vec![
                head.clone().unwrap_or_default(),
                other.map(|(_, _, hex)| hex.to_string()).unwrap_or_default(),
            ],
        };

        let mut event = Event::new(
            transactions,
            internal_transactions,
            block_signatures,
            parents,
            self.keypair.public_key().as_bytes().to_vec(),
            index,
        );
        event.set_wire_info(
            index - 1,
            other_parent.map_or(0, |(peer, _, _)| peer.id()),
            other_parent.map_or(-1, |(_, other_index, _)| other_index),
            self.peer.id(),
        );
        event.sign(&self.keypair).unwrap();

        self.caches.add_event(&event).unwrap();
        self.head = Some(event.hex().unwrap().to_string());
        self.next_index += 1;
        event
    }

    /// Decode, verify and index an event gossiped by another node.
    pub fn receive(&mut self, wire: &WireEvent) -> Event {
        let event = self.caches.read_wire_event(wire).unwrap();
        assert!(event.verify().unwrap(), "gossiped event failed verification");
        self.caches.add_event(&event).unwrap();
        event
    }
}

/// Build `n` nodes that all know the same genesis roster.
pub fn network(monikers: &[&str]) -> Vec<TestNode> {
    let mut nodes: Vec<TestNode> = monikers.iter().map(|m| TestNode::new(m)).collect();
    let roster = PeerSet::new(nodes.iter().map(|n| n.peer.clone()).collect());
    for node in &mut nodes {
        node.caches.set_peer_set(0, roster.clone()).unwrap();
    }
    nodes
}

/// Application stand-in: the state hash chains the committed transactions
/// and peer additions are accepted when correctly signed.
#[derive(Debug, Default)]
pub struct TestApp {
    pub state_hash: Vec<u8>,
    pub committed: Vec<i64>,
}

impl CommitHandler for TestApp {
    fn commit(&mut self, block: &Block) -> ModelResult<CommitResponse> {
        let mut hasher = KeccakHasher::new();
        hasher.update(&self.state_hash);
        for tx in block.transactions() {
            hasher.update(tx);
        }
        self.state_hash = hasher.finalize().to_vec();
        self.committed.push(block.index());

        let receipts = block
            .internal_transactions()
            .iter()
            .map(|itx| match (itx.transaction_type(), itx.verify()) {
                (TransactionType::PeerAdd, Ok(true)) => itx.as_accepted(),
                _ => itx.as_refused(),
            })
            .collect();
        Ok(CommitResponse::new(self.state_hash.clone(), receipts))
    }
}

/// Frame for `round` built from `events` as one node sees them.
pub fn frame_of(round: i64, peers: &PeerSet, events: &[Event]) -> Frame {
    let frame_events = events
        .iter()
        .map(|e| FrameEvent::new(e.clone(), round, 0, e.index() == 0))
        .collect();
    Frame::new(round, peers.peers().to_vec(), frame_events, 0)
}
