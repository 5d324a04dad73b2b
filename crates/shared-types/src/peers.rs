//! # Peers and Peer Sets
//!
//! A `Peer` describes one validator: its network address, its public key and
//! a human-readable moniker. A `PeerSet` is an immutable roster with lookup
//! indices by public key and by numeric ID. Mutations (`with_new_peer`,
//! `with_removed_peer`) return a new set, so snapshots held by history
//! caches are never altered behind their back.

use crate::entities::{Hash, PeerId};
use serde::{Deserialize, Deserializer, Serialize};
use shared_crypto::{
    decode_hex, keccak256, normalize_identity, CryptoError, KeccakHasher, Secp256k1PublicKey,
};
use std::collections::HashMap;

/// A single validator descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Peer {
    /// Network address (`host:port`).
    pub net_addr: String,
    /// `0X`-prefixed hex of the SEC1 compressed public key.
    #[serde(deserialize_with = "deserialize_identity")]
    pub pub_key_hex: String,
    /// Human-readable name.
    #[serde(default)]
    pub moniker: String,
}

impl Peer {
    /// Create a peer. The key is stored as its compressed identity; text
    /// that is not a valid public key is only uppercased.
    pub fn new(
        pub_key_hex: impl AsRef<str>,
        net_addr: impl Into<String>,
        moniker: impl Into<String>,
    ) -> Self {
        Self {
            net_addr: net_addr.into(),
            pub_key_hex: canonical_identity(pub_key_hex.as_ref()),
            moniker: moniker.into(),
        }
    }

    /// Numeric ID: the first four bytes (big-endian) of the Keccak-256 hash
    /// of the public key bytes.
    ///
    /// A key that is not valid hex hashes its normalized text instead, so
    /// every peer has a stable ID.
    pub fn id(&self) -> PeerId {
        let digest = match self.pub_key_bytes() {
            Ok(bytes) => keccak256(&bytes),
            Err(_) => keccak256(self.pub_key_string().as_bytes()),
        };
        PeerId::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
    }

    /// Canonical (uppercase) public key string used as a roster key.
    pub fn pub_key_string(&self) -> String {
        normalize_identity(&self.pub_key_hex)
    }

    /// Decoded public key bytes.
    pub fn pub_key_bytes(&self) -> Result<Vec<u8>, CryptoError> {
        decode_hex(&self.pub_key_hex)
    }
}

/// `0X` + uppercase hex of the compressed form of `pub_key`, whichever SEC1
/// encoding it was given in.
pub fn canonical_identity(pub_key: &str) -> String {
    Secp256k1PublicKey::from_hex(pub_key)
        .map(|key| key.to_identity())
        .unwrap_or_else(|_| normalize_identity(pub_key))
}

fn deserialize_identity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    String::deserialize(deserializer).map(|text| canonical_identity(&text))
}

/// An immutable validator roster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Peer>", into = "Vec<Peer>")]
pub struct PeerSet {
    peers: Vec<Peer>,
    by_pub_key: HashMap<String, Peer>,
    by_id: HashMap<PeerId, Peer>,
}

impl PeerSet {
    /// Build a roster; the first occurrence of a public key wins.
    pub fn new(peers: Vec<Peer>) -> Self {
        let mut set = Self::default();
        for peer in peers {
            set.insert(peer);
        }
        set
    }

    fn insert(&mut self, peer: Peer) {
        let key = peer.pub_key_string();
        if self.by_pub_key.contains_key(&key) {
            return;
        }
        self.by_id.insert(peer.id(), peer.clone());
        self.by_pub_key.insert(key, peer.clone());
        self.peers.push(peer);
    }

    /// Peers in roster order.
    pub fn peers(&self) -> &[Peer] {
        &self.peers
    }

    /// Look up a peer by public key, in any case or SEC1 encoding.
    pub fn by_pub_key(&self, pub_key: &str) -> Option<&Peer> {
        self.by_pub_key.get(&canonical_identity(pub_key))
    }

    /// Look up a peer by numeric ID.
    pub fn by_id(&self, id: PeerId) -> Option<&Peer> {
        self.by_id.get(&id)
    }

    /// Whether the roster contains the public key (case-insensitive).
    pub fn contains(&self, pub_key: &str) -> bool {
        self.by_pub_key(pub_key).is_some()
    }

    /// Number of peers.
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Public key strings in roster order.
    pub fn pub_keys(&self) -> Vec<String> {
        self.peers.iter().map(Peer::pub_key_string).collect()
    }

    /// Numeric IDs in roster order.
    pub fn ids(&self) -> Vec<PeerId> {
        self.peers.iter().map(Peer::id).collect()
    }

    /// A new roster with `peer` appended.
    pub fn with_new_peer(&self, peer: Peer) -> Self {
        let mut peers = self.peers.clone();
        peers.push(peer);
        Self::new(peers)
    }

    /// A new roster without the peer holding `pub_key`.
    pub fn with_removed_peer(&self, pub_key: &str) -> Self {
        let key = canonical_identity(pub_key);
        Self::new(
            self.peers
                .iter()
                .filter(|p| p.pub_key_string() != key)
                .cloned()
                .collect(),
        )
    }

    /// Keccak-256 over the concatenated public key bytes, in roster order.
    pub fn hash(&self) -> Result<Hash, CryptoError> {
        let mut hasher = KeccakHasher::new();
        for peer in &self.peers {
            hasher.update(&peer.pub_key_bytes()?);
        }
        Ok(hasher.finalize())
    }
}

impl PartialEq for PeerSet {
    fn eq(&self, other: &Self) -> bool {
        self.peers == other.peers
    }
}

impl Eq for PeerSet {}

impl From<Vec<Peer>> for PeerSet {
    fn from(peers: Vec<Peer>) -> Self {
        Self::new(peers)
    }
}

impl From<PeerSet> for Vec<Peer> {
    fn from(set: PeerSet) -> Self {
        set.peers
    }
}
