//! # Storage Flow
//!
//! A node persists what it learned, restarts from the store, and keeps
//! decoding gossip against the restored caches.

#[cfg(test)]
mod tests {
    use crate::fixtures::{frame_of, init_tracing, network, TestApp, TestNode};
    use hg_01_consensus_types::{Block, Event};
    use hg_02_consensus_caches::CacheConfig;
    use hg_03_kv_storage::{ConsensusStore, MemoryStore, StoreConfig};

    fn persist_history(store: &mut ConsensusStore, node: &TestNode, events: &mut [Event]) {
        for (round, peer_set) in node.caches.peer_sets.get_all() {
            store.put_peer_set(*round, peer_set).unwrap();
        }
        store.put_events(events).unwrap();
    }

    #[test]
    fn test_restart_resumes_wire_decoding() {
        init_tracing();
        let mut nodes = network(&["alice", "bob"]);
        let mut seen = Vec::new();
        for i in 0..3u8 {
            let event = nodes[0].create_event(vec![vec![i]], vec![], vec![], None);
            seen.push(nodes[1].receive(&event.to_wire()));
        }

        let mut store = ConsensusStore::new(Box::new(MemoryStore::default())).unwrap();
        persist_history(&mut store, &nodes[1], &mut seen);

        let restored = store.restore_caches(&CacheConfig::default()).unwrap();
        let next = nodes[0].create_event(vec![b"after restart".to_vec()], vec![], vec![], None);

        let rebuilt = restored.read_wire_event(&next.to_wire()).unwrap();
        assert_eq!(rebuilt.hex().unwrap(), next.hex().unwrap());
        assert!(rebuilt.verify().unwrap());
        assert_eq!(
            restored.participant_events.known(),
            nodes[1].caches.participant_events.known()
        );
    }

    #[test]
    fn test_signed_block_survives_storage() {
        let mut nodes = network(&["alice", "bob"]);
        let roster = nodes[0].caches.peer_sets.get(0).unwrap().clone();
        let events = vec![nodes[0].create_event(vec![b"x".to_vec()], vec![], vec![], None)];

        let mut block = Block::from_frame(0, &frame_of(1, &roster, &events)).unwrap();
        nodes[0]
            .caches
            .commit_block(&mut block, &mut TestApp::default())
            .unwrap();
        for node in &nodes {
            let signature = block.sign(&node.keypair).unwrap();
            block.set_signature(&signature);
        }

        let store = ConsensusStore::open(&StoreConfig::default()).unwrap();
        store.put_block(&block).unwrap();
        store.put_frame(&frame_of(1, &roster, &events)).unwrap();

        let loaded = store.get_block(0).unwrap();
        assert_eq!(loaded, block);
        assert_eq!(loaded.hex().unwrap(), block.hex().unwrap());
        assert_eq!(loaded.get_signatures().len(), 2);
        for signature in loaded.get_signatures() {
            assert!(loaded.verify(&signature).unwrap());
        }
        assert_eq!(store.get_frame(1).unwrap().hash().unwrap(), loaded.frame_hash());
    }

    #[cfg(feature = "rocksdb")]
    #[test]
    fn test_rocksdb_restart() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new().with_path(dir.path());
        let mut nodes = network(&["alice", "bob"]);
        let mut events: Vec<Event> = (0..2)
            .map(|_| nodes[0].create_event(vec![], vec![], vec![], None))
            .collect();

        {
            let mut store = ConsensusStore::open(&config).unwrap();
            persist_history(&mut store, &nodes[0], &mut events);
            store.close().unwrap();
        }

        let store = ConsensusStore::open(&config).unwrap();
        let caches = store.restore_caches(&CacheConfig::default()).unwrap();
        assert_eq!(
            caches
                .participant_events
                .get_last(&nodes[0].peer.pub_key_hex)
                .unwrap(),
            events[1].hex().unwrap()
        );
        assert_eq!(store.topological_events(0, 10).unwrap().len(), 2);
    }
}
