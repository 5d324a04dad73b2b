//! # Gossip Flow
//!
//! Events leave their creator in wire form and are rebuilt by every other
//! node from its own caches. The rebuilt event must be byte-for-byte the
//! event that was signed.

#[cfg(test)]
mod tests {
    use crate::fixtures::{init_tracing, network, TestNode};
    use hg_01_consensus_types::{sort_lamport, Event, ModelError};
    use hg_02_consensus_caches::CacheError;
    use shared_types::PeerSet;

    // =========================================================================
    // WIRE RECONSTRUCTION
    // =========================================================================

    #[test]
    fn test_gossiped_events_keep_their_identity() {
        init_tracing();
        let mut nodes = network(&["alice", "bob", "carol"]);

        let alice_0 = nodes[0].create_event(vec![b"a0".to_vec()], vec![], vec![], None);
        let at_bob = nodes[1].receive(&alice_0.to_wire());
        assert_eq!(at_bob.hex().unwrap(), alice_0.hex().unwrap());
        assert!(at_bob.body().parents.is_empty());

        let alice_peer = nodes[0].peer.clone();
        let bob_0 = nodes[1].create_event(
            vec![b"b0".to_vec()],
            vec![],
            vec![],
            Some((&alice_peer, 0, alice_0.hex().unwrap())),
        );

        // Carol learns both, in causal order.
        nodes[2].receive(&alice_0.to_wire());
        let at_carol = nodes[2].receive(&bob_0.to_wire());
        assert_eq!(at_carol.hash().unwrap(), bob_0.hash().unwrap());
        assert_eq!(at_carol.other_parent().unwrap(), alice_0.hex().unwrap());

        let known = nodes[2].caches.participant_events.known();
        assert_eq!(known[&nodes[0].peer.id()], 0);
        assert_eq!(known[&nodes[1].peer.id()], 0);
        assert_eq!(known[&nodes[2].peer.id()], -1);
    }

    #[test]
    fn test_self_parent_chain_resolves() {
        let mut nodes = network(&["alice", "bob"]);

        let mut wires = Vec::new();
        for i in 0..5u8 {
            wires.push(nodes[0].create_event(vec![vec![i]], vec![], vec![], None));
        }
        for event in &wires {
            nodes[1].receive(&event.to_wire());
        }

        let rebuilt = nodes[1].caches.read_wire_event(&wires[4].to_wire()).unwrap();
        assert_eq!(rebuilt.self_parent().unwrap(), wires[3].hex().unwrap());
        assert_eq!(
            nodes[1]
                .caches
                .participant_events
                .get(&nodes[0].peer.pub_key_hex, 2)
                .unwrap()
                .len(),
            2
        );
    }

    // =========================================================================
    // REJECTION
    // =========================================================================

    #[test]
    fn test_tampered_payload_fails_verification() {
        let mut nodes = network(&["alice", "bob"]);
        let event = nodes[0].create_event(vec![b"pay 5".to_vec()], vec![], vec![], None);

        let mut wire = event.to_wire();
        wire.body.transactions[0] = b"pay 500".to_vec();

        let rebuilt = nodes[1].caches.read_wire_event(&wire).unwrap();
        assert!(!rebuilt.verify().unwrap());
    }

    #[test]
    fn test_event_from_outside_the_roster() {
        let mut nodes = network(&["alice", "bob"]);
        let mut stranger = TestNode::new("mallory");
        let own_roster = PeerSet::new(vec![stranger.peer.clone()]);
        stranger.caches.set_peer_set(0, own_roster).unwrap();

        let event = stranger.create_event(vec![], vec![], vec![], None);
        let err = nodes[1].caches.read_wire_event(&event.to_wire()).unwrap_err();

        assert!(matches!(
            err,
            CacheError::Model(ModelError::UnknownPeer(id)) if id == stranger.peer.id()
        ));
        assert!(nodes[0].caches.add_event(&event).is_err());
    }

    #[test]
    fn test_missing_parent_index_is_reported() {
        let mut nodes = network(&["alice", "bob"]);
        let _first = nodes[0].create_event(vec![], vec![], vec![], None);
        let second = nodes[0].create_event(vec![], vec![], vec![], None);

        // Bob never saw `first`.
        let err = nodes[1].caches.read_wire_event(&second.to_wire()).unwrap_err();
        assert!(matches!(err, CacheError::Model(ModelError::Store(_))));
    }

    // =========================================================================
    // ORDERING
    // =========================================================================

    #[test]
    fn test_lamport_order_agrees_across_nodes() {
        let mut nodes = network(&["alice", "bob", "carol"]);
        let created: Vec<Event> = (0..3)
            .map(|i| nodes[i].create_event(vec![vec![i as u8]], vec![], vec![], None))
            .collect();

        let mut views: Vec<Vec<Event>> = Vec::new();
        for (i, node) in nodes.iter_mut().enumerate() {
            let mut view: Vec<Event> = created
                .iter()
                .enumerate()
                .map(|(j, e)| if i == j { e.clone() } else { node.receive(&e.to_wire()) })
                .rev()
                .collect();
            // Equal timestamps: the signature breaks the tie.
            for event in &mut view {
                event.set_lamport_timestamp(7);
            }
            sort_lamport(&mut view);
            views.push(view);
        }

        let order = |view: &Vec<Event>| -> Vec<String> {
            view.iter().map(|e| e.hex().unwrap().to_string()).collect()
        };
        assert_eq!(order(&views[0]), order(&views[1]));
        assert_eq!(order(&views[1]), order(&views[2]));
    }
}
