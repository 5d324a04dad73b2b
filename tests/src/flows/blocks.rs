//! # Block Flow
//!
//! frame -> block -> application commit -> validator signatures gossiped
//! inside events -> signature pool -> signed block -> roster change.

#[cfg(test)]
mod tests {
    use crate::fixtures::{frame_of, init_tracing, network, TestApp, TestNode};
    use hg_01_consensus_types::{Block, Event, InternalTransaction};
    use shared_types::PeerSet;

    /// Alice and Bob each create an event; Bob's carries a signed request to
    /// add `joiner`. Returns the events as every node holds them.
    fn gossip_round(nodes: &mut [TestNode], joiner: &TestNode) -> Vec<Vec<Event>> {
        let mut add = InternalTransaction::new_peer_add(joiner.peer.clone());
        add.sign(&joiner.keypair).unwrap();

        let alice_0 = nodes[0].create_event(vec![b"tx-a".to_vec()], vec![], vec![], None);
        let alice_at_bob = nodes[1].receive(&alice_0.to_wire());
        let alice_peer = nodes[0].peer.clone();
        let bob_0 = nodes[1].create_event(
            vec![b"tx-b".to_vec()],
            vec![add],
            vec![],
            Some((&alice_peer, 0, alice_0.hex().unwrap())),
        );
        let bob_at_alice = nodes[0].receive(&bob_0.to_wire());

        let mut views = vec![vec![alice_0.clone(), bob_at_alice], vec![alice_at_bob, bob_0.clone()]];
        for node in nodes.iter_mut().skip(2) {
            views.push(vec![node.receive(&alice_0.to_wire()), node.receive(&bob_0.to_wire())]);
        }
        views
    }

    #[test]
    fn test_every_node_builds_and_signs_the_same_block() {
        init_tracing();
        let mut nodes = network(&["alice", "bob", "carol"]);
        let dave = TestNode::new("dave");
        let roster = nodes[0].caches.peer_sets.get(0).unwrap().clone();

        let views = gossip_round(&mut nodes, &dave);

        // Each node derives the block from its own copies of the events.
        let mut blocks: Vec<Block> = Vec::new();
        for view in &views {
            let frame = frame_of(1, &roster, view);
            let mut block = Block::from_frame(0, &frame).unwrap();
            let mut app = TestApp::default();
            nodes[0].caches.commit_block(&mut block, &mut app).unwrap();
            assert_eq!(app.committed, vec![0]);
            blocks.push(block);
        }
        let hash = blocks[0].hex().unwrap().to_string();
        assert!(blocks.iter().all(|b| b.hex().unwrap() == hash));
        assert_eq!(blocks[0].transactions().len(), 2);
        assert!(blocks[0].internal_transaction_receipts()[0].accepted);

        // Validators ship their signature inside their next event.
        let signed_events: Vec<Event> = nodes
            .iter_mut()
            .zip(&blocks)
            .map(|(node, block)| {
                let signature = block.sign(&node.keypair).unwrap();
                node.caches.sig_pool.add(signature.clone());
                node.create_event(vec![], vec![], vec![signature], None)
            })
            .collect();

        for (i, node) in nodes.iter_mut().enumerate() {
            for (j, event) in signed_events.iter().enumerate() {
                if i == j {
                    continue;
                }
                let received = node.receive(&event.to_wire());
                for signature in received.block_signatures() {
                    node.caches.sig_pool.add(signature.clone());
                }
            }
        }

        for (node, block) in nodes.iter_mut().zip(blocks.iter_mut()) {
            let attached = node.caches.apply_pooled_signatures(block).unwrap();
            assert_eq!(attached, 3);
            assert!(node.caches.sig_pool.is_empty());
            for signature in block.get_signatures() {
                assert!(block.verify(&signature).unwrap());
            }
        }
    }

    #[test]
    fn test_signature_over_other_state_is_discarded() {
        let mut nodes = network(&["alice", "bob"]);
        let dave = TestNode::new("dave");
        let roster = nodes[0].caches.peer_sets.get(0).unwrap().clone();
        let views = gossip_round(&mut nodes, &dave);

        let frame = frame_of(1, &roster, &views[0]);
        let mut honest = Block::from_frame(0, &frame).unwrap();
        let mut diverged = honest.clone();
        nodes[0]
            .caches
            .commit_block(&mut honest, &mut TestApp::default())
            .unwrap();
        let mut other_app = TestApp {
            state_hash: vec![0xee; 32],
            ..TestApp::default()
        };
        nodes[0].caches.commit_block(&mut diverged, &mut other_app).unwrap();
        assert_ne!(honest.state_hash(), diverged.state_hash());

        let bad = diverged.sign(&nodes[1].keypair).unwrap();
        nodes[0].caches.sig_pool.add(bad);

        assert_eq!(nodes[0].caches.apply_pooled_signatures(&mut honest).unwrap(), 0);
        assert!(honest.get_signatures().is_empty());
        assert!(nodes[0].caches.sig_pool.is_empty());
    }

    #[test]
    fn test_accepted_peer_add_extends_the_roster() {
        let mut nodes = network(&["alice", "bob"]);
        let dave = TestNode::new("dave");
        let roster = nodes[0].caches.peer_sets.get(0).unwrap().clone();
        let views = gossip_round(&mut nodes, &dave);

        let frame = frame_of(3, &roster, &views[0]);
        let mut block = Block::from_frame(0, &frame).unwrap();
        nodes[0]
            .caches
            .commit_block(&mut block, &mut TestApp::default())
            .unwrap();

        let effective = block.round_received() + 1;
        let mut next: PeerSet = roster.clone();
        for receipt in block.internal_transaction_receipts() {
            if receipt.accepted {
                next = next.with_new_peer(receipt.internal_transaction.body.peer.clone());
            }
        }
        nodes[0].caches.set_peer_set(effective, next).unwrap();

        let caches = &nodes[0].caches;
        assert!(!caches.peer_sets.get(3).unwrap().contains(&dave.peer.pub_key_hex));
        assert!(caches.peer_sets.get(effective).unwrap().contains(&dave.peer.pub_key_hex));
        assert_eq!(caches.peer_sets.first_round(dave.peer.id()), Some(effective));
        assert!(caches
            .participant_events
            .participants()
            .contains(&dave.peer.pub_key_hex));
    }
}
