use orbit_server::{DesyncEvent, RelayConfig, RelayedInputEvent};
use orbit_test::{assert_in_agreement, RelayHarness};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn peers_behind_a_relay_agree_with_it() {
    init_logger();
    let mut harness = RelayHarness::new(RelayConfig::default());
    let first = harness.join(1);
    let second = harness.join(2);

    let mut relayed = 0;
    for round in 0..8 {
        let x = round as f32 * 20.0 - 80.0;
        harness.peers[first].spawn(x, 50.0, 5.0).unwrap();
        harness.peers[second].spawn(-x, -50.0, 5.0).unwrap();
        for _ in 0..30 {
            let mut events = harness.step();
            relayed += events.read::<RelayedInputEvent>().count();
            assert!(!events.has::<DesyncEvent>());
        }
    }

    assert_eq!(relayed, 16);
    for peer in &harness.peers {
        assert_in_agreement!(peer);
        assert_eq!(peer.late_inputs(), 0);
    }
    for id in [1, 2] {
        let stats = harness.relay.peer_stats(id).unwrap();
        assert!(stats.hash_successes > 0);
        assert_eq!(stats.hash_failures, 0);
        assert_eq!(stats.relayed_inputs, 8);
    }
    assert!(harness.relay.state().world().len() > 0);
}

#[test]
fn a_late_joiner_bootstraps_from_the_relay_snapshot() {
    init_logger();
    let mut harness = RelayHarness::new(RelayConfig::default());
    let first = harness.join(1);
    harness.peers[first].spawn(0.0, 0.0, 30.0).unwrap();
    harness.peers[first].impulse(60.0, 0.0, 2.0, 60.0, 20.0).unwrap();
    harness.run(120);

    let late = harness.join(2);
    let joined_at = harness.peers[late].current_frame();
    assert!(joined_at >= 100);
    assert_eq!(
        harness.peers[late].state().fingerprint(),
        harness.relay.fingerprint()
    );

    harness.run(120);
    assert_in_agreement!(harness.peers[late]);
    assert_eq!(harness.peers[late].world().len(), harness.relay.state().world().len());
    assert_eq!(harness.relay.peer_stats(2).unwrap().hash_failures, 0);
}
