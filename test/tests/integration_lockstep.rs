use orbit_client::{
    DesyncEvent, InconclusiveEvent, Session, SessionConfig, StallEvent, Synchronizer, SyncConfig,
    TickEvent, Verdict,
};
use orbit_shared::{
    Fingerprint, InputEvent, InputKind, Instant, LinkConditioner, LocalTransport, SimState, World,
};
use orbit_test::{assert_in_agreement, assert_same_world_at, peer_config, PeerPair, FRAME};

fn init_logger() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Warn)
        .try_init();
}

#[test]
fn peers_fed_the_same_inputs_stay_in_agreement() {
    init_logger();
    let mut pair = PeerPair::new(None);

    for round in 0..12 {
        let offset = round as f32 * 15.0;
        pair.a.spawn(-100.0 + offset, 40.0, 6.0).unwrap();
        pair.b.impulse(100.0 - offset, -40.0, 3.0, 80.0 - offset, -20.0).unwrap();
        pair.run(25);
    }
    pair.run(30);

    assert_in_agreement!(pair.a);
    assert_in_agreement!(pair.b);
    assert_eq!(pair.a.late_inputs(), 0);
    assert_eq!(pair.b.late_inputs(), 0);
    assert!(pair.a.world().len() > 0);

    let caught_up = pair.run_until(20, |pair| {
        pair.a.current_frame() == pair.b.current_frame()
    });
    assert!(caught_up);
    assert_same_world_at!(pair.a, pair.b);
}

#[test]
fn a_divergent_input_is_detected_on_both_sides() {
    init_logger();
    let mut diverged = SimState::new(World::new());
    let stray = InputKind::try_spawn(30.0, 30.0, 12.0).unwrap();
    diverged.enqueue(InputEvent::new(10, 7, 0, stray)).unwrap();

    let mut pair = PeerPair::with_states(None, SimState::new(World::new()), diverged);
    let mut reported = Vec::new();
    for _ in 0..120 {
        let (mut a, _) = pair.step();
        reported.extend(a.read::<DesyncEvent>());
    }

    assert!(pair.a.hash_failures() > 0);
    assert!(pair.b.hash_failures() > 0);
    // frames before the stray input still matched
    assert!(pair.a.hash_successes() > 0);

    let first = reported.first().expect("a desync event");
    assert!(first.frame > 10);
    assert_ne!(first.local, first.remote);
}

#[test]
fn fingerprints_older_than_the_history_are_inconclusive() {
    init_logger();
    let config = SyncConfig {
        hash_interval: 1,
        history_capacity: 8,
        loss_window: 50,
    };
    let mut sync = Synchronizer::new(&config);
    let now = Instant::now();
    for frame in 1..=40 {
        sync.record_local(frame, Fingerprint(u64::from(frame)), now);
    }

    assert_eq!(sync.receive_remote(5, Fingerprint(5)), Verdict::Inconclusive);
    assert_eq!(sync.receive_remote(6, Fingerprint(999)), Verdict::Inconclusive);
    assert_eq!(sync.hash_successes(), 0);
    assert_eq!(sync.hash_failures(), 0);
    assert_eq!(sync.hash_inconclusive(), 2);
}

#[test]
fn early_fingerprints_beyond_the_history_are_inconclusive() {
    init_logger();
    let config = SessionConfig {
        sync: SyncConfig {
            hash_interval: 1,
            history_capacity: 4,
            loss_window: 50,
        },
        ..peer_config(0)
    };
    let (a_transport, b_transport) = LocalTransport::pair(None);
    let mut a = Session::new(config.clone(), a_transport);
    let mut b = Session::new(SessionConfig { peer_id: 1, ..config }, b_transport);

    // b runs ahead while a isn't updated; its fingerprints queue up for a
    let start = Instant::now();
    b.update(start, FRAME * 8);

    // a has simulated nothing yet, so only the newest fingerprints can wait
    // in its history; the oldest ones are given up on
    let mut events = a.update(start, FRAME * 20);
    assert_eq!(events.read::<TickEvent>().count(), 10);
    let dropped: Vec<u32> = events.read::<InconclusiveEvent>().collect();
    assert_eq!(dropped, vec![1, 2, 3, 4]);
    assert_eq!(a.hash_inconclusive(), 4);
    assert_eq!(a.hash_successes(), 4);
    assert_eq!(a.hash_failures(), 0);
}

#[test]
fn a_long_gap_is_capped_and_reported_as_a_stall() {
    init_logger();
    let (transport, _peer) = LocalTransport::connecting_pair(None);
    let mut session = Session::new(peer_config(0), transport);
    let max = session.config().scheduler.max_catch_up_ticks;

    let mut events = session.update(Instant::now(), FRAME * 100);
    assert_eq!(events.read::<TickEvent>().count() as u32, max);
    let stalls: Vec<_> = events.read::<StallEvent>().collect();
    assert_eq!(stalls.len(), 1);
    assert_eq!(stalls[0].max, max);
    assert!(stalls[0].wanted >= 100);
    assert_eq!(session.metrics().stalls, 1);
    assert_eq!(session.current_frame(), max);
}

#[test]
fn a_lossy_link_shows_up_as_packet_loss() {
    init_logger();
    let mut pair = PeerPair::new(Some(LinkConditioner::new(0.3, 11)));
    pair.run(900);

    assert!(pair.a.packet_loss() > 0.0);
    assert!(pair.b.packet_loss() > 0.0);
    assert!(pair.a.packet_loss() < 1.0);
    assert_eq!(pair.a.hash_failures(), 0);
    assert!(pair.a.metrics().latency_secs > 0.0);
}

#[test]
fn inputs_survive_a_lossy_link() {
    init_logger();
    let mut pair = PeerPair::new(Some(LinkConditioner::new(0.2, 5)));

    for round in 0..10 {
        let x = round as f32 * 12.0 - 60.0;
        pair.a.spawn(x, 30.0, 4.0).unwrap();
        pair.run(20);
    }
    pair.run(60);

    log::info!(
        "a bodies={} b bodies={} loss={}",
        pair.a.world().len(),
        pair.b.world().len(),
        pair.a.packet_loss()
    );
    assert!(pair.a.packet_loss() > 0.0);
    assert_eq!(pair.a.late_inputs(), 0);
    assert_eq!(pair.b.late_inputs(), 0);
    assert_eq!(pair.a.hash_failures(), 0);
    assert_eq!(pair.b.hash_failures(), 0);
    assert!(pair.a.hash_successes() > 0);
    assert_eq!(pair.a.world().len(), pair.b.world().len());
}

#[test]
fn connected_peers_keep_wall_clock_pace() {
    init_logger();
    let mut pair = PeerPair::new(None);
    let steps: u32 = 600;
    pair.run(steps as usize);

    for frame in [pair.a.current_frame(), pair.b.current_frame()] {
        assert!(
            (steps - 1..=steps + 1).contains(&frame),
            "{} presentation frames produced {} ticks",
            steps,
            frame
        );
    }
    assert_eq!(pair.a.metrics().stalls, 0);
    assert_eq!(pair.b.metrics().stalls, 0);
}
