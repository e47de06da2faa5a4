use orbit_shared::{
    Float, InputEvent, InputKind, PhysicsConfig, SimState, Vec2, World,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn seeded_world() -> World {
    let mut world = World::new();
    world
        .spawn(
            Vec2::ZERO,
            Vec2::ZERO,
            Float::from_num(10),
            Float::from_num(5),
        )
        .unwrap();
    world
}

#[test]
fn two_engines_agree_after_a_scheduled_spawn() {
    init_logger();
    let config = PhysicsConfig::default();
    let spawn = InputKind::try_spawn(10.0, 10.0, 5.0).unwrap();

    let mut engines: Vec<SimState> = (0..2)
        .map(|_| {
            let mut state = SimState::new(seeded_world());
            state.enqueue(InputEvent::new(3, 0, 0, spawn)).unwrap();
            state
        })
        .collect();

    let mut fingerprints = Vec::new();
    for state in engines.iter_mut() {
        let mut last = None;
        for _ in 0..5 {
            last = Some(state.tick(&config));
        }
        fingerprints.push(last.unwrap());
    }

    assert_eq!(fingerprints[0].frame, 5);
    assert_eq!(fingerprints[0].fingerprint, fingerprints[1].fingerprint);
    for state in &engines {
        assert_eq!(state.world().len(), 2);
        assert_eq!(state.world().ids(), vec![0, 1]);
    }
}

#[test]
fn same_frame_inputs_apply_in_sequence_order() {
    init_logger();
    let config = PhysicsConfig::default();
    let first = InputEvent::new(2, 1, 0, InputKind::try_spawn(-50.0, 0.0, 1.0).unwrap());
    let second = InputEvent::new(2, 1, 1, InputKind::try_spawn(50.0, 0.0, 2.0).unwrap());

    let mut in_order = SimState::new(World::new());
    in_order.enqueue(first).unwrap();
    in_order.enqueue(second).unwrap();

    let mut interleaved = SimState::new(World::new());
    interleaved.enqueue(second).unwrap();
    interleaved.enqueue(first).unwrap();

    for _ in 0..3 {
        assert_eq!(in_order.tick(&config), interleaved.tick(&config));
    }

    // the lower sequence number claimed the lower id
    let body = interleaved.world().get(0).unwrap();
    assert_eq!(body.mass(), Float::from_num(1));
    assert!(body.position().x < Float::ZERO);
}

#[test]
fn close_bodies_merge_and_keep_their_momentum() {
    init_logger();
    let config = PhysicsConfig::default();
    let mut state = SimState::new(World::new());
    let left = InputKind::try_impulse(-0.2, 0.0, 8.0, 0.8, 0.0).unwrap();
    let right = InputKind::try_spawn(0.2, 0.0, 8.0).unwrap();
    state.enqueue(InputEvent::new(0, 0, 0, left)).unwrap();
    state.enqueue(InputEvent::new(0, 1, 0, right)).unwrap();

    let outcome = state.tick(&config);
    assert_eq!(outcome.report.merged, vec![(0, 1)]);
    assert_eq!(state.world().len(), 1);

    let merged = state.world().get(0).unwrap();
    assert_eq!(merged.mass(), Float::from_num(16));
    assert!(merged.velocity().x > Float::ZERO);
}
