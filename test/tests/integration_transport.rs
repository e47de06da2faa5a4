use smol::future::{block_on, poll_once};

use orbit_client::{ConnectionEvent, OrbitClientError, Session};
use orbit_shared::{ConnectionState, Instant, LocalTransport, Transport, TransportError};
use orbit_test::{peer_config, PeerPair, FRAME};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn closing_mid_flight_resolves_a_pending_read() {
    init_logger();
    let (transport, peer) = LocalTransport::pair(None);
    let mut session = Session::new(peer_config(0), transport);

    {
        let mut pending = Box::pin(session.wait_for_message());
        assert!(block_on(poll_once(&mut pending)).is_none());

        peer.close();

        let result = block_on(pending);
        assert!(matches!(
            result,
            Err(OrbitClientError::Transport(TransportError::Closed))
        ));
    }
    assert_eq!(session.connection_state(), ConnectionState::Closed);
}

#[test]
fn a_waiting_session_handles_the_next_message() {
    init_logger();
    let mut pair = PeerPair::new(None);
    pair.a.update(Instant::now(), FRAME);

    // a's ping is waiting for b
    let events = block_on(pair.b.wait_for_message()).unwrap();
    assert_eq!(pair.b.current_frame(), 0);
    assert!(events.is_empty());
    assert_eq!(pair.b.metrics().remote_frame, Some(0));
}

#[test]
fn sessions_fall_back_to_local_pace_after_the_link_drops() {
    init_logger();
    let mut pair = PeerPair::new(None);
    pair.run(60);
    let before = pair.a.current_frame();

    pair.b.close();
    let (mut events, _) = pair.step();
    let changes: Vec<ConnectionState> = events.read::<ConnectionEvent>().collect();
    assert_eq!(changes, vec![ConnectionState::Closed]);

    pair.run(30);
    assert!(pair.a.current_frame() >= before + 30);
    assert_eq!(pair.a.target_frame(), pair.a.current_frame() - 1);

    let (fresh_a, fresh_b) = LocalTransport::pair(None);
    pair.a.reconnect(fresh_a);
    pair.b.reconnect(fresh_b);
    assert_eq!(pair.a.hash_successes(), 0);
    pair.run(60);
    assert_eq!(pair.a.hash_failures(), 0);
    assert!(pair.a.hash_successes() > 0);
    assert!(pair.a.connection_state().is_open());
}
