/// Tests for relay error handling

use std::time::Duration;

use orbit_server::{
    shared::{ConnectionState, Instant, LocalTransport, Message, Transport},
    DisconnectEvent, LateInputEvent, OrbitServerError, Relay, RelayConfig,
};
use orbit_shared::{InputError, InputEvent, InputKind};

const FRAME: Duration = Duration::from_micros(16_667);

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn closed_peers_are_dropped() {
    init_logger();
    let mut relay = Relay::new(RelayConfig::default());
    let (relay_side, peer) = LocalTransport::pair(None);
    relay.add_peer(3, relay_side).unwrap();

    peer.close();
    let mut events = relay.update(Instant::now(), FRAME);
    assert_eq!(
        events.read::<DisconnectEvent>().collect::<Vec<_>>(),
        vec![(3, ConnectionState::Closed)]
    );
    assert_eq!(relay.peers().count(), 0);
    assert!(relay.peer_stats(3).is_none());
}

#[test]
fn late_inputs_are_not_relayed() {
    init_logger();
    let mut relay = Relay::new(RelayConfig::default());
    let (a_side, a) = LocalTransport::pair(None);
    let (b_side, b) = LocalTransport::pair(None);
    relay.add_peer(1, a_side).unwrap();
    relay.add_peer(2, b_side).unwrap();
    relay.update(Instant::now(), FRAME * 5);
    while b.try_recv().is_some() {}

    let kind = InputKind::try_spawn(0.0, 0.0, 1.0).unwrap();
    let stale = InputEvent::new(1, 1, 0, kind);
    a.send(&Message::Input(stale).to_bytes()).unwrap();

    let mut events = relay.update(Instant::now(), Duration::ZERO);
    assert_eq!(
        events.read::<LateInputEvent>().collect::<Vec<_>>(),
        vec![(1, stale, InputError::TooLate { frame: 1, current: 5 })]
    );
    assert!(b.try_recv().is_none());
    assert_eq!(relay.peer_stats(1).unwrap().late_inputs, 1);
}

#[test]
fn garbage_from_a_peer_is_ignored() {
    init_logger();
    let mut relay = Relay::new(RelayConfig::default());
    let (relay_side, peer) = LocalTransport::pair(None);
    relay.add_peer(1, relay_side).unwrap();

    peer.send(&[0xde, 0xad, 0xbe, 0xef, 0x01]).unwrap();
    relay.update(Instant::now(), FRAME);
    assert_eq!(relay.frame(), 1);
    assert_eq!(relay.peer_stats(1).unwrap().hash_failures, 0);
}

#[test]
fn removing_a_peer_closes_its_channel() {
    init_logger();
    let mut relay = Relay::new(RelayConfig::default());
    let (relay_side, peer) = LocalTransport::pair(None);
    relay.add_peer(1, relay_side).unwrap();

    assert!(relay.remove_peer(1).is_some());
    assert_eq!(peer.state(), ConnectionState::Closed);
    assert!(relay.remove_peer(1).is_none());
}

#[test]
fn duplicate_ids_are_refused() {
    init_logger();
    let mut relay = Relay::new(RelayConfig::default());
    let (first, _a) = LocalTransport::pair(None);
    let (second, _b) = LocalTransport::pair(None);
    relay.add_peer(4, first).unwrap();
    let error = relay.add_peer(4, second).unwrap_err();
    assert_eq!(error, OrbitServerError::DuplicatePeer { peer: 4 });
    assert_eq!(error.to_string(), "Peer 4 is already connected");
}
