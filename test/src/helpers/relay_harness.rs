use orbit_client::{Session, SessionConfig};
use orbit_server::{Relay, RelayConfig, RelayEvents};
use orbit_shared::{LocalTransport, PeerId};

use super::{peer_config, TestClock};

/// A relay with sessions attached, all driven by one clock
pub struct RelayHarness {
    pub relay: Relay<LocalTransport>,
    pub peers: Vec<Session<LocalTransport>>,
    pub clock: TestClock,
}

impl RelayHarness {
    pub fn new(config: RelayConfig) -> Self {
        Self {
            relay: Relay::new(config),
            peers: Vec::new(),
            clock: TestClock::default(),
        }
    }

    /// Bootstraps a session from the relay's current snapshot and attaches it
    pub fn join(&mut self, peer_id: PeerId) -> usize {
        self.join_with(peer_config(peer_id))
    }

    pub fn join_with(&mut self, config: SessionConfig) -> usize {
        let (relay_side, peer_side) = LocalTransport::pair(None);
        let snapshot = self.relay.snapshot_bytes();
        let peer_id = config.peer_id;
        let session = Session::from_snapshot(config, peer_side, &snapshot)
            .expect("relay snapshots always decode");
        self.relay
            .add_peer(peer_id, relay_side)
            .expect("peer ids are unique in tests");
        self.peers.push(session);
        self.peers.len() - 1
    }

    /// Advances the clock one frame, updating the relay and then every peer
    pub fn step(&mut self) -> RelayEvents {
        let (now, elapsed) = self.clock.advance();
        let events = self.relay.update(now, elapsed);
        for peer in self.peers.iter_mut() {
            peer.update(now, elapsed);
        }
        events
    }

    pub fn run(&mut self, steps: usize) {
        for _ in 0..steps {
            self.step();
        }
    }
}
