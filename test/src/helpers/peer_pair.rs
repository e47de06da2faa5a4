use orbit_client::{Session, SessionConfig, SessionEvents};
use orbit_shared::{LinkConditioner, LocalTransport, SimState, World};

use super::TestClock;

/// Two sessions connected directly to each other over an in-memory link
pub struct PeerPair {
    pub a: Session<LocalTransport>,
    pub b: Session<LocalTransport>,
    pub clock: TestClock,
}

impl PeerPair {
    pub fn new(conditioner: Option<LinkConditioner>) -> Self {
        Self::with_states(
            conditioner,
            SimState::new(World::new()),
            SimState::new(World::new()),
        )
    }

    /// Starts each side from its own state. Identical states stay in
    /// agreement; different ones are how tests force a desync.
    pub fn with_states(conditioner: Option<LinkConditioner>, a: SimState, b: SimState) -> Self {
        let (a_transport, b_transport) = LocalTransport::pair(conditioner);
        Self {
            a: Session::with_state(peer_config(0), a_transport, a),
            b: Session::with_state(peer_config(1), b_transport, b),
            clock: TestClock::default(),
        }
    }

    /// Advances the clock one frame and updates both sides
    pub fn step(&mut self) -> (SessionEvents, SessionEvents) {
        let (now, elapsed) = self.clock.advance();
        let a = self.a.update(now, elapsed);
        let b = self.b.update(now, elapsed);
        (a, b)
    }

    pub fn run(&mut self, steps: usize) {
        for _ in 0..steps {
            self.step();
        }
    }

    /// Steps until `done` holds, giving up after `max_steps`
    pub fn run_until(&mut self, max_steps: usize, done: impl Fn(&PeerPair) -> bool) -> bool {
        for _ in 0..max_steps {
            if done(self) {
                return true;
            }
            self.step();
        }
        done(self)
    }
}

pub fn peer_config(peer_id: u16) -> SessionConfig {
    SessionConfig {
        peer_id,
        ..SessionConfig::default()
    }
}
