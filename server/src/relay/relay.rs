use std::{collections::BTreeMap, time::Duration};

use log::{info, trace, warn};

use orbit_shared::{
    Fingerprint, FrameHistory, FrameIndex, FrameRecord, InputError, InputEvent, Instant, Message,
    PeerId, ReceivedInputs, SimState, Snapshot, Transport, World,
};

use crate::{
    events::RelayEvents,
    peer::{PeerConnection, PeerStats, PeerVerdict},
    OrbitServerError, RelayConfig,
};

/// Authoritative host for any number of peers. Runs the same simulation as
/// the peers at the configured tick rate, relays every accepted input to the
/// other peers, and checks each peer's fingerprints against its own.
pub struct Relay<T: Transport> {
    config: RelayConfig,
    state: SimState,
    history: FrameHistory,
    peers: BTreeMap<PeerId, PeerConnection<T>>,
    received: ReceivedInputs,
    accumulator: Duration,
}

impl<T: Transport> Relay<T> {
    /// Create a new Relay with an empty world
    pub fn new(config: RelayConfig) -> Self {
        Self::with_state(config, SimState::new(World::new()))
    }

    /// Starts from a prepared world, such as [`World::solar_system`]
    pub fn with_state(config: RelayConfig, state: SimState) -> Self {
        let history = FrameHistory::new(config.history_capacity);
        Self {
            config,
            state,
            history,
            peers: BTreeMap::new(),
            received: ReceivedInputs::new(),
            accumulator: Duration::ZERO,
        }
    }

    /// Starts serving a peer. The peer should bootstrap from
    /// [`Relay::snapshot_bytes`] taken just before this call.
    pub fn add_peer(&mut self, peer: PeerId, transport: T) -> Result<(), OrbitServerError> {
        if self.peers.contains_key(&peer) {
            return Err(OrbitServerError::DuplicatePeer { peer });
        }
        info!("Peer {} joined at frame {}", peer, self.state.frame());
        self.peers.insert(peer, PeerConnection::new(peer, transport));
        Ok(())
    }

    /// Stops serving a peer and closes its channel
    pub fn remove_peer(&mut self, peer: PeerId) -> Option<T> {
        let connection = self.peers.remove(&peer)?;
        connection.transport().close();
        info!("Peer {} removed", peer);
        Some(connection.into_transport())
    }

    pub fn update(&mut self, now: Instant, elapsed: Duration) -> RelayEvents {
        let mut events = RelayEvents::new();

        let oldest = self.oldest_retained_frame();
        for peer in self.peers.values_mut() {
            peer.resend_inputs(oldest);
        }

        let mut inbound = Vec::new();
        for (id, peer) in &self.peers {
            while let Some(payload) = peer.transport().try_recv() {
                inbound.push((*id, payload));
            }
        }
        for (from, payload) in inbound {
            self.receive(from, &payload, &mut events);
        }

        self.drop_disconnected(&mut events);

        for _ in 0..self.due_ticks(elapsed) {
            let outcome = self.state.tick(&self.config.physics);
            self.history.record(FrameRecord {
                frame: outcome.frame,
                fingerprint: outcome.fingerprint,
                recorded_at: now,
            });
            if outcome.frame % self.config.hash_interval.max(1) == 0 {
                self.broadcast(
                    &Message::Fingerprint {
                        frame: outcome.frame,
                        fingerprint: outcome.fingerprint,
                    },
                );
            }
            events.push_tick(outcome);
        }
        self.received.forget_before(self.oldest_retained_frame());

        for (id, peer) in self.peers.iter_mut() {
            for (frame, verdict) in peer.settle(&self.history) {
                report_verdict(*id, frame, verdict, &mut events);
            }
        }

        events
    }

    // Accessors

    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn frame(&self) -> FrameIndex {
        self.state.frame()
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.state.fingerprint()
    }

    pub fn peers(&self) -> impl Iterator<Item = PeerId> + '_ {
        self.peers.keys().copied()
    }

    pub fn peer_stats(&self, peer: PeerId) -> Option<PeerStats> {
        self.peers.get(&peer).map(PeerConnection::stats)
    }

    /// Last frame the peer reported
    pub fn peer_frame(&self, peer: PeerId) -> Option<FrameIndex> {
        self.peers.get(&peer).and_then(PeerConnection::last_frame)
    }

    /// Bootstrap blob for a joining peer
    pub fn snapshot_bytes(&self) -> Vec<u8> {
        Snapshot::encode(&self.state)
    }

    // Private

    fn receive(&mut self, from: PeerId, payload: &[u8], events: &mut RelayEvents) {
        let Ok(message) = Message::from_bytes(payload) else {
            warn!(
                "Dropping malformed message of {} bytes from peer {}",
                payload.len(),
                from
            );
            return;
        };
        let current = self.state.frame();
        let Some(peer) = self.peers.get_mut(&from) else {
            return;
        };

        match message {
            Message::Ping { index, frame } => {
                peer.observe_frame(frame);
                peer.send(&Message::Pong {
                    index,
                    frame: current,
                });
            }
            Message::Pong { index, .. } => {
                trace!("Unexpected pong {} from peer {}", index, from);
            }
            Message::Fingerprint { frame, fingerprint } => {
                peer.observe_frame(frame);
                let verdict = peer.check(frame, fingerprint, &self.history);
                report_verdict(from, frame, verdict, events);
            }
            Message::Input(event) => {
                // SECURITY: a peer may only submit its own inputs
                if event.origin() != from {
                    warn!(
                        "Peer {} sent an input claiming origin {}, dropping",
                        from,
                        event.origin()
                    );
                    return;
                }
                let key = event.key();
                if self.received.contains(&key) {
                    trace!("Ignoring repeated input {:?} from peer {}", key, from);
                    return;
                }
                match self.state.enqueue(event) {
                    Ok(()) => {
                        peer.stats_mut().relayed_inputs += 1;
                        self.received.insert(key);
                        events.push_relayed(from, event);
                        self.forward_input(event, from);
                    }
                    Err(error @ InputError::TooLate { .. }) => {
                        peer.stats_mut().late_inputs += 1;
                        warn!("Input from peer {}: {}", from, error);
                        events.push_late_input(from, event, error);
                    }
                    Err(error) => warn!("Dropping input from peer {}: {}", from, error),
                }
            }
        }
    }

    fn broadcast(&self, message: &Message) {
        for peer in self.peers.values() {
            peer.send(message);
        }
    }

    fn forward_input(&mut self, event: InputEvent, from: PeerId) {
        for (id, peer) in self.peers.iter_mut() {
            if *id != from {
                peer.forward_input(event);
            }
        }
    }

    fn oldest_retained_frame(&self) -> FrameIndex {
        let retain = u32::try_from(self.config.history_capacity).unwrap_or(u32::MAX);
        self.state.frame().saturating_sub(retain)
    }

    fn drop_disconnected(&mut self, events: &mut RelayEvents) {
        let gone: Vec<PeerId> = self
            .peers
            .iter()
            .filter(|(_, peer)| peer.transport().state().is_terminal())
            .map(|(id, _)| *id)
            .collect();
        for id in gone {
            if let Some(peer) = self.peers.remove(&id) {
                let state = peer.transport().state();
                info!("Peer {} disconnected: {}", id, state);
                events.push_disconnect(id, state);
            }
        }
    }

    fn due_ticks(&mut self, elapsed: Duration) -> u32 {
        let tick = self.config.physics.tick_duration().max(Duration::from_nanos(1));
        let max = self.config.max_catch_up_ticks.max(1);
        self.accumulator = self.accumulator.saturating_add(elapsed);

        let due = u32::try_from(self.accumulator.as_nanos() / tick.as_nanos()).unwrap_or(u32::MAX);
        let ticks = due.min(max);
        self.accumulator = self.accumulator.saturating_sub(tick.saturating_mul(ticks));
        if due > max {
            warn!("Relay fell {} ticks behind, running {}", due, ticks);
            self.accumulator = self.accumulator.min(tick);
        }
        ticks
    }
}

fn report_verdict(peer: PeerId, frame: FrameIndex, verdict: PeerVerdict, events: &mut RelayEvents) {
    match verdict {
        PeerVerdict::Mismatch(desync) => events.push_desync(desync),
        PeerVerdict::Inconclusive => events.push_inconclusive(peer, frame),
        PeerVerdict::Match | PeerVerdict::Pending => {}
    }
}

#[cfg(test)]
mod tests {
    use orbit_shared::{InputEvent, InputKind, LocalTransport};

    use super::*;
    use crate::{InconclusiveEvent, RelayedInputEvent, TickEvent};

    const FRAME: Duration = Duration::from_micros(16_667);

    fn drain(transport: &LocalTransport) -> Vec<Message> {
        std::iter::from_fn(|| transport.try_recv())
            .map(|bytes| Message::from_bytes(&bytes).unwrap())
            .collect()
    }

    #[test]
    fn inputs_are_relayed_to_other_peers() {
        let mut relay = Relay::new(RelayConfig::default());
        let (a_relay, a) = LocalTransport::pair(None);
        let (b_relay, b) = LocalTransport::pair(None);
        relay.add_peer(1, a_relay).unwrap();
        relay.add_peer(2, b_relay).unwrap();

        let kind = InputKind::try_spawn(1.0, 2.0, 3.0).unwrap();
        let event = InputEvent::new(5, 1, 0, kind);
        a.send(&Message::Input(event).to_bytes()).unwrap();

        let mut events = relay.update(Instant::now(), Duration::ZERO);
        assert_eq!(
            events.read::<RelayedInputEvent>().collect::<Vec<_>>(),
            vec![(1, event)]
        );
        assert_eq!(drain(&b), vec![Message::Input(event)]);
        assert!(drain(&a).is_empty());
        assert_eq!(relay.state().inputs().len(), 1);
    }

    #[test]
    fn forwarded_inputs_are_repeated_until_the_peer_passes_them() {
        let mut relay = Relay::new(RelayConfig::default());
        let (a_relay, a) = LocalTransport::pair(None);
        let (b_relay, b) = LocalTransport::pair(None);
        relay.add_peer(1, a_relay).unwrap();
        relay.add_peer(2, b_relay).unwrap();
        let now = Instant::now();

        let kind = InputKind::try_spawn(1.0, 2.0, 3.0).unwrap();
        let event = InputEvent::new(5, 1, 0, kind);
        a.send(&Message::Input(event).to_bytes()).unwrap();
        a.send(&Message::Input(event).to_bytes()).unwrap();

        let mut events = relay.update(now, Duration::ZERO);
        assert_eq!(events.read::<RelayedInputEvent>().count(), 1);
        assert_eq!(drain(&b), vec![Message::Input(event)]);

        relay.update(now, Duration::ZERO);
        assert_eq!(drain(&b), vec![Message::Input(event)]);

        // b has simulated frame 5
        b.send(&Message::Ping { index: 0, frame: 6 }.to_bytes())
            .unwrap();
        relay.update(now, Duration::ZERO);
        drain(&b);
        relay.update(now, Duration::ZERO);
        assert!(drain(&b).is_empty());
        assert_eq!(relay.peer_stats(1).unwrap().relayed_inputs, 1);
    }

    #[test]
    fn overflowing_parked_fingerprints_are_reported() {
        let config = RelayConfig {
            history_capacity: 2,
            ..RelayConfig::default()
        };
        let mut relay = Relay::new(config);
        let (a_relay, a) = LocalTransport::pair(None);
        relay.add_peer(1, a_relay).unwrap();

        for frame in 10..14 {
            let report = Message::Fingerprint {
                frame,
                fingerprint: Fingerprint(1),
            };
            a.send(&report.to_bytes()).unwrap();
        }
        let mut events = relay.update(Instant::now(), Duration::ZERO);

        let given_up: Vec<(PeerId, FrameIndex)> = events.read::<InconclusiveEvent>().collect();
        assert_eq!(given_up, vec![(1, 10), (1, 11)]);
        assert_eq!(relay.peer_stats(1).unwrap().hash_inconclusive, 2);
    }

    #[test]
    fn spoofed_origin_is_dropped() {
        let mut relay = Relay::new(RelayConfig::default());
        let (a_relay, a) = LocalTransport::pair(None);
        relay.add_peer(1, a_relay).unwrap();

        let kind = InputKind::try_spawn(0.0, 0.0, 1.0).unwrap();
        a.send(&Message::Input(InputEvent::new(5, 9, 0, kind)).to_bytes())
            .unwrap();
        relay.update(Instant::now(), Duration::ZERO);
        assert!(relay.state().inputs().is_empty());
    }

    #[test]
    fn fingerprints_are_broadcast_and_checked() {
        let config = RelayConfig {
            hash_interval: 2,
            ..RelayConfig::default()
        };
        let mut relay = Relay::new(config);
        let (a_relay, a) = LocalTransport::pair(None);
        relay.add_peer(1, a_relay).unwrap();

        let mut events = relay.update(Instant::now(), FRAME * 4);
        assert_eq!(events.read::<TickEvent>().count(), 4);
        let fingerprints: Vec<FrameIndex> = drain(&a)
            .into_iter()
            .filter_map(|message| match message {
                Message::Fingerprint { frame, .. } => Some(frame),
                _ => None,
            })
            .collect();
        assert_eq!(fingerprints, vec![2, 4]);

        let matching = relay.fingerprint();
        let reports = [
            Message::Fingerprint {
                frame: 4,
                fingerprint: matching,
            },
            Message::Fingerprint {
                frame: 3,
                fingerprint: Fingerprint(1),
            },
        ];
        for report in reports {
            a.send(&report.to_bytes()).unwrap();
        }
        relay.update(Instant::now(), Duration::ZERO);

        let stats = relay.peer_stats(1).unwrap();
        assert_eq!(stats.hash_successes, 1);
        assert_eq!(stats.hash_failures, 1);
        assert_eq!(relay.peer_frame(1), Some(4));
    }

    #[test]
    fn a_seeded_relay_serves_its_world() {
        let config = RelayConfig::default();
        let world = World::solar_system(&config.physics);
        let relay: Relay<LocalTransport> = Relay::with_state(config, SimState::new(world));

        let served = Snapshot::decode(&relay.snapshot_bytes()).unwrap();
        assert_eq!(served.world().len(), 3);
        assert_eq!(served.fingerprint(), relay.fingerprint());
    }

    #[test]
    fn duplicate_peer_is_refused() {
        let mut relay = Relay::new(RelayConfig::default());
        let (first, _a) = LocalTransport::pair(None);
        let (second, _b) = LocalTransport::pair(None);
        relay.add_peer(1, first).unwrap();
        assert_eq!(
            relay.add_peer(1, second),
            Err(OrbitServerError::DuplicatePeer { peer: 1 })
        );
    }
}
