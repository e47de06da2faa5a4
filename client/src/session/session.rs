use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use log::{debug, info, trace, warn};

use orbit_shared::{
    ConnectionState, FrameIndex, InputError, InputEvent, InputKind, Instant, Message,
    OutgoingInputs, ReceivedInputs, SimState, Snapshot, Transport, World,
};

use crate::{
    connection::ping_manager::PingManager,
    events::SessionEvents,
    metrics::Metrics,
    render::RenderSnapshot,
    scheduler::frame_scheduler::FrameScheduler,
    sync::synchronizer::{Synchronizer, Verdict},
    OrbitClientError, SessionConfig,
};

type StateChanges = Arc<Mutex<Vec<ConnectionState>>>;

/// Last frame the peer told us about, and when we heard it
#[derive(Clone, Copy, Debug)]
struct RemoteFrame {
    frame: FrameIndex,
    received_at: Instant,
}

/// One peer of a lockstep simulation. Owns the simulation state and keeps it
/// in step with the remote peer over a [`Transport`].
///
/// The host calls [`Session::update`] once per presentation frame; all
/// networking and ticking happens inside it.
pub struct Session<T: Transport> {
    config: SessionConfig,
    transport: T,
    state_changes: StateChanges,
    state: SimState,
    scheduler: FrameScheduler,
    pings: PingManager,
    sync: Synchronizer,
    remote: Option<RemoteFrame>,
    target_frame: FrameIndex,
    outgoing: OutgoingInputs,
    received: ReceivedInputs,
    next_sequence: u32,
    late_inputs: u64,
    stalls: u64,
}

impl<T: Transport> Session<T> {
    /// Create a new Session with an empty world
    pub fn new(config: SessionConfig, transport: T) -> Self {
        Self::with_state(config, transport, SimState::new(World::new()))
    }

    /// Create a Session that resumes from a bootstrap snapshot
    pub fn from_snapshot(
        config: SessionConfig,
        transport: T,
        bytes: &[u8],
    ) -> Result<Self, OrbitClientError> {
        let state = Snapshot::decode(bytes)?;
        Ok(Self::with_state(config, transport, state))
    }

    pub fn with_state(config: SessionConfig, transport: T, state: SimState) -> Self {
        let state_changes = watch(&transport);
        let scheduler = FrameScheduler::new(&config.scheduler, config.physics.tick_duration());
        let pings = PingManager::new(&config.ping);
        let sync = Synchronizer::new(&config.sync);
        let next_sequence = state
            .inputs()
            .iter()
            .filter(|event| event.origin() == config.peer_id)
            .map(|event| event.sequence().wrapping_add(1))
            .max()
            .unwrap_or(0);
        let target_frame = state.frame();

        Self {
            config,
            transport,
            state_changes,
            state,
            scheduler,
            pings,
            sync,
            remote: None,
            target_frame,
            outgoing: OutgoingInputs::new(),
            received: ReceivedInputs::new(),
            next_sequence,
            late_inputs: 0,
            stalls: 0,
        }
    }

    /// Drains the transport, measures latency, then runs as many ticks as the
    /// scheduler allows for `elapsed` wall-clock time.
    pub fn update(&mut self, now: Instant, elapsed: Duration) -> SessionEvents {
        let mut events = SessionEvents::new();
        self.drain_state_changes(&mut events);

        let expired = self.pings.expire(&now);
        if expired > 0 {
            debug!("{} pings went unanswered", expired);
            self.sync.record_ping_timeouts(expired);
        }

        while let Some(payload) = self.transport.try_recv() {
            self.receive(&payload, now, &mut events);
        }

        self.resend_inputs();

        if self.transport.state().is_open() && self.pings.should_send_ping(&now) {
            let ping = self.pings.send_ping(&now, self.state.frame());
            self.send(&ping);
        }

        self.target_frame = self.estimate_target(now);
        let plan = self
            .scheduler
            .plan(self.state.frame(), self.target_frame, elapsed);
        if let Some(stall) = plan.stall {
            self.stalls += 1;
            events.push_stall(stall);
        }

        for _ in 0..plan.ticks {
            let outcome = self.state.tick(&self.config.physics);
            if let Some(message) = self
                .sync
                .record_local(outcome.frame, outcome.fingerprint, now)
            {
                self.send(&message);
            }
            events.push_tick(outcome);
        }
        self.scheduler.complete(self.state.frame());
        self.forget_received();

        self.settle_resolved(&mut events);
        events
    }

    /// Waits for the next message from the peer and handles it without
    /// ticking. Resolves with an error once the channel is closed or failed.
    pub async fn wait_for_message(&mut self) -> Result<SessionEvents, OrbitClientError> {
        let payload = self.transport.recv().await?;

        let mut events = SessionEvents::new();
        self.drain_state_changes(&mut events);
        self.receive(&payload, Instant::now(), &mut events);
        self.settle_resolved(&mut events);
        Ok(events)
    }

    /// Drops a body at rest at `(x, y)`
    pub fn spawn(&mut self, x: f32, y: f32, mass: f32) -> Result<InputEvent, OrbitClientError> {
        let kind = InputKind::try_spawn(x, y, mass)?;
        self.submit(kind)
    }

    /// Throws a body from the press point towards the release point
    pub fn impulse(
        &mut self,
        down_x: f32,
        down_y: f32,
        mass: f32,
        up_x: f32,
        up_y: f32,
    ) -> Result<InputEvent, OrbitClientError> {
        let kind = InputKind::try_impulse(down_x, down_y, mass, up_x, up_y)?;
        self.submit(kind)
    }

    /// Schedules a local input far enough ahead that the peer receives it
    /// before simulating its frame, applies it locally and sends it. The
    /// input is sent again on every update until the peer reports a frame
    /// past it.
    pub fn submit(&mut self, kind: InputKind) -> Result<InputEvent, OrbitClientError> {
        kind.validate()?;
        let frame = self.state.frame().saturating_add(self.input_delay());
        let event = InputEvent::new(frame, self.config.peer_id, self.next_sequence, kind);
        self.state.enqueue(event)?;
        self.next_sequence = self.next_sequence.wrapping_add(1);

        if self.transport.state().is_open() {
            self.send(&Message::Input(event));
            self.outgoing.push(event);
        } else {
            debug!(
                "Link is {}, input for frame {} stays local",
                self.transport.state(),
                frame
            );
        }
        Ok(event)
    }

    /// Frames between now and when a new local input is applied
    pub fn input_delay(&self) -> u32 {
        let tick_rate = self.config.physics.tick_rate_hz.max(1) as f32;
        let latency_frames = (self.pings.one_way_secs() * tick_rate).ceil() as u32;
        self.config
            .input_delay_frames
            .max(latency_frames.saturating_add(1))
    }

    /// Swaps in a fresh channel to the peer. Latency, fingerprint history and
    /// counters start over; the world and pending inputs are kept.
    pub fn reconnect(&mut self, transport: T) {
        self.transport.close();
        self.transport = transport;
        self.state_changes = watch(&self.transport);
        self.pings = PingManager::new(&self.config.ping);
        self.sync = Synchronizer::new(&self.config.sync);
        self.scheduler.reset();
        self.remote = None;
        self.target_frame = self.state.frame();
        self.late_inputs = 0;
        self.stalls = 0;
        info!("Session reconnected at frame {}", self.state.frame());
    }

    pub fn close(&self) {
        self.transport.close();
    }

    // Accessors

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn world(&self) -> &World {
        self.state.world()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.transport.state()
    }

    pub fn current_frame(&self) -> FrameIndex {
        self.state.frame()
    }

    pub fn target_frame(&self) -> FrameIndex {
        self.target_frame
    }

    /// Smoothed round trip time to the peer in seconds
    pub fn latency_secs(&self) -> f32 {
        self.pings.rtt_secs()
    }

    pub fn packet_loss(&self) -> f32 {
        self.sync.packet_loss()
    }

    pub fn hash_successes(&self) -> u64 {
        self.sync.hash_successes()
    }

    pub fn hash_failures(&self) -> u64 {
        self.sync.hash_failures()
    }

    pub fn hash_inconclusive(&self) -> u64 {
        self.sync.hash_inconclusive()
    }

    pub fn late_inputs(&self) -> u64 {
        self.late_inputs
    }

    pub fn metrics(&self) -> Metrics {
        Metrics {
            current_frame: self.state.frame(),
            target_frame: self.target_frame,
            remote_frame: self.remote.map(|remote| remote.frame),
            latency_secs: self.latency_secs(),
            packet_loss: self.packet_loss(),
            hash_successes: self.hash_successes(),
            hash_failures: self.hash_failures(),
            hash_inconclusive: self.hash_inconclusive(),
            late_inputs: self.late_inputs,
            stalls: self.stalls,
            body_count: self.state.world().len(),
            pending_inputs: self.state.inputs().len(),
        }
    }

    pub fn render_snapshot(&self) -> RenderSnapshot {
        RenderSnapshot::capture(self.state.frame(), self.state.world())
    }

    /// Bootstrap blob a late joiner can start from
    pub fn snapshot_bytes(&self) -> Vec<u8> {
        Snapshot::encode(&self.state)
    }

    // Private

    fn receive(&mut self, payload: &[u8], now: Instant, events: &mut SessionEvents) {
        let Ok(message) = Message::from_bytes(payload) else {
            warn!("Dropping malformed message of {} bytes", payload.len());
            return;
        };

        match message {
            Message::Ping { index, frame } => {
                self.observe_remote_frame(frame, now);
                let pong = Message::Pong {
                    index,
                    frame: self.state.frame(),
                };
                self.send(&pong);
            }
            Message::Pong { index, frame } => {
                if self.pings.process_pong(index, &now).is_some() {
                    self.sync.record_ping_answered();
                }
                self.observe_remote_frame(frame, now);
            }
            Message::Fingerprint { frame, fingerprint } => {
                self.observe_remote_frame(frame, now);
                let verdict = self.sync.receive_remote(frame, fingerprint);
                report_verdict(frame, verdict, events);
            }
            Message::Input(event) => {
                self.receive_input(event, events);
            }
        }
    }

    fn receive_input(&mut self, event: InputEvent, events: &mut SessionEvents) {
        let key = event.key();
        if self.received.contains(&key) {
            trace!("Ignoring repeated input {:?}", key);
            return;
        }
        match self.state.enqueue(event) {
            Ok(()) => {
                self.received.insert(key);
            }
            Err(error @ InputError::TooLate { .. }) => {
                self.late_inputs += 1;
                warn!("Peer input {:?}: {}", key, error);
                events.push_late_input(event, error);
            }
            Err(error) => warn!("Dropping peer input {:?}: {}", key, error),
        }
    }

    fn resend_inputs(&mut self) {
        let acknowledged = match self.remote {
            Some(remote) => remote.frame,
            None => self.state.frame().saturating_sub(self.retained_frames()),
        };
        let dropped = self.outgoing.acknowledge(acknowledged);
        if dropped > 0 {
            trace!("{} sent inputs acknowledged", dropped);
        }
        if !self.transport.state().is_open() {
            return;
        }
        for event in self.outgoing.iter() {
            self.send(&Message::Input(*event));
        }
    }

    fn forget_received(&mut self) {
        let oldest = self.state.frame().saturating_sub(self.retained_frames());
        self.received.forget_before(oldest);
    }

    // Input bookkeeping covers the same span as the fingerprint history
    fn retained_frames(&self) -> u32 {
        u32::try_from(self.config.sync.history_capacity).unwrap_or(u32::MAX)
    }

    fn send(&self, message: &Message) {
        if let Err(error) = self.transport.send(&message.to_bytes()) {
            debug!("Couldn't send {:?}: {}", message, error);
        }
    }

    fn observe_remote_frame(&mut self, frame: FrameIndex, now: Instant) {
        let newer = self.remote.map_or(true, |remote| frame >= remote.frame);
        if newer {
            self.remote = Some(RemoteFrame {
                frame,
                received_at: now,
            });
        }
    }

    // Where the peer should be by now: its last reported frame, advanced by
    // the time since we heard it plus the time the report spent in flight.
    // Without an open link or any report the session just keeps its own pace.
    fn estimate_target(&self, now: Instant) -> FrameIndex {
        let current = self.state.frame();
        let Some(remote) = self.remote else {
            return current;
        };
        if !self.transport.state().is_open() {
            return current;
        }

        let tick_rate = self.config.physics.tick_rate_hz.max(1) as f32;
        let since = now.duration_since(remote.received_at).as_secs_f32();
        let ahead = ((since + self.pings.one_way_secs()) * tick_rate).floor();
        remote.frame.saturating_add(ahead as u32)
    }

    fn drain_state_changes(&mut self, events: &mut SessionEvents) {
        let changes = std::mem::take(
            &mut *self
                .state_changes
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for state in changes {
            if !state.is_open() {
                self.remote = None;
            }
            events.push_connection(state);
        }
    }

    fn settle_resolved(&mut self, events: &mut SessionEvents) {
        for (frame, verdict) in self.sync.take_resolved() {
            report_verdict(frame, verdict, events);
        }
    }
}

fn watch<T: Transport>(transport: &T) -> StateChanges {
    let changes = StateChanges::default();
    let sink = changes.clone();
    transport.on_state_change(Box::new(move |state| {
        sink.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(state.clone());
    }));
    changes
}

fn report_verdict(frame: FrameIndex, verdict: Verdict, events: &mut SessionEvents) {
    match verdict {
        Verdict::Mismatch(desync) => events.push_desync(desync),
        Verdict::Inconclusive => events.push_inconclusive(frame),
        Verdict::Match | Verdict::Pending => {}
    }
}
