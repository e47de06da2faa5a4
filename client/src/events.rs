use std::vec::IntoIter;

use orbit_shared::{ConnectionState, FrameIndex, InputEvent, InputError, TickOutcome};

use crate::{scheduler::frame_scheduler::StallCondition, sync::synchronizer::Desync};

/// Everything that happened during one [`Session::update`](crate::Session::update)
pub struct SessionEvents {
    ticks: Vec<TickOutcome>,
    desyncs: Vec<Desync>,
    inconclusive: Vec<FrameIndex>,
    stalls: Vec<StallCondition>,
    connection: Vec<ConnectionState>,
    late_inputs: Vec<(InputEvent, InputError)>,
    empty: bool,
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionEvents {
    pub(crate) fn new() -> Self {
        Self {
            ticks: Vec::new(),
            desyncs: Vec::new(),
            inconclusive: Vec::new(),
            stalls: Vec::new(),
            connection: Vec::new(),
            late_inputs: Vec::new(),
            empty: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: SessionEvent>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: SessionEvent>(&self) -> bool {
        V::has(self)
    }

    pub(crate) fn push_tick(&mut self, outcome: TickOutcome) {
        self.ticks.push(outcome);
        self.empty = false;
    }

    pub(crate) fn push_desync(&mut self, desync: Desync) {
        self.desyncs.push(desync);
        self.empty = false;
    }

    pub(crate) fn push_inconclusive(&mut self, frame: FrameIndex) {
        self.inconclusive.push(frame);
        self.empty = false;
    }

    pub(crate) fn push_stall(&mut self, stall: StallCondition) {
        self.stalls.push(stall);
        self.empty = false;
    }

    pub(crate) fn push_connection(&mut self, state: ConnectionState) {
        self.connection.push(state);
        self.empty = false;
    }

    pub(crate) fn push_late_input(&mut self, event: InputEvent, error: InputError) {
        self.late_inputs.push((event, error));
        self.empty = false;
    }
}

// Event Trait
pub trait SessionEvent {
    type Iter;

    fn iter(events: &mut SessionEvents) -> Self::Iter;

    fn has(events: &SessionEvents) -> bool;
}

// Tick Event
pub struct TickEvent;
impl SessionEvent for TickEvent {
    type Iter = IntoIter<TickOutcome>;

    fn iter(events: &mut SessionEvents) -> Self::Iter {
        let list = std::mem::take(&mut events.ticks);
        IntoIterator::into_iter(list)
    }

    fn has(events: &SessionEvents) -> bool {
        !events.ticks.is_empty()
    }
}

// Desync Event
pub struct DesyncEvent;
impl SessionEvent for DesyncEvent {
    type Iter = IntoIter<Desync>;

    fn iter(events: &mut SessionEvents) -> Self::Iter {
        let list = std::mem::take(&mut events.desyncs);
        IntoIterator::into_iter(list)
    }

    fn has(events: &SessionEvents) -> bool {
        !events.desyncs.is_empty()
    }
}

// Inconclusive Event
pub struct InconclusiveEvent;
impl SessionEvent for InconclusiveEvent {
    type Iter = IntoIter<FrameIndex>;

    fn iter(events: &mut SessionEvents) -> Self::Iter {
        let list = std::mem::take(&mut events.inconclusive);
        IntoIterator::into_iter(list)
    }

    fn has(events: &SessionEvents) -> bool {
        !events.inconclusive.is_empty()
    }
}

// Stall Event
pub struct StallEvent;
impl SessionEvent for StallEvent {
    type Iter = IntoIter<StallCondition>;

    fn iter(events: &mut SessionEvents) -> Self::Iter {
        let list = std::mem::take(&mut events.stalls);
        IntoIterator::into_iter(list)
    }

    fn has(events: &SessionEvents) -> bool {
        !events.stalls.is_empty()
    }
}

// Connection Event
pub struct ConnectionEvent;
impl SessionEvent for ConnectionEvent {
    type Iter = IntoIter<ConnectionState>;

    fn iter(events: &mut SessionEvents) -> Self::Iter {
        let list = std::mem::take(&mut events.connection);
        IntoIterator::into_iter(list)
    }

    fn has(events: &SessionEvents) -> bool {
        !events.connection.is_empty()
    }
}

// Late Input Event
pub struct LateInputEvent;
impl SessionEvent for LateInputEvent {
    type Iter = IntoIter<(InputEvent, InputError)>;

    fn iter(events: &mut SessionEvents) -> Self::Iter {
        let list = std::mem::take(&mut events.late_inputs);
        IntoIterator::into_iter(list)
    }

    fn has(events: &SessionEvents) -> bool {
        !events.late_inputs.is_empty()
    }
}
