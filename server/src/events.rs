use std::vec::IntoIter;

use orbit_shared::{ConnectionState, FrameIndex, InputError, InputEvent, PeerId, TickOutcome};

use crate::peer::PeerDesync;

/// Everything that happened during one [`Relay::update`](crate::Relay::update)
pub struct RelayEvents {
    ticks: Vec<TickOutcome>,
    desyncs: Vec<PeerDesync>,
    inconclusive: Vec<(PeerId, FrameIndex)>,
    relayed: Vec<(PeerId, InputEvent)>,
    late_inputs: Vec<(PeerId, InputEvent, InputError)>,
    disconnects: Vec<(PeerId, ConnectionState)>,
    empty: bool,
}

impl Default for RelayEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayEvents {
    pub(crate) fn new() -> Self {
        Self {
            ticks: Vec::new(),
            desyncs: Vec::new(),
            inconclusive: Vec::new(),
            relayed: Vec::new(),
            late_inputs: Vec::new(),
            disconnects: Vec::new(),
            empty: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: RelayEvent>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: RelayEvent>(&self) -> bool {
        V::has(self)
    }

    pub(crate) fn push_tick(&mut self, outcome: TickOutcome) {
        self.ticks.push(outcome);
        self.empty = false;
    }

    pub(crate) fn push_desync(&mut self, desync: PeerDesync) {
        self.desyncs.push(desync);
        self.empty = false;
    }

    pub(crate) fn push_inconclusive(&mut self, peer: PeerId, frame: FrameIndex) {
        self.inconclusive.push((peer, frame));
        self.empty = false;
    }

    pub(crate) fn push_relayed(&mut self, peer: PeerId, event: InputEvent) {
        self.relayed.push((peer, event));
        self.empty = false;
    }

    pub(crate) fn push_late_input(&mut self, peer: PeerId, event: InputEvent, error: InputError) {
        self.late_inputs.push((peer, event, error));
        self.empty = false;
    }

    pub(crate) fn push_disconnect(&mut self, peer: PeerId, state: ConnectionState) {
        self.disconnects.push((peer, state));
        self.empty = false;
    }
}

// Event Trait
pub trait RelayEvent {
    type Iter;

    fn iter(events: &mut RelayEvents) -> Self::Iter;

    fn has(events: &RelayEvents) -> bool;
}

macro_rules! relay_event {
    ($name:ident, $field:ident, $item:ty) => {
        pub struct $name;
        impl RelayEvent for $name {
            type Iter = IntoIter<$item>;

            fn iter(events: &mut RelayEvents) -> Self::Iter {
                let list = std::mem::take(&mut events.$field);
                IntoIterator::into_iter(list)
            }

            fn has(events: &RelayEvents) -> bool {
                !events.$field.is_empty()
            }
        }
    };
}

relay_event!(TickEvent, ticks, TickOutcome);
relay_event!(DesyncEvent, desyncs, PeerDesync);
relay_event!(InconclusiveEvent, inconclusive, (PeerId, FrameIndex));
relay_event!(RelayedInputEvent, relayed, (PeerId, InputEvent));
relay_event!(LateInputEvent, late_inputs, (PeerId, InputEvent, InputError));
relay_event!(DisconnectEvent, disconnects, (PeerId, ConnectionState));
