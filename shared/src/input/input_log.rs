use std::collections::{BTreeMap, BTreeSet};

use crate::{
    input::input_event::{InputEvent, InputKey},
    FrameIndex,
};

/// Inputs sent to a peer that it may not have received yet. Messages can be
/// lost, so the sender repeats every entry on each update until the peer
/// reports a frame past it.
#[derive(Clone, Debug, Default)]
pub struct OutgoingInputs {
    pending: BTreeMap<InputKey, InputEvent>,
}

impl OutgoingInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        self.pending.insert(event.key(), event);
    }

    /// Forgets inputs for frames the peer has already simulated, given that
    /// it reported `remote_frame` completed ticks. Returns how many were
    /// dropped.
    pub fn acknowledge(&mut self, remote_frame: FrameIndex) -> usize {
        let unacked = self.pending.split_off(&(remote_frame, 0, 0));
        let acked = std::mem::replace(&mut self.pending, unacked);
        acked.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> + '_ {
        self.pending.values()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Keys of inputs already accepted from peers. A repeated copy that arrives
/// after its frame was simulated is recognized here instead of being taken
/// for a late input.
#[derive(Clone, Debug, Default)]
pub struct ReceivedInputs {
    seen: BTreeSet<InputKey>,
}

impl ReceivedInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the key was already known
    pub fn insert(&mut self, key: InputKey) -> bool {
        self.seen.insert(key)
    }

    pub fn contains(&self, key: &InputKey) -> bool {
        self.seen.contains(key)
    }

    /// Drops keys for frames before `frame`
    pub fn forget_before(&mut self, frame: FrameIndex) {
        self.seen = self.seen.split_off(&(frame, 0, 0));
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
