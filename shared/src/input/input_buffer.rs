use std::collections::BTreeMap;

use log::debug;

use crate::{
    input::{
        error::InputError,
        input_event::{InputEvent, InputKey},
    },
    FrameIndex,
};

/// Inputs waiting for their frame. Events are kept sorted by
/// `(frame, origin, sequence)`, so arrival order never affects the order in
/// which they are applied.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputBuffer {
    next_frame: FrameIndex,
    pending: BTreeMap<InputKey, InputEvent>,
}

impl InputBuffer {
    /// Creates an empty buffer whose next frame to simulate is `next_frame`
    pub fn new(next_frame: FrameIndex) -> Self {
        Self {
            next_frame,
            pending: BTreeMap::new(),
        }
    }

    /// Schedules an event. Events for frames that were already simulated are
    /// refused, and an event whose key is already queued is ignored.
    pub fn enqueue(&mut self, event: InputEvent) -> Result<(), InputError> {
        event.kind().validate()?;

        if event.frame() < self.next_frame {
            return Err(InputError::TooLate {
                frame: event.frame(),
                current: self.next_frame,
            });
        }

        let key = event.key();
        if self.pending.contains_key(&key) {
            debug!("Ignoring duplicate input {:?}", key);
            return Ok(());
        }
        self.pending.insert(key, event);
        Ok(())
    }

    /// Removes and returns every event for `frame`, ordered by origin then
    /// sequence. Afterwards events for `frame` or earlier are too late.
    pub fn drain(&mut self, frame: FrameIndex) -> Vec<InputEvent> {
        let later = match frame.checked_add(1) {
            Some(next) => self.pending.split_off(&(next, 0, 0)),
            None => BTreeMap::new(),
        };
        let due = std::mem::replace(&mut self.pending, later);
        self.next_frame = self.next_frame.max(frame.saturating_add(1));
        due.into_values().collect()
    }

    pub fn next_frame(&self) -> FrameIndex {
        self.next_frame
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Queued events in application order
    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> + '_ {
        self.pending.values()
    }
}
