use log::trace;

use crate::{
    Fingerprint, FrameIndex, InputBuffer, InputError, InputEvent, PhysicsConfig, StepReport, World,
};

/// Result of advancing a [`SimState`] by one tick
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickOutcome {
    /// The frame the world is now at
    pub frame: FrameIndex,
    pub fingerprint: Fingerprint,
    pub report: StepReport,
}

/// Everything a peer must agree on: the world, how many ticks produced it,
/// and the inputs scheduled for future frames.
///
/// `frame` counts completed ticks, so it is also the next frame to simulate.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimState {
    world: World,
    frame: FrameIndex,
    inputs: InputBuffer,
}

impl SimState {
    pub fn new(world: World) -> Self {
        Self::from_parts(world, 0, InputBuffer::new(0))
    }

    pub(crate) fn from_parts(world: World, frame: FrameIndex, inputs: InputBuffer) -> Self {
        Self {
            world,
            frame,
            inputs,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn frame(&self) -> FrameIndex {
        self.frame
    }

    pub fn inputs(&self) -> &InputBuffer {
        &self.inputs
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.world.fingerprint()
    }

    /// Schedules an input; see [`InputBuffer::enqueue`]
    pub fn enqueue(&mut self, event: InputEvent) -> Result<(), InputError> {
        self.inputs.enqueue(event)
    }

    /// Applies this frame's inputs and steps the world once
    pub fn tick(&mut self, config: &PhysicsConfig) -> TickOutcome {
        let inputs = self.inputs.drain(self.frame);
        let report = self.world.step(config, &inputs);
        self.frame = self.frame.wrapping_add(1);

        let fingerprint = self.world.fingerprint();
        trace!("Frame {} fingerprint {}", self.frame, fingerprint);

        TickOutcome {
            frame: self.frame,
            fingerprint,
            report,
        }
    }
}
