use thiserror::Error;

use crate::FrameIndex;

/// Errors that can occur when creating or scheduling an input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// The event can never be applied, e.g. a non-positive mass or a
    /// coordinate that doesn't fit the simulation's number range
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: &'static str },

    /// The event targets a frame that has already been simulated. Applying it
    /// now would diverge from the peer, so it is refused instead
    #[error("Input for frame {frame} arrived too late, the next frame to simulate is {current}")]
    TooLate {
        frame: FrameIndex,
        current: FrameIndex,
    },
}
