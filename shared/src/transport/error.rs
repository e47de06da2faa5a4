use thiserror::Error;

/// Errors that can occur while using a [`Transport`](super::Transport)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The channel isn't open yet, or was closed or failed
    #[error("Transport is not open, nothing can be sent")]
    NotOpen,

    /// The channel was closed; a pending receive ends with this error
    #[error("Transport was closed")]
    Closed,

    /// The channel failed and can't be used again
    #[error("Transport failed: {reason}")]
    Failed { reason: String },

    /// The underlying channel refused the payload
    #[error("Failed to send payload of {len} bytes")]
    SendFailed { len: usize },
}
