pub mod connection_status;
pub mod error;
pub mod link_conditioner;
pub mod local;

use std::{future::Future, pin::Pin};

use connection_status::{ConnectionState, StateListener};
use error::TransportError;

/// Resolves with the next payload, or with an error once the channel is
/// closed or failed
pub type RecvFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Box<[u8]>, TransportError>> + Send + 'a>>;

/// An ordered, possibly lossy, message channel to one peer. Messages arrive
/// in send order or not at all; nothing is retransmitted.
pub trait Transport: Send + Sync {
    fn state(&self) -> ConnectionState;

    /// Sends one message. Fails with [`TransportError::NotOpen`] unless the
    /// channel is open.
    fn send(&self, payload: &[u8]) -> Result<(), TransportError>;

    /// Takes the next message without waiting
    fn try_recv(&self) -> Option<Box<[u8]>>;

    /// Waits for the next message. Closing or failing the channel wakes a
    /// pending receive with an error.
    fn recv(&self) -> RecvFuture<'_>;

    fn close(&self);

    /// Registers a listener for lifecycle transitions
    fn on_state_change(&self, listener: StateListener);
}
