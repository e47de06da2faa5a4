use thiserror::Error;

use orbit_shared::{InputError, SnapshotError, TransportError};

/// Errors surfaced by a [`Session`](crate::Session)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrbitClientError {
    /// A host input was rejected before it entered the pipeline
    #[error("Input rejected: {0}")]
    Input(#[from] InputError),

    /// The channel to the peer is unusable
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// A bootstrap snapshot couldn't be loaded
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}
