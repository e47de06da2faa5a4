use thiserror::Error;

use orbit_shared::PeerId;

/// Errors that can occur while managing relay peers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrbitServerError {
    /// Another peer already uses this id
    #[error("Peer {peer} is already connected")]
    DuplicatePeer { peer: PeerId },
}
