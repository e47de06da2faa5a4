use log::info;
use thiserror::Error;

use orbit_serde::{BitReader, BitWriter, Serde, SerdeErr};

use crate::{Fingerprint, FrameIndex, InputBuffer, InputError, InputEvent, SimState, World};

/// Errors that can occur while decoding a bootstrap snapshot
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// The blob is truncated or malformed
    #[error("Snapshot could not be decoded: {0}")]
    Decode(#[from] SerdeErr),

    /// The decoded world doesn't hash to the fingerprint stored alongside it
    #[error("Snapshot fingerprint mismatch: blob says {expected}, decoded world hashes to {found}")]
    FingerprintMismatch {
        expected: Fingerprint,
        found: Fingerprint,
    },

    /// Bytes remain after the snapshot
    #[error("Snapshot has {count} unexpected trailing bytes")]
    TrailingBytes { count: usize },

    /// A pending input can't be scheduled on the decoded state
    #[error("Snapshot carries an unusable pending input: {0}")]
    InvalidInput(#[from] InputError),
}

/// Binary bootstrap format for a [`SimState`]:
/// `fingerprint, frame, world, pending inputs`.
pub struct Snapshot;

impl Snapshot {
    pub fn encode(state: &SimState) -> Vec<u8> {
        let mut writer = BitWriter::new();
        state.fingerprint().ser(&mut writer);
        state.frame().ser(&mut writer);
        state.world().ser(&mut writer);
        let pending: Vec<InputEvent> = state.inputs().iter().copied().collect();
        pending.ser(&mut writer);
        writer.to_bytes()
    }

    pub fn decode(bytes: &[u8]) -> Result<SimState, SnapshotError> {
        let mut reader = BitReader::new(bytes);
        let expected = Fingerprint::de(&mut reader)?;
        let frame = FrameIndex::de(&mut reader)?;
        let world = World::de(&mut reader)?;
        let pending = Vec::<InputEvent>::de(&mut reader)?;

        let count = reader.bytes_remaining();
        if count > 0 {
            return Err(SnapshotError::TrailingBytes { count });
        }

        let found = world.fingerprint();
        if found != expected {
            return Err(SnapshotError::FingerprintMismatch { expected, found });
        }

        let mut inputs = InputBuffer::new(frame);
        for event in pending {
            inputs.enqueue(event)?;
        }

        info!(
            "Decoded snapshot at frame {} with {} bodies and {} pending inputs",
            frame,
            world.len(),
            inputs.len()
        );
        Ok(SimState::from_parts(world, frame, inputs))
    }
}
