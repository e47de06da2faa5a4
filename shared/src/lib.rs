//! # Orbit Shared
//! The deterministic simulation core shared by orbit peers and the relay:
//! the body/world model, the fixed-step engine, the input pipeline, frame
//! fingerprints, the wire protocol and the transport abstraction.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

#[macro_use]
extern crate cfg_if;

cfg_if! {
    if #[cfg(all(target_arch = "wasm32", not(feature = "wbindgen")))]
    {
        compile_error!("wasm target for 'orbit_shared' crate requires the 'wbindgen' feature to be enabled.");
    }
}

pub use instant::Instant;
pub use orbit_serde::{
    BitReader, BitWrite, BitWriter, ConstBitLength, Serde, SerdeErr, UnsignedInteger,
};

mod frame_history;
mod input;
mod math;
mod messages;
mod sim_state;
mod snapshot;
mod transport;
mod types;
mod world;

pub use frame_history::{FrameHistory, FrameRecord, Lookup};
pub use input::{
    error::InputError,
    input_buffer::InputBuffer,
    input_event::{InputEvent, InputKey, InputKind},
    input_log::{OutgoingInputs, ReceivedInputs},
};
pub use math::{cbrt, sqrt, Float, Vec2};
pub use messages::Message;
pub use sim_state::{SimState, TickOutcome};
pub use snapshot::{Snapshot, SnapshotError};
pub use transport::{
    connection_status::{ConnectionState, ConnectionStatus, StateListener},
    error::TransportError,
    link_conditioner::LinkConditioner,
    local::LocalTransport,
    RecvFuture, Transport,
};
pub use types::{BodyId, FrameIndex, PeerId, PingIndex};
pub use world::{
    body::Body,
    fingerprint::Fingerprint,
    physics::{PhysicsConfig, StepReport},
    World,
};
