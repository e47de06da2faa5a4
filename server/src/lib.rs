//! # Orbit Server
//! An authoritative relay for the deterministic n-body simulation. It runs
//! the simulation itself, relays inputs between connected peers, broadcasts
//! its world fingerprints and checks every peer's fingerprints against them.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

#[macro_use]
extern crate cfg_if;

cfg_if! {
    if #[cfg(all(target_arch = "wasm32", not(feature = "wbindgen")))]
    {
        compile_error!("wasm target for 'orbit_server' crate requires the 'wbindgen' feature to be enabled.");
    }
}

pub mod shared {
    pub use orbit_shared::{
        ConnectionState, Fingerprint, FrameIndex, InputEvent, Instant, LocalTransport, Message,
        PeerId, PhysicsConfig, SimState, Snapshot, Transport,
    };
}

mod error;
mod events;
mod peer;
mod relay;

pub use error::OrbitServerError;
pub use events::{
    DesyncEvent, DisconnectEvent, InconclusiveEvent, LateInputEvent, RelayEvent, RelayEvents,
    RelayedInputEvent, TickEvent,
};
pub use peer::{PeerDesync, PeerStats};
pub use relay::{Relay, RelayConfig};
