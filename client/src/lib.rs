//! # Orbit Client
//! A peer session that runs the deterministic n-body simulation in step with
//! a remote peer over any [`Transport`](orbit_shared::Transport), exchanges
//! inputs and world fingerprints, and reports desyncs, latency and packet
//! loss.

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
        compile_error!("wasm target for 'orbit_client' crate requires the 'wbindgen' feature to be enabled.");
    }
}

pub mod shared {
    pub use orbit_shared::{
        Body, BodyId, ConnectionState, Fingerprint, FrameIndex, InputError, InputEvent, InputKind,
        Instant, LinkConditioner, LocalTransport, Message, PeerId, PhysicsConfig, SimState,
        Snapshot, SnapshotError, Transport, TransportError, World,
    };
}

mod connection;
mod error;
mod events;
mod metrics;
mod render;
mod scheduler;
mod session;
mod sync;

pub use connection::ping_config::PingConfig;
pub use error::OrbitClientError;
pub use events::{
    ConnectionEvent, DesyncEvent, InconclusiveEvent, LateInputEvent, SessionEvent, SessionEvents,
    StallEvent, TickEvent,
};
pub use metrics::Metrics;
pub use render::{BodyView, RenderSnapshot};
pub use scheduler::{
    frame_scheduler::{FrameScheduler, SchedulerPhase, StallCondition, TickPlan},
    scheduler_config::SchedulerConfig,
};
pub use session::{Session, SessionConfig};
pub use sync::{
    loss_window::LossWindow,
    sync_config::SyncConfig,
    synchronizer::{Desync, Synchronizer, Verdict},
};
