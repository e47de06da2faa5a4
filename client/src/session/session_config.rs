use std::default::Default;

use orbit_shared::{PeerId, PhysicsConfig};

use crate::{
    connection::ping_config::PingConfig, scheduler::scheduler_config::SchedulerConfig,
    sync::sync_config::SyncConfig,
};

/// Contains Config properties which will be used by a Session
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Identifies this peer's inputs. Must differ between the two peers.
    pub peer_id: PeerId,
    /// Must be identical on both peers
    pub physics: PhysicsConfig,
    pub scheduler: SchedulerConfig,
    pub sync: SyncConfig,
    /// Configuration used to measure the round trip time to the peer
    pub ping: PingConfig,
    /// Minimum number of frames between issuing a local input and applying it
    pub input_delay_frames: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            peer_id: 0,
            physics: PhysicsConfig::default(),
            scheduler: SchedulerConfig::default(),
            sync: SyncConfig::default(),
            ping: PingConfig::default(),
            input_delay_frames: 7,
        }
    }
}
