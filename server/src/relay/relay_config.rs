use std::default::Default;

use orbit_shared::PhysicsConfig;

/// Contains Config properties which will be used by the Relay
#[derive(Clone, Debug)]
pub struct RelayConfig {
    /// Must be identical to every peer's physics
    pub physics: PhysicsConfig,
    /// A fingerprint is broadcast every `hash_interval` frames. Peers should
    /// use the same interval.
    pub hash_interval: u32,
    /// Frames of fingerprint history kept for checking peer fingerprints
    pub history_capacity: usize,
    /// Most ticks a single update may run
    pub max_catch_up_ticks: u32,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            hash_interval: 6,
            history_capacity: 256,
            max_catch_up_ticks: 10,
        }
    }
}
