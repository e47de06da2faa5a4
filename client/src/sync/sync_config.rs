use std::default::Default;

/// Contains Config properties which will be used to exchange and verify
/// world fingerprints
#[derive(Clone, Debug)]
pub struct SyncConfig {
    /// A fingerprint is sent every `hash_interval` frames
    pub hash_interval: u32,
    /// Frames of local history kept for verifying late fingerprints
    pub history_capacity: usize,
    /// Number of expected messages the packet loss ratio is computed over
    pub loss_window: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            hash_interval: 6,
            history_capacity: 256,
            loss_window: 100,
        }
    }
}
