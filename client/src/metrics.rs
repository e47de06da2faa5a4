use orbit_shared::FrameIndex;

/// Point-in-time health of a session, refreshed on every update
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metrics {
    pub current_frame: FrameIndex,
    pub target_frame: FrameIndex,
    /// Last frame reported by the peer, if any
    pub remote_frame: Option<FrameIndex>,
    /// Smoothed round trip time in seconds
    pub latency_secs: f32,
    /// Fraction of expected messages that never arrived, 0.0 to 1.0
    pub packet_loss: f32,
    pub hash_successes: u64,
    pub hash_failures: u64,
    pub hash_inconclusive: u64,
    pub late_inputs: u64,
    pub stalls: u64,
    pub body_count: usize,
    pub pending_inputs: usize,
}
