use std::{default::Default, time::Duration};

/// Contains Config properties which will be used by a Session to measure
/// round trip time to its peer
#[derive(Clone, Debug)]
pub struct PingConfig {
    /// The duration to wait before sending a ping message to the remote host,
    /// in order to estimate RTT time
    pub ping_interval: Duration,
    /// The initial estimate for the RTT
    pub rtt_initial_estimate: Duration,
    /// Weight given to each new RTT sample in the moving average
    pub rtt_smoothing_factor: f32,
    /// A ping with no pong after this long is considered lost
    pub ping_timeout: Duration,
}

impl Default for PingConfig {
    fn default() -> Self {
        Self {
            ping_interval: Duration::from_millis(250),
            rtt_initial_estimate: Duration::from_millis(100),
            rtt_smoothing_factor: 0.1,
            ping_timeout: Duration::from_secs(1),
        }
    }
}
