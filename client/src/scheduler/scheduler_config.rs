use std::default::Default;

/// Contains Config properties which will be used by the Frame Scheduler
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Most ticks a single update may run. A session further behind than
    /// this is stalled: it stays visibly behind its target rather than
    /// skipping frames or starving the host's render loop.
    pub max_catch_up_ticks: u32,
    /// Frames the session may drift from its target before it waits or
    /// catches up. Reports of the peer's frame lag by up to a tick.
    pub tolerance_frames: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_catch_up_ticks: 10,
            tolerance_frames: 1,
        }
    }
}
