use std::time::Duration;

use log::{debug, warn};

use orbit_shared::FrameIndex;

use super::scheduler_config::SchedulerConfig;

/// The session fell further behind its target than one update may recover
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StallCondition {
    pub current: FrameIndex,
    pub target: FrameIndex,
    /// Ticks that would have been needed to catch up
    pub wanted: u32,
    /// Ticks actually allowed
    pub max: u32,
}

/// How many ticks to run this update
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickPlan {
    pub ticks: u32,
    pub stall: Option<StallCondition>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerPhase {
    Idle,
    Ticking,
}

/// Paces ticks against wall-clock time and against the peer's progress
pub struct FrameScheduler {
    tick_duration: Duration,
    max_catch_up_ticks: u32,
    tolerance_frames: u32,
    accumulator: Duration,
    phase: SchedulerPhase,
    last_frame: Option<FrameIndex>,
}

impl FrameScheduler {
    pub fn new(config: &SchedulerConfig, tick_duration: Duration) -> Self {
        Self {
            tick_duration: tick_duration.max(Duration::from_nanos(1)),
            max_catch_up_ticks: config.max_catch_up_ticks.max(1),
            tolerance_frames: config.tolerance_frames,
            accumulator: Duration::ZERO,
            phase: SchedulerPhase::Idle,
            last_frame: None,
        }
    }

    /// Decides how many ticks to run, given the last completed frame, the
    /// frame the session should be at, and the wall-clock time since the
    /// previous plan.
    ///
    /// More than `tolerance_frames` ahead of the target the session waits.
    /// More than `tolerance_frames` behind what elapsed time covers, it runs
    /// enough ticks to reach the target. Otherwise it runs one tick per tick
    /// of elapsed time. Never more than `max_catch_up_ticks`.
    pub fn plan(&mut self, current: FrameIndex, target: FrameIndex, elapsed: Duration) -> TickPlan {
        self.accumulator = self.accumulator.saturating_add(elapsed);

        if current > target.saturating_add(self.tolerance_frames) {
            // waiting for the peer; keep at most one tick of credit
            self.accumulator = self.accumulator.min(self.tick_duration);
            return TickPlan {
                ticks: 0,
                stall: None,
            };
        }

        let due = self.ticks_in(self.accumulator);
        let behind = target.saturating_sub(current);
        let wanted = if behind > due.saturating_add(self.tolerance_frames) {
            behind
        } else {
            due
        };
        let ticks = wanted.min(self.max_catch_up_ticks);

        let consumed = due.min(ticks);
        self.accumulator = self
            .accumulator
            .saturating_sub(self.tick_duration.saturating_mul(consumed));

        let mut stall = None;
        if wanted > self.max_catch_up_ticks {
            // drop the time debt beyond this update's budget
            self.accumulator = self.accumulator.min(self.tick_duration);
            let condition = StallCondition {
                current,
                target,
                wanted,
                max: self.max_catch_up_ticks,
            };
            warn!(
                "Stalled at frame {} with target {}: wanted {} ticks, running {}",
                current, target, wanted, ticks
            );
            stall = Some(condition);
        }

        if ticks > 0 {
            self.phase = SchedulerPhase::Ticking;
        }
        debug!("Planned {} ticks from frame {}", ticks, current);

        TickPlan { ticks, stall }
    }

    /// Marks the planned ticks as done
    pub fn complete(&mut self, frame: FrameIndex) {
        self.phase = SchedulerPhase::Idle;
        self.last_frame = Some(frame);
    }

    pub fn phase(&self) -> SchedulerPhase {
        self.phase
    }

    pub fn last_frame(&self) -> Option<FrameIndex> {
        self.last_frame
    }

    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    /// Forgets accumulated time
    pub fn reset(&mut self) {
        self.accumulator = Duration::ZERO;
        self.phase = SchedulerPhase::Idle;
    }

    fn ticks_in(&self, time: Duration) -> u32 {
        let ticks = time.as_nanos() / self.tick_duration.as_nanos();
        u32::try_from(ticks).unwrap_or(u32::MAX)
    }
}
