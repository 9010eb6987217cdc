//! Time-based animation helpers.

use std::time::Duration;

mod timing;

pub use timing::TimingFunction;

/// A single eased run from 0.0 to 1.0 over `duration`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween {
    pub duration: Duration,
    pub timing: TimingFunction,
    started: Duration,
}

impl Tween {
    /// Start a tween at virtual time `now`.
    pub fn start(duration: Duration, timing: TimingFunction, now: Duration) -> Self {
        Self {
            duration,
            timing,
            started: now,
        }
    }

    /// Eased progress at `now`.
    pub fn progress(&self, now: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started);
        self.timing
            .evaluate(elapsed.as_secs_f32() / self.duration.as_secs_f32())
    }

    pub fn is_finished(&self, now: Duration) -> bool {
        now.saturating_sub(self.started) >= self.duration
    }
}
