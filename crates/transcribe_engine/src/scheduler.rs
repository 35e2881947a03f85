use std::fmt;
use std::time::Duration;

use transcribe_core::JobGeneration;

/// Opaque reference to one scheduled completion timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// One-shot deferred completions, tagged with the job they belong to.
///
/// Implementations deliver fired timers back to the event loop, which hands
/// the generation to [`crate::JobController::on_completion_due`]. A cancelled
/// timer must never be delivered.
pub trait Scheduler {
    fn schedule(&mut self, generation: JobGeneration, delay: Duration) -> TimerHandle;

    /// Returns `false` if the timer already fired or was never scheduled.
    fn cancel(&mut self, handle: TimerHandle) -> bool;
}
