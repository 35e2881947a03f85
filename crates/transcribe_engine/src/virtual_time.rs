use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use engine_logging::engine_trace;
use transcribe_core::JobGeneration;

use crate::{Clock, JobController, ManualClock, Scheduler, TimerHandle};

#[derive(Debug, Clone)]
struct VirtualTimer {
    handle: TimerHandle,
    generation: JobGeneration,
    deadline: DateTime<Utc>,
}

/// Deterministic scheduler driven by a [`ManualClock`].
///
/// Timers become due once the shared clock reaches their deadline, and are
/// only delivered through [`VirtualScheduler::due`], never from inside
/// [`Scheduler::schedule`]. A zero delay therefore still completes on the next
/// drain, not in the caller's stack frame.
#[derive(Debug, Clone)]
pub struct VirtualScheduler {
    clock: ManualClock,
    timers: Vec<VirtualTimer>,
    next_handle: u64,
}

impl VirtualScheduler {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            timers: Vec::new(),
            next_handle: 1,
        }
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Removes and returns every timer whose deadline has passed, earliest first.
    pub fn due(&mut self) -> Vec<JobGeneration> {
        let now = self.clock.now();
        let (mut fired, waiting): (Vec<_>, Vec<_>) = self
            .timers
            .drain(..)
            .partition(|timer| timer.deadline <= now);
        self.timers = waiting;
        fired.sort_by_key(|timer| (timer.deadline, timer.handle));
        fired
            .into_iter()
            .map(|timer| {
                engine_trace!("{} fired for job {}", timer.handle, timer.generation);
                timer.generation
            })
            .collect()
    }
}

impl Scheduler for VirtualScheduler {
    fn schedule(&mut self, generation: JobGeneration, delay: Duration) -> TimerHandle {
        let handle = TimerHandle::from_raw(self.next_handle);
        self.next_handle += 1;
        let deadline = TimeDelta::from_std(delay)
            .ok()
            .and_then(|delta| self.clock.now().checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.timers.push(VirtualTimer {
            handle,
            generation,
            deadline,
        });
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.handle != handle);
        self.timers.len() != before
    }
}

impl<C: Clock> JobController<C, VirtualScheduler> {
    /// Delivers every timer that is due on the virtual clock. Returns how many
    /// completions were applied.
    pub fn run_due_timers(&mut self) -> usize {
        let fired = self.scheduler_mut().due();
        fired
            .into_iter()
            .filter(|generation| self.on_completion_due(*generation))
            .count()
    }

    /// Moves the shared virtual clock forward and delivers whatever became due.
    pub fn advance(&mut self, by: Duration) -> usize {
        self.scheduler_mut().clock().advance(by);
        self.run_due_timers()
    }
}
