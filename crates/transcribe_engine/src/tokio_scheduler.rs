use std::collections::HashMap;
use std::future::poll_fn;
use std::time::Duration;

use engine_logging::engine_trace;
use tokio_util::time::{delay_queue, DelayQueue};
use transcribe_core::JobGeneration;

use crate::{Scheduler, TimerHandle};

/// Longest single arm of the timer wheel. The wheel rejects deadlines past
/// roughly 2^36 ms, so longer delays are re-armed in slices of this size.
pub const MAX_TIMER_SLICE: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Debug, Clone, Copy)]
struct ArmedTimer {
    handle: TimerHandle,
    generation: JobGeneration,
    // Delay still owed after the current slice expires.
    remaining: Duration,
}

/// Scheduler backed by tokio's timer wheel, for the interactive event loop.
///
/// Must be used from inside a tokio runtime with the time driver enabled.
/// Fired timers are received with [`TokioScheduler::next_fired`].
#[derive(Default)]
pub struct TokioScheduler {
    queue: DelayQueue<ArmedTimer>,
    keys: HashMap<TimerHandle, delay_queue::Key>,
    next_handle: u64,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Waits for the next timer to fire. Resolves to `None` right away when
    /// nothing is scheduled, so callers should check [`Self::is_idle`] first.
    pub async fn next_fired(&mut self) -> Option<JobGeneration> {
        loop {
            let timer = poll_fn(|cx| self.queue.poll_expired(cx)).await?.into_inner();
            if !timer.remaining.is_zero() {
                engine_trace!("{} re-armed, {:?} left", timer.handle, timer.remaining);
                self.arm(timer.handle, timer.generation, timer.remaining);
                continue;
            }
            self.keys.remove(&timer.handle);
            engine_trace!("{} fired for job {}", timer.handle, timer.generation);
            return Some(timer.generation);
        }
    }

    fn arm(&mut self, handle: TimerHandle, generation: JobGeneration, delay: Duration) {
        let slice = delay.min(MAX_TIMER_SLICE);
        let timer = ArmedTimer {
            handle,
            generation,
            remaining: delay - slice,
        };
        let key = self.queue.insert(timer, slice);
        self.keys.insert(handle, key);
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&mut self, generation: JobGeneration, delay: Duration) -> TimerHandle {
        self.next_handle += 1;
        let handle = TimerHandle::from_raw(self.next_handle);
        self.arm(handle, generation, delay);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.keys.remove(&handle) {
            Some(key) => self.queue.try_remove(&key).is_some(),
            None => false,
        }
    }
}
