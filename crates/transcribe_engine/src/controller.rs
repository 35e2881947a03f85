use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use engine_logging::{engine_debug, engine_info, engine_trace, engine_warn};
use transcribe_core::{
    update, Effect, EstimatorSettings, ExitDecision, JobGeneration, JobInput, JobSnapshot,
    JobState, Msg, TransitionError,
};

use crate::export::{export_transcript, ExportError, ExportOptions, ExportSummary};
use crate::{Clock, Scheduler, TimerHandle};

/// Receives a fresh snapshot after every state change.
pub trait JobObserver {
    fn on_state_changed(&mut self, snapshot: &JobSnapshot);
}

impl<F: FnMut(&JobSnapshot)> JobObserver for F {
    fn on_state_changed(&mut self, snapshot: &JobSnapshot) {
        self(snapshot)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug, Clone, Copy)]
struct PendingCompletion {
    generation: JobGeneration,
    handle: TimerHandle,
}

/// Owns the job state and drives it through the pure `update` function.
///
/// All operations run on the caller's thread. Fired timers are fed back in
/// through [`JobController::on_completion_due`] by whoever drives the
/// scheduler.
pub struct JobController<C, S> {
    state: JobState,
    clock: C,
    scheduler: S,
    // Present iff the state is Running.
    pending: Option<PendingCompletion>,
    observers: Vec<(SubscriptionId, Box<dyn JobObserver>)>,
    next_subscription: u64,
}

impl<C: Clock, S: Scheduler> JobController<C, S> {
    pub fn new(clock: C, scheduler: S) -> Self {
        Self::with_settings(clock, scheduler, EstimatorSettings::default())
    }

    pub fn with_settings(clock: C, scheduler: S, settings: EstimatorSettings) -> Self {
        Self {
            state: JobState::with_settings(settings),
            clock,
            scheduler,
            pending: None,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn select_input(&mut self, input: JobInput) -> Result<(), TransitionError> {
        engine_info!("Input selected name={} size_bytes={}", input.name, input.size_bytes);
        self.dispatch(Msg::InputSelected(input))
    }

    /// Starts a job for the selected input and returns its generation.
    pub fn start(&mut self) -> Result<JobGeneration, TransitionError> {
        let now = self.clock.now();
        self.dispatch(Msg::StartRequested { now })?;
        let generation = self.state.running_generation().unwrap_or_default();
        engine_info!(
            "Job {} started at {} estimated_completion_at={:?}",
            generation,
            now.to_rfc3339(),
            self.state.estimated_completion_at().map(|at| at.to_rfc3339())
        );
        Ok(generation)
    }

    /// Stops the running job. Does nothing when no job is running.
    pub fn cancel(&mut self) {
        let Some(generation) = self.state.running_generation() else {
            engine_debug!("Cancel ignored: no job running");
            return;
        };
        self.release_pending(generation);
        if let Err(err) = self.dispatch(Msg::CancelRequested) {
            engine_warn!("Cancel rejected: {}", err);
            return;
        }
        engine_info!("Job {} cancelled", generation);
    }

    /// Entry point for a fired completion timer. Returns whether it completed the
    /// current job; timers of cancelled or superseded jobs are discarded.
    pub fn on_completion_due(&mut self, generation: JobGeneration) -> bool {
        if self.state.running_generation() != Some(generation) {
            engine_debug!("Discarding stale completion for job {}", generation);
            return false;
        }
        self.release_pending(generation);
        if let Err(err) = self.dispatch(Msg::CompletionDue { generation }) {
            engine_warn!("Completion for job {} rejected: {}", generation, err);
            return false;
        }
        engine_info!("Job {} completed", generation);
        true
    }

    pub fn current_state(&self) -> JobSnapshot {
        self.state.view()
    }

    pub fn should_warn_on_exit(&self) -> bool {
        transcribe_core::should_warn_on_exit(&self.state)
    }

    pub fn exit_decision(&self) -> ExitDecision {
        transcribe_core::exit_decision(&self.state)
    }

    /// Time since the running job started.
    pub fn elapsed(&self) -> Option<TimeDelta> {
        self.state.view().elapsed(self.clock.now())
    }

    /// Time until the running job's estimated completion.
    pub fn remaining(&self) -> Option<TimeDelta> {
        self.state.view().remaining(self.clock.now())
    }

    /// Writes the finished transcript into `dir`.
    pub fn export_result(
        &self,
        dir: &Path,
        options: &ExportOptions,
    ) -> Result<ExportSummary, ExportError> {
        let result = self.state.result().ok_or(ExportError::NoResult)?;
        export_transcript(dir, result, self.clock.now(), options)
    }

    /// Default export location for the current result, if there is one.
    pub fn export_path(&self, dir: &Path) -> Option<PathBuf> {
        self.state
            .result()
            .map(|result| dir.join(crate::transcript_filename(&result.file_name)))
    }

    pub fn subscribe(&mut self, observer: Box<dyn JobObserver>) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.observers.push((id, observer));
        id
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    fn dispatch(&mut self, msg: Msg) -> Result<(), TransitionError> {
        let effects = update(&mut self.state, msg)?;
        for effect in effects {
            self.run_effect(effect);
        }
        if self.state.consume_dirty() {
            self.notify();
        }
        Ok(())
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::ScheduleCompletion { generation, delay } => {
                let handle = self.scheduler.schedule(generation, delay);
                engine_debug!(
                    "Scheduled {} for job {} in {}s",
                    handle,
                    generation,
                    delay.as_secs()
                );
                self.pending = Some(PendingCompletion { generation, handle });
            }
            Effect::CancelCompletion { generation } => {
                // Normally released before the state left Running.
                self.release_pending(generation);
            }
        }
    }

    /// Voids the scheduled timer for `generation`, if it is still held.
    fn release_pending(&mut self, generation: JobGeneration) {
        match self.pending {
            Some(pending) if pending.generation == generation => {
                self.pending = None;
                let cancelled = self.scheduler.cancel(pending.handle);
                engine_trace!(
                    "Released {} for job {} (cancelled={})",
                    pending.handle,
                    generation,
                    cancelled
                );
            }
            _ => {}
        }
    }

    fn notify(&mut self) {
        let snapshot = self.state.view();
        for (_, observer) in &mut self.observers {
            observer.on_state_changed(&snapshot);
        }
    }
}
