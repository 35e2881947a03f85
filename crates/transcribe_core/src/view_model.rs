use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::{guard, JobGeneration, JobInput, JobState, JobStatus, TranscriptionResult};

/// Read-only copy of [`JobState`] handed to renderers and observers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub status: JobStatus,
    pub generation: Option<JobGeneration>,
    pub input: Option<JobInput>,
    pub started_at: Option<DateTime<Utc>>,
    pub estimated_completion_at: Option<DateTime<Utc>>,
    pub result: Option<TranscriptionResult>,
    pub can_select_input: bool,
    pub can_start: bool,
    pub can_cancel: bool,
    pub should_warn_on_exit: bool,
    /// An input is chosen but nothing has run yet; the UI reminds the user this is a demo.
    pub show_demo_notice: bool,
}

impl JobSnapshot {
    pub(crate) fn from_state(state: &JobState) -> Self {
        let status = state.status();
        let running = status == JobStatus::Running;
        let has_input = state.input().is_some();
        Self {
            status,
            generation: state.running_generation(),
            input: state.input().cloned(),
            started_at: state.started_at(),
            estimated_completion_at: state.estimated_completion_at(),
            result: state.result().cloned(),
            can_select_input: !running,
            can_start: has_input && !running,
            can_cancel: running,
            should_warn_on_exit: guard::should_warn_on_exit(state),
            show_demo_notice: has_input && status == JobStatus::Idle,
        }
    }

    /// Time since the job started. `None` unless a job is running.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        if self.status != JobStatus::Running {
            return None;
        }
        self.started_at
            .map(|started| (now - started).max(TimeDelta::zero()))
    }

    /// Time left until the estimated completion, never negative.
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        self.estimated_completion_at
            .map(|end| (end - now).max(TimeDelta::zero()))
    }

    /// Fraction of the estimated duration that has passed, in `0.0..=1.0`.
    pub fn progress(&self, now: DateTime<Utc>) -> Option<f64> {
        let started = self.started_at?;
        let end = self.estimated_completion_at?;
        let total = (end - started).num_milliseconds();
        if total <= 0 {
            return Some(1.0);
        }
        let done = (now - started).num_milliseconds().clamp(0, total);
        Some(done as f64 / total as f64)
    }
}
