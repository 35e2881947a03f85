use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::estimate::EstimatorSettings;
use crate::view_model::JobSnapshot;

/// The file a job is started from. Only its name and size matter to the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInput {
    pub name: String,
    pub size_bytes: u64,
}

impl JobInput {
    pub fn new(name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            size_bytes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Idle,
    Running,
    Completed,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Idle => write!(f, "idle"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Identifies one started job. Strictly increasing for the lifetime of a [`JobState`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct JobGeneration(u64);

impl JobGeneration {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for JobGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptionResult {
    pub text: String,
    pub file_name: String,
    pub processing_time_seconds: u64,
}

// Timestamps and result live inside the phase so that only the combination
// matching the status can ever be populated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum Phase {
    #[default]
    Idle,
    Running {
        generation: JobGeneration,
        started_at: DateTime<Utc>,
        estimated_completion_at: DateTime<Utc>,
    },
    Completed {
        started_at: DateTime<Utc>,
        result: TranscriptionResult,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobState {
    settings: EstimatorSettings,
    input: Option<JobInput>,
    phase: Phase,
    last_generation: JobGeneration,
    dirty: bool,
}

impl JobState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: EstimatorSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &EstimatorSettings {
        &self.settings
    }

    pub fn status(&self) -> JobStatus {
        match self.phase {
            Phase::Idle => JobStatus::Idle,
            Phase::Running { .. } => JobStatus::Running,
            Phase::Completed { .. } => JobStatus::Completed,
        }
    }

    pub fn input(&self) -> Option<&JobInput> {
        self.input.as_ref()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Running { started_at, .. } | Phase::Completed { started_at, .. } => {
                Some(*started_at)
            }
        }
    }

    pub fn estimated_completion_at(&self) -> Option<DateTime<Utc>> {
        match &self.phase {
            Phase::Running {
                estimated_completion_at,
                ..
            } => Some(*estimated_completion_at),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&TranscriptionResult> {
        match &self.phase {
            Phase::Completed { result, .. } => Some(result),
            _ => None,
        }
    }

    /// Generation of the job currently in flight, if any.
    pub fn running_generation(&self) -> Option<JobGeneration> {
        match &self.phase {
            Phase::Running { generation, .. } => Some(*generation),
            _ => None,
        }
    }

    pub fn last_generation(&self) -> JobGeneration {
        self.last_generation
    }

    pub fn view(&self) -> JobSnapshot {
        JobSnapshot::from_state(self)
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn replace_input(&mut self, input: JobInput) {
        self.input = Some(input);
        self.phase = Phase::Idle;
        self.mark_dirty();
    }

    /// Enters `Running` under a fresh generation.
    pub(crate) fn begin(&mut self, now: DateTime<Utc>, estimated_seconds: u64) -> JobGeneration {
        let generation = self.last_generation.next();
        self.last_generation = generation;
        self.phase = Phase::Running {
            generation,
            started_at: now,
            estimated_completion_at: add_seconds(now, estimated_seconds),
        };
        self.mark_dirty();
        generation
    }

    pub(crate) fn finish(&mut self, result: TranscriptionResult) {
        let Some(started_at) = self.started_at() else {
            return;
        };
        self.phase = Phase::Completed { started_at, result };
        self.mark_dirty();
    }

    pub(crate) fn reset_to_idle(&mut self) {
        self.phase = Phase::Idle;
        self.mark_dirty();
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

// Saturates at the latest representable instant instead of wrapping.
fn add_seconds(at: DateTime<Utc>, seconds: u64) -> DateTime<Utc> {
    i64::try_from(seconds)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|delta| at.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
