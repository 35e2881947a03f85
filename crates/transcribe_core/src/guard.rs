use crate::{JobState, JobStatus};

/// Shown by the platform binding when the user tries to leave during a job.
pub const EXIT_WARNING: &str = "A transcription is in progress. Leaving now will interrupt it.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDecision {
    Proceed,
    /// Ask the user to confirm before leaving; the running job would be lost.
    Confirm,
}

pub fn should_warn_on_exit(state: &JobState) -> bool {
    state.status() == JobStatus::Running
}

pub fn exit_decision(state: &JobState) -> ExitDecision {
    if should_warn_on_exit(state) {
        ExitDecision::Confirm
    } else {
        ExitDecision::Proceed
    }
}
