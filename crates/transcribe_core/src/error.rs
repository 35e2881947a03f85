use thiserror::Error;

use crate::JobStatus;

/// Usage errors. The state is left exactly as it was before the rejected message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("cannot {operation} while the job is {status}")]
    InvalidTransition {
        operation: &'static str,
        status: JobStatus,
    },
    #[error("no input file selected")]
    NoInputSelected,
}
