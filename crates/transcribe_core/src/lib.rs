//! Transcribe core: pure job state machine, duration estimator and view-model helpers.
mod effect;
mod error;
mod estimate;
mod guard;
mod msg;
mod state;
mod transcript;
mod update;
mod view_model;

pub use effect::Effect;
pub use error::TransitionError;
pub use estimate::{estimate_duration, estimate_seconds, EstimatorSettings, BYTES_PER_MEGABYTE};
pub use guard::{exit_decision, should_warn_on_exit, ExitDecision, EXIT_WARNING};
pub use msg::Msg;
pub use state::{JobGeneration, JobInput, JobState, JobStatus, TranscriptionResult};
pub use transcript::placeholder_transcript;
pub use update::update;
pub use view_model::JobSnapshot;
