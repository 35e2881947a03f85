use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked a file. Replaces the previous input and clears any result.
    InputSelected(crate::JobInput),
    /// User clicked Start. `now` becomes the job's start time.
    StartRequested { now: DateTime<Utc> },
    /// User clicked Stop.
    CancelRequested,
    /// A completion timer fired for the given job.
    CompletionDue { generation: crate::JobGeneration },
}
