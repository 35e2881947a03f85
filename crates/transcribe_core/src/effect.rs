use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ScheduleCompletion {
        generation: crate::JobGeneration,
        delay: Duration,
    },
    CancelCompletion {
        generation: crate::JobGeneration,
    },
}
