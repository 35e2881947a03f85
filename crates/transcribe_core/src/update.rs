use crate::{
    placeholder_transcript, Effect, JobState, JobStatus, Msg, TranscriptionResult, TransitionError,
};

/// Pure update function: applies a message to state and returns any effects.
///
/// A rejected message returns an error and leaves `state` untouched.
pub fn update(state: &mut JobState, msg: Msg) -> Result<Vec<Effect>, TransitionError> {
    let effects = match msg {
        Msg::InputSelected(input) => {
            ensure_not_running(state, "select a new input")?;
            state.replace_input(input);
            Vec::new()
        }
        Msg::StartRequested { now } => {
            let size_bytes = match state.input() {
                Some(input) => input.size_bytes,
                None => return Err(TransitionError::NoInputSelected),
            };
            ensure_not_running(state, "start")?;
            let estimated_seconds = state.settings().estimate_seconds(size_bytes);
            let generation = state.begin(now, estimated_seconds);
            vec![Effect::ScheduleCompletion {
                generation,
                delay: std::time::Duration::from_secs(estimated_seconds),
            }]
        }
        Msg::CancelRequested => match state.running_generation() {
            Some(generation) => {
                state.reset_to_idle();
                vec![Effect::CancelCompletion { generation }]
            }
            None => Vec::new(),
        },
        Msg::CompletionDue { generation } => {
            if state.running_generation() != Some(generation) {
                // Stale timer from a cancelled or superseded job.
                return Ok(Vec::new());
            }
            let Some(input) = state.input() else {
                return Ok(Vec::new());
            };
            let result = TranscriptionResult {
                text: placeholder_transcript(&input.name),
                file_name: input.name.clone(),
                processing_time_seconds: state.settings().estimate_seconds(input.size_bytes),
            };
            state.finish(result);
            Vec::new()
        }
    };

    Ok(effects)
}

fn ensure_not_running(state: &JobState, operation: &'static str) -> Result<(), TransitionError> {
    match state.status() {
        JobStatus::Running => Err(TransitionError::InvalidTransition {
            operation,
            status: JobStatus::Running,
        }),
        JobStatus::Idle | JobStatus::Completed => Ok(()),
    }
}
