use std::sync::Once;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use pretty_assertions::assert_eq;
use transcribe_core::{
    update, Effect, JobGeneration, JobInput, JobState, JobStatus, Msg, TransitionError,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
}

fn meeting() -> JobInput {
    JobInput::new("meeting.wav", 2_097_152)
}

fn started(input: JobInput) -> JobState {
    let mut state = JobState::new();
    update(&mut state, Msg::InputSelected(input)).unwrap();
    update(&mut state, Msg::StartRequested { now: t0() }).unwrap();
    state
}

#[test]
fn selecting_input_stays_idle() {
    init_logging();
    let mut state = JobState::new();

    let effects = update(&mut state, Msg::InputSelected(meeting())).unwrap();

    assert!(effects.is_empty());
    assert_eq!(state.status(), JobStatus::Idle);
    assert_eq!(state.input(), Some(&meeting()));
    assert_eq!(state.started_at(), None);
    assert!(state.consume_dirty());
}

#[test]
fn start_schedules_completion_after_estimate() {
    init_logging();
    let mut state = JobState::new();
    update(&mut state, Msg::InputSelected(meeting())).unwrap();

    let effects = update(&mut state, Msg::StartRequested { now: t0() }).unwrap();

    assert_eq!(
        effects,
        vec![Effect::ScheduleCompletion {
            generation: JobGeneration::new(1),
            delay: Duration::from_secs(10),
        }]
    );
    assert_eq!(state.status(), JobStatus::Running);
    assert_eq!(state.started_at(), Some(t0()));
    assert_eq!(
        state.estimated_completion_at(),
        Some(t0() + TimeDelta::seconds(10))
    );
    assert_eq!(state.result(), None);
}

#[test]
fn start_without_input_is_rejected() {
    init_logging();
    let mut state = JobState::new();
    let before = state.clone();

    let err = update(&mut state, Msg::StartRequested { now: t0() }).unwrap_err();

    assert_eq!(err, TransitionError::NoInputSelected);
    assert_eq!(state, before);
}

#[test]
fn start_while_running_is_rejected_and_state_unchanged() {
    init_logging();
    let mut state = started(meeting());
    let before = state.clone();

    let later = t0() + TimeDelta::seconds(2);
    let err = update(&mut state, Msg::StartRequested { now: later }).unwrap_err();

    assert!(matches!(
        err,
        TransitionError::InvalidTransition {
            status: JobStatus::Running,
            ..
        }
    ));
    assert_eq!(state, before);
}

#[test]
fn selecting_input_while_running_is_rejected() {
    init_logging();
    let mut state = started(meeting());
    let before = state.clone();

    let err = update(
        &mut state,
        Msg::InputSelected(JobInput::new("other.mp3", 1)),
    )
    .unwrap_err();

    assert!(matches!(err, TransitionError::InvalidTransition { .. }));
    assert_eq!(state, before);
}

#[test]
fn completion_synthesizes_result() {
    init_logging();
    let mut state = started(meeting());

    let effects = update(
        &mut state,
        Msg::CompletionDue {
            generation: JobGeneration::new(1),
        },
    )
    .unwrap();

    assert!(effects.is_empty());
    assert_eq!(state.status(), JobStatus::Completed);
    assert_eq!(state.started_at(), Some(t0()));
    assert_eq!(state.estimated_completion_at(), None);
    let result = state.result().expect("result present");
    assert_eq!(result.file_name, "meeting.wav");
    assert_eq!(result.processing_time_seconds, 10);
    assert!(result.text.contains("meeting.wav"));
}

#[test]
fn cancel_returns_to_idle_without_result() {
    init_logging();
    let mut state = started(meeting());

    let effects = update(&mut state, Msg::CancelRequested).unwrap();

    assert_eq!(
        effects,
        vec![Effect::CancelCompletion {
            generation: JobGeneration::new(1)
        }]
    );
    assert_eq!(state.status(), JobStatus::Idle);
    assert_eq!(state.started_at(), None);
    assert_eq!(state.estimated_completion_at(), None);
    assert_eq!(state.result(), None);
    assert_eq!(state.input(), Some(&meeting()));
}

#[test]
fn cancel_when_not_running_is_a_noop() {
    init_logging();
    let mut state = JobState::new();
    update(&mut state, Msg::InputSelected(meeting())).unwrap();
    state.consume_dirty();
    let before = state.clone();

    let effects = update(&mut state, Msg::CancelRequested).unwrap();

    assert!(effects.is_empty());
    assert_eq!(state, before);
    assert!(!state.consume_dirty());
}

#[test]
fn new_input_after_completion_clears_result() {
    init_logging();
    let mut state = started(meeting());
    update(
        &mut state,
        Msg::CompletionDue {
            generation: JobGeneration::new(1),
        },
    )
    .unwrap();

    update(
        &mut state,
        Msg::InputSelected(JobInput::new("interview.mp3", 512)),
    )
    .unwrap();

    assert_eq!(state.status(), JobStatus::Idle);
    assert_eq!(state.result(), None);
    assert_eq!(state.started_at(), None);
    assert_eq!(state.input().map(|i| i.name.as_str()), Some("interview.mp3"));
}

#[test]
fn completed_job_can_be_started_again() {
    init_logging();
    let mut state = started(meeting());
    update(
        &mut state,
        Msg::CompletionDue {
            generation: JobGeneration::new(1),
        },
    )
    .unwrap();

    let rerun_at = t0() + TimeDelta::minutes(1);
    let effects = update(&mut state, Msg::StartRequested { now: rerun_at }).unwrap();

    assert_eq!(state.status(), JobStatus::Running);
    assert_eq!(state.result(), None);
    assert_eq!(state.running_generation(), Some(JobGeneration::new(2)));
    assert_eq!(
        effects,
        vec![Effect::ScheduleCompletion {
            generation: JobGeneration::new(2),
            delay: Duration::from_secs(10),
        }]
    );
}
