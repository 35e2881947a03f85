use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use transcribe_core::{JobInput, JobSnapshot, JobStatus};
use transcribe_engine::{JobController, JobObserver, ManualClock, VirtualScheduler};

fn controller() -> JobController<ManualClock, VirtualScheduler> {
    let clock = ManualClock::starting_at(Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap());
    let scheduler = VirtualScheduler::new(clock.clone());
    JobController::new(clock, scheduler)
}

fn recorder() -> (Rc<RefCell<Vec<JobSnapshot>>>, Box<dyn JobObserver>) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let observer: Box<dyn JobObserver> =
        Box::new(move |snapshot: &JobSnapshot| sink.borrow_mut().push(snapshot.clone()));
    (seen, observer)
}

fn statuses(seen: &Rc<RefCell<Vec<JobSnapshot>>>) -> Vec<JobStatus> {
    seen.borrow().iter().map(|s| s.status).collect()
}

#[test]
fn observers_see_every_transition() {
    let mut controller = controller();
    let (seen, observer) = recorder();
    controller.subscribe(observer);

    controller.select_input(JobInput::new("a.wav", 1_048_576)).unwrap();
    controller.start().unwrap();
    controller.advance(Duration::from_secs(5));

    assert_eq!(
        statuses(&seen),
        vec![JobStatus::Idle, JobStatus::Running, JobStatus::Completed]
    );
    let last = seen.borrow().last().cloned().unwrap();
    assert_eq!(last.result.unwrap().file_name, "a.wav");
}

#[test]
fn rejected_and_noop_operations_do_not_notify() {
    let mut controller = controller();
    let (seen, observer) = recorder();
    controller.subscribe(observer);

    controller.cancel();
    let _ = controller.start();
    assert!(seen.borrow().is_empty());

    controller.select_input(JobInput::new("a.wav", 1)).unwrap();
    controller.start().unwrap();
    let _ = controller.start();
    let _ = controller.select_input(JobInput::new("b.wav", 1));

    assert_eq!(statuses(&seen), vec![JobStatus::Idle, JobStatus::Running]);
}

#[test]
fn cancel_notifies_once_and_stale_timer_stays_silent() {
    let mut controller = controller();
    let (seen, observer) = recorder();
    controller.subscribe(observer);
    controller.select_input(JobInput::new("a.wav", 1_048_576)).unwrap();
    let generation = controller.start().unwrap();

    controller.cancel();
    controller.on_completion_due(generation);
    controller.advance(Duration::from_secs(30));

    assert_eq!(
        statuses(&seen),
        vec![JobStatus::Idle, JobStatus::Running, JobStatus::Idle]
    );
}

#[test]
fn unsubscribed_observer_is_not_called() {
    let mut controller = controller();
    let (kept, kept_observer) = recorder();
    let (dropped, dropped_observer) = recorder();
    controller.subscribe(kept_observer);
    let id = controller.subscribe(dropped_observer);

    assert!(controller.unsubscribe(id));
    assert!(!controller.unsubscribe(id));
    controller.select_input(JobInput::new("a.wav", 1)).unwrap();

    assert_eq!(kept.borrow().len(), 1);
    assert!(dropped.borrow().is_empty());
}
