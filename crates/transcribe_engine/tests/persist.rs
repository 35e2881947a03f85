use std::fs;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use transcribe_engine::{ensure_output_dir, OutputBatch, PersistError};

fn entries(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn batch_creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let nested = temp.path().join("out").join("nested");

    OutputBatch::new(&nested).unwrap();

    assert!(nested.is_dir());
    ensure_output_dir(&nested).unwrap();
}

#[test]
fn nothing_lands_before_commit() {
    let temp = TempDir::new().unwrap();
    let mut batch = OutputBatch::new(temp.path()).unwrap();

    let transcript = batch.stage("meeting.txt", "hello").unwrap();
    let manifest = batch.stage("meeting.json", "{}").unwrap();
    assert!(!transcript.exists());
    assert!(!manifest.exists());

    let landed = batch.commit().unwrap();

    assert_eq!(landed, vec![transcript.clone(), manifest]);
    assert_eq!(fs::read_to_string(transcript).unwrap(), "hello");
    assert_eq!(entries(temp.path()), vec!["meeting.json", "meeting.txt"]);
}

#[test]
fn dropped_batch_leaves_no_files() {
    let temp = TempDir::new().unwrap();
    let mut batch = OutputBatch::new(temp.path()).unwrap();
    batch.stage("meeting.txt", "hello").unwrap();

    drop(batch);

    assert_eq!(entries(temp.path()), Vec::<String>::new());
}

#[test]
fn rewriting_a_pair_replaces_both() {
    let temp = TempDir::new().unwrap();
    for take in ["first", "second"] {
        let mut batch = OutputBatch::new(temp.path()).unwrap();
        batch.stage("meeting.txt", take).unwrap();
        batch.stage("meeting.json", take).unwrap();
        batch.commit().unwrap();
    }

    assert_eq!(
        fs::read_to_string(temp.path().join("meeting.txt")).unwrap(),
        "second"
    );
    assert_eq!(entries(temp.path()), vec!["meeting.json", "meeting.txt"]);
}

#[test]
fn same_name_twice_is_refused() {
    let temp = TempDir::new().unwrap();
    let mut batch = OutputBatch::new(temp.path()).unwrap();
    batch.stage("meeting.txt", "a").unwrap();

    let err = batch.stage("meeting.txt", "b").unwrap_err();

    assert!(matches!(err, PersistError::DuplicateTarget { .. }));
}

#[cfg(unix)]
#[test]
fn failed_second_file_restores_the_first() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("meeting.txt"), "old transcript").unwrap();
    // A directory in the manifest's place makes the second rename fail.
    fs::create_dir(temp.path().join("meeting.json")).unwrap();

    let mut batch = OutputBatch::new(temp.path()).unwrap();
    batch.stage("meeting.txt", "new transcript").unwrap();
    batch.stage("meeting.json", "{}").unwrap();
    let err = batch.commit().unwrap_err();

    assert!(matches!(err, PersistError::Write { .. }));
    assert_eq!(
        fs::read_to_string(temp.path().join("meeting.txt")).unwrap(),
        "old transcript"
    );
    assert!(temp.path().join("meeting.json").is_dir());
    assert_eq!(entries(temp.path()), vec!["meeting.json", "meeting.txt"]);
}

#[test]
fn refuses_a_file_as_output_dir() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let err = OutputBatch::new(&file_path).err().unwrap();

    assert!(matches!(err, PersistError::OutputDir(_)));
}
