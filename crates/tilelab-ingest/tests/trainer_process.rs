#![cfg(unix)]

use std::{fs, thread, time::Duration};

use tempfile::TempDir;
use tilelab_ingest::{
    BackupLayout, Ingestor, NetworkLayout, SnapshotStore, TrainerConfig, VFunctionName,
};

/// Ingestor whose "trainer" is `/bin/sh`, so each test scripts the output.
fn shell_ingestor(backup: BackupLayout) -> (TempDir, Ingestor, NetworkLayout) {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("networks");
    fs::create_dir(&root).unwrap();
    let layout = NetworkLayout::new(root, backup);
    let ingestor = Ingestor::new(
        TrainerConfig::new("/bin/sh"),
        SnapshotStore::new(layout.clone()),
    );
    (temp, ingestor, layout)
}

fn name(s: &str) -> VFunctionName {
    VFunctionName::new(s).unwrap()
}

#[test]
fn test_ingests_live_trainer_output() {
    let (_temp, ingestor, layout) = shell_ingestor(BackupLayout::Directory);
    let legacy = name("legacy");
    let script = r#"
        echo '{"game":1,"training_score":0.5,"test_score":0.4}'
        echo '"MODEL_DATA_V1"'
        echo '{"game":2,"training_score":0.6,"test_score":0.5}'
    "#;

    let history = ingestor.ingest(&legacy, ["-c", script]).unwrap();

    assert_eq!(history.games(), &[1, 2]);
    assert_eq!(history.training_scores(), &[0.5, 0.6]);
    assert_eq!(history.test_scores(), &[0.4, 0.5]);
    assert_eq!(
        fs::read_to_string(layout.snapshot_path(&legacy)).unwrap(),
        "\"MODEL_DATA_V1\"\n"
    );
    assert!(!layout.snapshot_backup_path(&legacy).exists());
    assert!(layout.history_path(&legacy).exists());
}

#[test]
fn test_repeated_runs_keep_one_backup() {
    let (_temp, ingestor, layout) = shell_ingestor(BackupLayout::Legacy);
    let small = name("n_tuple_small");

    for model in ["run1", "run2", "run3"] {
        let script = format!("echo '\"{model}\"'");
        ingestor.ingest(&small, ["-c", script.as_str()]).unwrap();
    }

    assert_eq!(
        fs::read_to_string(layout.snapshot_backup_path(&small)).unwrap(),
        "\"run2\"\n"
    );
    assert_eq!(
        fs::read_to_string(layout.snapshot_path(&small)).unwrap(),
        "\"run3\"\n"
    );
}

#[test]
fn test_nonzero_exit_still_returns_history() {
    let (_temp, ingestor, _layout) = shell_ingestor(BackupLayout::Directory);
    let script = r#"
        echo '{"game":10,"training_score":100,"test_score":90}'
        exit 3
    "#;

    let history = ingestor.ingest(&name("legacy"), ["-c", script]).unwrap();

    assert_eq!(history.games(), &[10]);
}

#[test]
fn test_malformed_output_is_a_protocol_violation() {
    let (_temp, ingestor, layout) = shell_ingestor(BackupLayout::Directory);
    let legacy = name("legacy");
    let script = r#"
        echo '{"game":1,"training_score":0.5,"test_score":0.4}'
        echo 'Game 2, Average Score: 0.5'
        exec sleep 30
    "#;

    let err = ingestor.ingest(&legacy, ["-c", script]).unwrap_err();

    assert!(err.is_protocol_violation());
    assert!(!layout.history_path(&legacy).exists());
}

#[test]
fn test_unterminated_garbage_fails_a_finished_run() {
    let (_temp, ingestor, layout) = shell_ingestor(BackupLayout::Directory);
    let legacy = name("legacy");
    let script = r#"
        echo '{"game":1,"training_score":0.5,"test_score":0.4}'
        printf 'not json'
        exit 0
    "#;

    let err = ingestor.ingest(&legacy, ["-c", script]).unwrap_err();

    assert!(err.is_protocol_violation());
    assert!(!layout.history_path(&legacy).exists());
}

#[test]
fn test_cancelled_run_returns_partial_history() {
    let (_temp, ingestor, layout) = shell_ingestor(BackupLayout::Directory);
    let legacy = name("legacy");
    let script = r#"
        echo '{"game":1,"training_score":0.5,"test_score":0.4}'
        exec sleep 30
    "#;

    let run = ingestor.spawn(["-c", script]).unwrap();
    let cancel = run.cancel_handle();
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(300));
        cancel.cancel().unwrap();
    });
    let history = ingestor.ingest_run(&legacy, run).unwrap();
    canceller.join().unwrap();

    assert_eq!(history.len(), 1);
    assert_eq!(history.games(), &[1]);
    assert!(layout.history_path(&legacy).exists());
}

#[test]
fn test_missing_trainer_fails_to_launch() {
    let temp = TempDir::new().unwrap();
    let ingestor = Ingestor::new(
        TrainerConfig::new(temp.path().join("no-such-trainer")),
        SnapshotStore::new(NetworkLayout::new(temp.path(), BackupLayout::Directory)),
    );

    let err = ingestor.ingest(&name("legacy"), ["train"]).unwrap_err();

    assert!(err.is_launch());
}
