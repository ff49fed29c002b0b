use std::{
    fs,
    io::{self, Write as _},
    path::Path,
};

use log::debug;
use tempfile::NamedTempFile;
use tilelab_history::TrainingHistory;

use crate::{IngestError, NetworkLayout, VFunctionName};

/// Persists snapshots and histories under a [`NetworkLayout`].
///
/// Every write goes to a temporary file in the target directory first and is
/// renamed into place, so readers only ever see complete files. Snapshot
/// writes move the previous occupant to its backup slot beforehand.
///
/// The networks directory itself is never created here; a missing directory
/// fails the first write.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    layout: NetworkLayout,
}

impl SnapshotStore {
    #[must_use]
    pub fn new(layout: NetworkLayout) -> Self {
        Self { layout }
    }

    #[must_use]
    pub fn layout(&self) -> &NetworkLayout {
        &self.layout
    }

    /// Replaces the current snapshot of `name` with `payload`.
    ///
    /// With a directory layout the history file is rotated the same way and
    /// rewritten with `history`, the progress accumulated so far.
    pub fn store_snapshot(
        &self,
        name: &VFunctionName,
        payload: &str,
        history: &TrainingHistory,
    ) -> Result<(), IngestError> {
        let current = self.layout.snapshot_path(name);
        rotate(&current, &self.layout.snapshot_backup_path(name))?;
        write_atomic(&current, payload.as_bytes())?;

        if let Some(history_backup) = self.layout.history_backup_path(name) {
            let current_history = self.layout.history_path(name);
            rotate(&current_history, &history_backup)?;
            write_history_file(&current_history, history)?;
        }
        Ok(())
    }

    /// Overwrites the history file of `name`. No backup is taken.
    pub fn write_history(
        &self,
        name: &VFunctionName,
        history: &TrainingHistory,
    ) -> Result<(), IngestError> {
        write_history_file(&self.layout.history_path(name), history)
    }
}

/// Moves `current` onto `backup`, replacing any previous backup.
fn rotate(current: &Path, backup: &Path) -> Result<(), IngestError> {
    if !current
        .try_exists()
        .map_err(IngestError::filesystem(current))?
    {
        return Ok(());
    }
    if let Some(dir) = non_empty_parent(backup) {
        ensure_dir(dir)?;
    }
    fs::rename(current, backup).map_err(IngestError::filesystem(backup))?;
    debug!("moved {} to {}", current.display(), backup.display());
    Ok(())
}

/// Creates `dir` if needed, but never its parents.
fn ensure_dir(dir: &Path) -> Result<(), IngestError> {
    match fs::create_dir(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(IngestError::filesystem(dir)(e)),
    }
}

fn write_history_file(path: &Path, history: &TrainingHistory) -> Result<(), IngestError> {
    let json = serde_json::to_vec(history)
        .map_err(|e| IngestError::filesystem(path)(io::Error::other(e)))?;
    write_atomic(path, &json)
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), IngestError> {
    let dir = non_empty_parent(path).unwrap_or(Path::new("."));
    let mut file = NamedTempFile::new_in(dir).map_err(IngestError::filesystem(path))?;
    file.write_all(contents)
        .and_then(|()| file.as_file().sync_all())
        .map_err(IngestError::filesystem(path))?;
    file.persist(path)
        .map_err(|e| IngestError::filesystem(path)(e.error))?;
    Ok(())
}

fn non_empty_parent(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;
    use tilelab_history::ProgressRecord;

    use super::*;
    use crate::BackupLayout;

    fn setup(backup: BackupLayout) -> (TempDir, SnapshotStore, VFunctionName) {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("networks");
        fs::create_dir(&root).unwrap();
        let store = SnapshotStore::new(NetworkLayout::new(root, backup));
        (temp, store, VFunctionName::new("legacy").unwrap())
    }

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    fn json_files(dir: &Path) -> Vec<String> {
        let mut names = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".json"))
            .collect::<Vec<_>>();
        names.sort();
        names
    }

    #[test]
    fn test_first_snapshot_creates_no_backup() {
        let (_temp, store, name) = setup(BackupLayout::Directory);

        store
            .store_snapshot(&name, "\"MODEL_DATA_V1\"\n", &TrainingHistory::new())
            .unwrap();

        let layout = store.layout();
        assert_eq!(read(&layout.snapshot_path(&name)), "\"MODEL_DATA_V1\"\n");
        assert!(!layout.snapshot_backup_path(&name).exists());
        assert!(!layout.backup_dir().exists());
    }

    #[test]
    fn test_rotation_moves_previous_bytes_to_backup() {
        let (_temp, store, name) = setup(BackupLayout::Directory);
        let layout = store.layout().clone();
        fs::write(layout.snapshot_path(&name), b"previous model bytes").unwrap();

        store
            .store_snapshot(&name, "{\"w\":[1,2,3]}\n", &TrainingHistory::new())
            .unwrap();

        assert_eq!(read(&layout.snapshot_backup_path(&name)), "previous model bytes");
        assert_eq!(read(&layout.snapshot_path(&name)), "{\"w\":[1,2,3]}\n");
    }

    #[test]
    fn test_two_snapshots_replace_instead_of_accumulating() {
        let (_temp, store, name) = setup(BackupLayout::Legacy);
        let history = TrainingHistory::new();

        store.store_snapshot(&name, "\"first\"\n", &history).unwrap();
        store.store_snapshot(&name, "\"second\"\n", &history).unwrap();

        let layout = store.layout();
        assert_eq!(read(&layout.snapshot_backup_path(&name)), "\"first\"\n");
        assert_eq!(read(&layout.snapshot_path(&name)), "\"second\"\n");
    }

    #[test]
    fn test_backups_are_not_chained() {
        let (_temp, store, name) = setup(BackupLayout::Legacy);
        let history = TrainingHistory::new();

        for payload in ["\"first\"\n", "\"second\"\n", "\"third\"\n"] {
            store.store_snapshot(&name, payload, &history).unwrap();
        }

        let layout = store.layout();
        assert_eq!(
            json_files(layout.root()),
            vec!["legacy.backup.json", "legacy.json"]
        );
        assert_eq!(read(&layout.snapshot_backup_path(&name)), "\"second\"\n");
        assert_eq!(read(&layout.snapshot_path(&name)), "\"third\"\n");
    }

    #[test]
    fn test_directory_layout_rotates_history() {
        let (_temp, store, name) = setup(BackupLayout::Directory);
        let layout = store.layout().clone();
        fs::write(
            layout.history_path(&name),
            r#"{"games":[7],"training_scores":[1.0],"test_scores":[2.0]}"#,
        )
        .unwrap();
        let mut history = TrainingHistory::new();
        history.push(ProgressRecord::new(1, 0.5, 0.4)).unwrap();

        store.store_snapshot(&name, "\"model\"\n", &history).unwrap();

        let backup = layout.history_backup_path(&name).unwrap();
        assert_eq!(TrainingHistory::load(&backup).unwrap().games(), &[7]);
        assert_eq!(
            TrainingHistory::load(layout.history_path(&name)).unwrap(),
            history
        );
        assert_eq!(json_files(&layout.backup_dir()), vec!["legacy.training.json"]);
    }

    #[test]
    fn test_legacy_layout_leaves_history_alone() {
        let (_temp, store, name) = setup(BackupLayout::Legacy);
        let layout = store.layout().clone();

        store
            .store_snapshot(&name, "\"model\"\n", &TrainingHistory::new())
            .unwrap();

        assert!(!layout.history_path(&name).exists());
        assert!(!layout.backup_dir().exists());
    }

    #[test]
    fn test_write_history_overwrites_without_backup() {
        let (_temp, store, name) = setup(BackupLayout::Directory);
        let layout = store.layout().clone();
        fs::write(layout.history_path(&name), "stale").unwrap();
        let mut history = TrainingHistory::new();
        history.push(ProgressRecord::new(1, 0.5, 0.4)).unwrap();

        store.write_history(&name, &history).unwrap();

        assert_eq!(
            read(&layout.history_path(&name)),
            r#"{"games":[1],"training_scores":[0.5],"test_scores":[0.4]}"#
        );
        assert!(layout.history_backup_path(&name).is_some_and(|p| !p.exists()));
    }

    #[test]
    fn test_missing_networks_dir_is_an_error() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("networks");
        let store = SnapshotStore::new(NetworkLayout::new(&root, BackupLayout::Directory));
        let name = VFunctionName::new("legacy").unwrap();

        let err = store
            .store_snapshot(&name, "\"model\"\n", &TrainingHistory::new())
            .unwrap_err();

        assert!(err.is_filesystem());
        assert!(!root.exists());
    }
}
