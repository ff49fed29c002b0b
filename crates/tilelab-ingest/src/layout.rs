use std::path::{Path, PathBuf};

use crate::VFunctionName;

/// Where the previous snapshot goes when a new one arrives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, derive_more::FromStr)]
pub enum BackupLayout {
    /// `{name}.backup.json` next to the snapshot. Training histories are not
    /// backed up.
    Legacy,
    /// `backup/{name}.json` and `backup/{name}.training.json`.
    #[default]
    Directory,
}

/// File paths of snapshots, histories and their backups inside a networks
/// directory.
#[derive(Debug, Clone)]
pub struct NetworkLayout {
    root: PathBuf,
    backup: BackupLayout,
}

impl NetworkLayout {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, backup: BackupLayout) -> Self {
        Self {
            root: root.into(),
            backup,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn backup_layout(&self) -> BackupLayout {
        self.backup
    }

    #[must_use]
    pub fn snapshot_path(&self, name: &VFunctionName) -> PathBuf {
        self.root.join(format!("{name}.json"))
    }

    #[must_use]
    pub fn history_path(&self, name: &VFunctionName) -> PathBuf {
        self.root.join(format!("{name}.training.json"))
    }

    #[must_use]
    pub fn backup_dir(&self) -> PathBuf {
        self.root.join("backup")
    }

    #[must_use]
    pub fn snapshot_backup_path(&self, name: &VFunctionName) -> PathBuf {
        match self.backup {
            BackupLayout::Legacy => self.root.join(format!("{name}.backup.json")),
            BackupLayout::Directory => self.backup_dir().join(format!("{name}.json")),
        }
    }

    /// Backup slot of the training history, if this layout keeps one.
    #[must_use]
    pub fn history_backup_path(&self, name: &VFunctionName) -> Option<PathBuf> {
        match self.backup {
            BackupLayout::Legacy => None,
            BackupLayout::Directory => {
                Some(self.backup_dir().join(format!("{name}.training.json")))
            }
        }
    }
}
