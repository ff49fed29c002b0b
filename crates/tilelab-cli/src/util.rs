use std::{fs::File, io, path::Path};

use anyhow::Context;
use tilelab_history::TrainingHistory;
use tilelab_ingest::{NetworkLayout, VFunctionName};

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Reads the stored training history of `name`.
pub fn read_history_file(
    layout: &NetworkLayout,
    name: &VFunctionName,
) -> anyhow::Result<TrainingHistory> {
    let path = layout.history_path(name);
    TrainingHistory::load(&path)
        .with_context(|| format!("Failed to load training history of {name}"))
}
