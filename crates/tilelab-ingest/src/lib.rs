//! Run ingestion for the external trainer.
//!
//! [`Ingestor`] launches the trainer, reads its line-delimited JSON output,
//! collects progress records into a [`TrainingHistory`] and persists every model
//! snapshot through a [`SnapshotStore`], which moves the previous snapshot to a
//! backup slot before the new one is written.
//!
//! [`TrainingHistory`]: tilelab_history::TrainingHistory

pub use self::{
    error::IngestError,
    ingestor::Ingestor,
    layout::{BackupLayout, NetworkLayout},
    message::{MessageError, TrainerMessage},
    store::SnapshotStore,
    trainer::{CancelHandle, DEFAULT_ALPHA, RunRequest, TrainerConfig, TrainerRun},
    v_function::{InvalidVFunctionName, VFunctionName},
};

mod error;
mod ingestor;
mod layout;
mod message;
mod store;
mod trainer;
mod v_function;
