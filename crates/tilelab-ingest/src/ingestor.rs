use std::{ffi::OsStr, io::BufRead};

use log::{info, warn};
use tilelab_history::TrainingHistory;

use crate::{
    IngestError, MessageError, RunRequest, SnapshotStore, TrainerConfig, TrainerMessage,
    TrainerRun, VFunctionName,
};

/// Runs the trainer and records what it reports.
///
/// Two ingestions for the same v-function must not run at the same time: they
/// would race on the snapshot and backup slots.
#[derive(Debug, Clone)]
pub struct Ingestor {
    trainer: TrainerConfig,
    store: SnapshotStore,
}

impl Ingestor {
    #[must_use]
    pub fn new(trainer: TrainerConfig, store: SnapshotStore) -> Self {
        Self { trainer, store }
    }

    #[must_use]
    pub fn trainer(&self) -> &TrainerConfig {
        &self.trainer
    }

    #[must_use]
    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Trains `request.v_function` with the trainer's standard argument list.
    pub fn run(&self, request: &RunRequest) -> Result<TrainingHistory, IngestError> {
        self.ingest(&request.v_function, request.to_args())
    }

    /// Launches the trainer with `args` and ingests its output until it exits.
    pub fn ingest<I, S>(
        &self,
        v_function: &VFunctionName,
        args: I,
    ) -> Result<TrainingHistory, IngestError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let run = self.trainer.spawn(args)?;
        self.ingest_run(v_function, run)
    }

    /// Launches the trainer without consuming its output yet.
    ///
    /// Take a [`CancelHandle`] from the returned run before passing it to
    /// [`ingest_run`] to be able to stop it from another thread.
    ///
    /// [`CancelHandle`]: crate::CancelHandle
    /// [`ingest_run`]: Self::ingest_run
    pub fn spawn<I, S>(&self, args: I) -> Result<TrainerRun, IngestError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.trainer.spawn(args)
    }

    /// Ingests the output of an already running trainer.
    ///
    /// A trainer that is killed part way through yields the history collected
    /// up to that point. Its exit status is only logged. When ingestion fails
    /// the trainer is killed before the error is returned.
    pub fn ingest_run(
        &self,
        v_function: &VFunctionName,
        mut run: TrainerRun,
    ) -> Result<TrainingHistory, IngestError> {
        let cancel = run.cancel_handle();
        let result = self.consume(v_function, run.stdout(), || cancel.is_cancelled());
        let cancelled = cancel.is_cancelled();
        if result.is_err()
            && let Err(e) = cancel.cancel()
        {
            warn!("failed to stop trainer for {v_function}: {e}");
        }
        match run.wait() {
            Ok(_) if cancelled => warn!("trainer for {v_function} was cancelled"),
            Ok(status) if !status.success() => {
                warn!("trainer for {v_function} exited with {status}");
            }
            Ok(_) => {}
            Err(e) => warn!("failed to wait for trainer for {v_function}: {e}"),
        }
        result
    }

    /// Consumes trainer output line by line.
    ///
    /// Progress records are appended to the history, anything else is stored
    /// as the current snapshot of `v_function`. At end of input the history is
    /// written next to the snapshot and returned. Any undecodable line aborts
    /// ingestion without writing the history.
    pub fn ingest_stream<R>(
        &self,
        v_function: &VFunctionName,
        reader: R,
    ) -> Result<TrainingHistory, IngestError>
    where
        R: BufRead,
    {
        self.consume(v_function, reader, || false)
    }

    /// Line loop shared by [`ingest_stream`] and [`ingest_run`].
    ///
    /// When `cut_off` reports that the trainer was killed, a final line that
    /// lacks its newline and does not decode is dropped instead of failing.
    ///
    /// [`ingest_stream`]: Self::ingest_stream
    /// [`ingest_run`]: Self::ingest_run
    fn consume<R, F>(
        &self,
        v_function: &VFunctionName,
        mut reader: R,
        cut_off: F,
    ) -> Result<TrainingHistory, IngestError>
    where
        R: BufRead,
        F: Fn() -> bool,
    {
        let mut history = TrainingHistory::new();
        let mut line = Vec::new();
        let mut line_number = 0;

        loop {
            line.clear();
            if reader
                .read_until(b'\n', &mut line)
                .map_err(|source| IngestError::Read { source })?
                == 0
            {
                break;
            }
            line_number += 1;

            let message = match TrainerMessage::decode_bytes(&line) {
                Ok(message) => message,
                Err(e)
                    if (e.is_malformed_json() || e.is_invalid_utf_8())
                        && !line.ends_with(b"\n")
                        && cut_off() =>
                {
                    warn!("dropping truncated final line {line_number} of {v_function}");
                    break;
                }
                Err(source) => {
                    return Err(IngestError::ProtocolViolation {
                        line_number,
                        source,
                    });
                }
            };

            match message {
                TrainerMessage::Progress(record) => {
                    history
                        .push(record)
                        .map_err(|e| IngestError::ProtocolViolation {
                            line_number,
                            source: MessageError::OutOfOrder(e),
                        })?;
                    info!(
                        "Game {}, Average Score: {}",
                        record.game, record.test_score
                    );
                }
                TrainerMessage::Snapshot(payload) => {
                    self.store.store_snapshot(v_function, &payload, &history)?;
                    info!(
                        "saved {v_function} snapshot after {} progress records",
                        history.len()
                    );
                }
            }
        }

        self.store.write_history(v_function, &history)?;
        info!(
            "{v_function} finished with {} progress records, history written to {}",
            history.len(),
            self.store.layout().history_path(v_function).display()
        );
        Ok(history)
    }
}
