use std::{
    sync::mpsc::{self, RecvTimeoutError},
    thread::{self, JoinHandle},
    time::Duration,
};

use anyhow::Context as _;
use chrono::Utc;
use log::warn;
use tilelab_history::TrainingHistory;
use tilelab_ingest::{
    CancelHandle, DEFAULT_ALPHA, IngestError, Ingestor, RunRequest, TrainerRun, VFunctionName,
};

use crate::command::{WorkspaceArgs, show};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Value function to train
    v_function: VFunctionName,
    /// Number of training games
    #[arg(long)]
    games: u64,
    /// Learning rate
    #[arg(long, default_value_t = DEFAULT_ALPHA)]
    alpha: f64,
    /// Games between benchmark evaluations
    #[arg(long)]
    benchmark_interval: Option<u64>,
    /// Continue from the trainer's built-in weights instead of zeroed ones
    #[arg(long)]
    resume: bool,
    /// Stop the trainer after this many seconds and keep what it reported
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

pub(crate) fn run(workspace: &WorkspaceArgs, arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        v_function,
        games,
        alpha,
        benchmark_interval,
        resume,
        timeout,
    } = arg;
    let request = RunRequest::new(v_function.clone(), *games)
        .alpha(*alpha)
        .benchmark_interval(*benchmark_interval)
        .from_scratch(!resume);
    let ingestor = workspace.ingestor();

    eprintln!("Training {v_function} for {games} games (alpha {alpha})");
    let started_at = Utc::now();
    let history = run_request(&ingestor, &request, timeout.map(Duration::from_secs))
        .with_context(|| format!("Failed to train {v_function}"))?;
    let finished_at = Utc::now();

    eprintln!();
    eprintln!("Training finished");
    eprintln!("  Started at:  {started_at}");
    eprintln!("  Finished at: {finished_at}");
    eprintln!(
        "  Elapsed:     {}s",
        (finished_at - started_at).num_seconds()
    );
    show::print_summary(&workspace.network_layout(), v_function, &history);

    Ok(())
}

/// Runs one training request, stopping the trainer once `timeout` elapses.
pub(crate) fn run_request(
    ingestor: &Ingestor,
    request: &RunRequest,
    timeout: Option<Duration>,
) -> Result<TrainingHistory, IngestError> {
    let run = ingestor.spawn(request.to_args())?;
    ingest_with_timeout(ingestor, &request.v_function, run, timeout)
}

fn ingest_with_timeout(
    ingestor: &Ingestor,
    v_function: &VFunctionName,
    run: TrainerRun,
    timeout: Option<Duration>,
) -> Result<TrainingHistory, IngestError> {
    let watchdog = timeout.map(|timeout| Watchdog::start(run.cancel_handle(), timeout));
    let result = ingestor.ingest_run(v_function, run);
    if let Some(watchdog) = watchdog {
        watchdog.stop();
    }
    result
}

/// Cancels a trainer that is still running after a deadline.
#[derive(Debug)]
struct Watchdog {
    done: mpsc::Sender<()>,
    thread: JoinHandle<()>,
}

impl Watchdog {
    fn start(cancel: CancelHandle, timeout: Duration) -> Self {
        let (done, finished) = mpsc::channel();
        let thread = thread::spawn(move || {
            if finished.recv_timeout(timeout) == Err(RecvTimeoutError::Timeout) {
                warn!("timeout of {}s reached, stopping trainer", timeout.as_secs());
                if let Err(e) = cancel.cancel() {
                    warn!("failed to stop trainer: {e}");
                }
            }
        });
        Self { done, thread }
    }

    fn stop(self) {
        // The watchdog may already have fired and exited.
        let _ = self.done.send(());
        if self.thread.join().is_err() {
            warn!("watchdog thread panicked");
        }
    }
}
