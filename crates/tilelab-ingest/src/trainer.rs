use std::{
    ffi::OsStr,
    io::{self, BufReader},
    path::{Path, PathBuf},
    process::{Child, ChildStdout, Command, ExitStatus, Stdio},
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use log::info;

use crate::{IngestError, VFunctionName};

/// Learning rate used when a run does not specify one.
pub const DEFAULT_ALPHA: f64 = 0.0005;

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How to reach the trainer executable.
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    program: PathBuf,
}

impl TrainerConfig {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Starts the trainer with `args`, piping its standard output.
    ///
    /// Standard error is inherited so trainer diagnostics reach the terminal.
    pub fn spawn<I, S>(&self, args: I) -> Result<TrainerRun, IngestError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args = args
            .into_iter()
            .map(|a| a.as_ref().to_owned())
            .collect::<Vec<_>>();
        info!("launching {} {:?}", self.program.display(), args);

        let launch_error = |source: io::Error| IngestError::Launch {
            program: self.program.clone(),
            source,
        };
        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(launch_error)?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| launch_error(io::Error::other("trainer stdout was not captured")))?;

        Ok(TrainerRun {
            stdout: BufReader::new(stdout),
            child: Arc::new(Mutex::new(child)),
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }
}

/// Parameters of one training run, forwarded to the trainer as arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    pub v_function: VFunctionName,
    pub games: u64,
    pub alpha: f64,
    pub benchmark_interval: Option<u64>,
    /// Start from zeroed weights instead of the trainer's built-in ones.
    pub from_scratch: bool,
}

impl RunRequest {
    #[must_use]
    pub fn new(v_function: VFunctionName, games: u64) -> Self {
        Self {
            v_function,
            games,
            alpha: DEFAULT_ALPHA,
            benchmark_interval: None,
            from_scratch: true,
        }
    }

    #[must_use]
    pub fn alpha(self, alpha: f64) -> Self {
        Self { alpha, ..self }
    }

    #[must_use]
    pub fn benchmark_interval(self, benchmark_interval: Option<u64>) -> Self {
        Self {
            benchmark_interval,
            ..self
        }
    }

    #[must_use]
    pub fn from_scratch(self, from_scratch: bool) -> Self {
        Self {
            from_scratch,
            ..self
        }
    }

    /// Builds the trainer command line:
    ///
    /// ```text
    /// train <games> [-z] --alpha <alpha> [--benchmark-interval <n>] --v_function <name> --format json
    /// ```
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec!["train".to_owned(), self.games.to_string()];
        if self.from_scratch {
            args.push("-z".to_owned());
        }
        args.extend(["--alpha".to_owned(), self.alpha.to_string()]);
        if let Some(interval) = self.benchmark_interval {
            args.extend(["--benchmark-interval".to_owned(), interval.to_string()]);
        }
        args.extend([
            "--v_function".to_owned(),
            self.v_function.to_string(),
            "--format".to_owned(),
            "json".to_owned(),
        ]);
        args
    }
}

/// A running trainer process.
#[derive(Debug)]
pub struct TrainerRun {
    stdout: BufReader<ChildStdout>,
    child: Arc<Mutex<Child>>,
    cancelled: Arc<AtomicBool>,
}

/// Terminates a [`TrainerRun`] from another thread.
///
/// Killing the trainer closes its output, so the ingestion in progress ends as
/// if the stream had finished normally.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    child: Arc<Mutex<Child>>,
    cancelled: Arc<AtomicBool>,
}

impl TrainerRun {
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            child: Arc::clone(&self.child),
            cancelled: Arc::clone(&self.cancelled),
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub(crate) fn stdout(&mut self) -> &mut BufReader<ChildStdout> {
        &mut self.stdout
    }

    /// Waits for the trainer to exit.
    ///
    /// The lock is released between polls so a [`CancelHandle`] can still
    /// reach the child while it lingers after closing its output.
    pub(crate) fn wait(self) -> io::Result<ExitStatus> {
        drop(self.stdout);
        loop {
            if let Some(status) = lock(&self.child).try_wait()? {
                return Ok(status);
            }
            thread::sleep(EXIT_POLL_INTERVAL);
        }
    }
}

impl CancelHandle {
    pub fn cancel(&self) -> io::Result<()> {
        self.cancelled.store(true, Ordering::SeqCst);
        let mut child = lock(&self.child);
        if child.try_wait()?.is_some() {
            return Ok(());
        }
        child.kill()
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

fn lock(child: &Mutex<Child>) -> MutexGuard<'_, Child> {
    child.lock().unwrap_or_else(PoisonError::into_inner)
}
