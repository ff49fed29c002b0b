use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tilelab_ingest::{BackupLayout, Ingestor, NetworkLayout, SnapshotStore, TrainerConfig};

use self::{experiment::ExperimentArg, plot::PlotArg, show::ShowArg, train::TrainArg};

mod experiment;
mod plot;
mod show;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[clap(flatten)]
    workspace: WorkspaceArgs,
    /// What to do
    #[command(subcommand)]
    mode: Mode,
}

/// Where the trainer lives and where its output is stored.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct WorkspaceArgs {
    /// Trainer executable
    #[arg(
        long,
        global = true,
        env = "TILELAB_TRAINER",
        default_value = "./target/release/tilelab-trainer"
    )]
    trainer: PathBuf,
    /// Directory holding snapshots and training histories
    #[arg(long, global = true, default_value = "networks")]
    networks_dir: PathBuf,
    /// Where previous snapshots are moved to (legacy or directory)
    #[arg(long, global = true, default_value = "directory")]
    layout: BackupLayout,
}

impl WorkspaceArgs {
    pub(crate) fn network_layout(&self) -> NetworkLayout {
        NetworkLayout::new(&self.networks_dir, self.layout)
    }

    pub(crate) fn ingestor(&self) -> Ingestor {
        Ingestor::new(
            TrainerConfig::new(&self.trainer),
            SnapshotStore::new(self.network_layout()),
        )
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Train one value function and record its progress
    Train(#[clap(flatten)] TrainArg),
    /// Train a set of value functions and compare them
    Experiment(#[clap(flatten)] ExperimentArg),
    /// Chart stored training histories
    Plot(#[clap(flatten)] PlotArg),
    /// Summarize a stored training history
    Show(#[clap(flatten)] ShowArg),
}

pub fn run() -> anyhow::Result<()> {
    let CommandArgs { workspace, mode } = CommandArgs::parse();
    match mode {
        Mode::Train(arg) => train::run(&workspace, &arg)?,
        Mode::Experiment(arg) => experiment::run(&workspace, &arg)?,
        Mode::Plot(arg) => plot::run(&workspace, &arg)?,
        Mode::Show(arg) => show::run(&workspace, &arg)?,
    }
    Ok(())
}
