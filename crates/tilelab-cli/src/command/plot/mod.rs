use tilelab_history::TrainingHistory;
use tilelab_ingest::VFunctionName;

use crate::{command::WorkspaceArgs, tui::Tui, util, view::palette::Palette};

use self::app::PlotApp;

mod app;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlotArg {
    /// Value functions whose training histories to chart
    #[arg(required = true)]
    v_functions: Vec<VFunctionName>,
}

pub(crate) fn run(workspace: &WorkspaceArgs, arg: &PlotArg) -> anyhow::Result<()> {
    let PlotArg { v_functions } = arg;
    let layout = workspace.network_layout();

    let mut histories = vec![];
    for name in v_functions {
        let history = util::read_history_file(&layout, name)?;
        eprintln!("Loaded {name}: {} progress records", history.len());
        histories.push((name.to_string(), history));
    }

    show_histories("Training Progress", &histories)
}

/// Opens the chart view over labelled histories.
pub(crate) fn show_histories(
    title: &str,
    histories: &[(String, TrainingHistory)],
) -> anyhow::Result<()> {
    let mut app = PlotApp::new(title, histories, &Palette::default());
    Tui::new().run(&mut app)
}
