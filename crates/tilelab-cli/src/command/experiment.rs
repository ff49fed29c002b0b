use anyhow::Context as _;
use tilelab_history::TrainingHistory;

use crate::{
    command::{WorkspaceArgs, plot, train},
    plan::ExperimentPlan,
    util,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ExperimentArg {
    /// Preset name (small, medium) or path to an experiment plan JSON file
    plan: String,
    /// Chart the stored histories without training
    #[arg(long, conflicts_with = "no_plot")]
    plot_only: bool,
    /// Train without opening the chart afterwards
    #[arg(long)]
    no_plot: bool,
}

pub(crate) fn run(workspace: &WorkspaceArgs, arg: &ExperimentArg) -> anyhow::Result<()> {
    let ExperimentArg {
        plan: plan_source,
        plot_only,
        no_plot,
    } = arg;
    let plan = ExperimentPlan::resolve(plan_source)?;
    eprintln!("Experiment {plan_source}: {} runs", plan.runs.len());

    let layout = workspace.network_layout();
    let ingestor = workspace.ingestor();
    let mut histories: Vec<(String, TrainingHistory)> = vec![];
    for (i, run) in plan.runs.iter().enumerate() {
        let label = run.label();
        let history = if *plot_only {
            util::read_history_file(&layout, &run.v_function)?
        } else {
            eprintln!(
                "[{}/{}] Training {label} ({}) for {} games (alpha {})",
                i + 1,
                plan.runs.len(),
                run.v_function,
                run.games,
                run.alpha
            );
            train::run_request(&ingestor, &run.to_request(), None)
                .with_context(|| format!("Failed to train {label}"))?
        };
        eprintln!("  {label}: {} progress records", history.len());
        histories.push((label.to_owned(), history));
    }

    if !*no_plot {
        plot::show_histories(&format!("Experiment: {plan_source}"), &histories)?;
    }
    Ok(())
}
