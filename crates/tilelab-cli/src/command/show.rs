use tilelab_history::TrainingHistory;
use tilelab_ingest::{NetworkLayout, VFunctionName};

use crate::{command::WorkspaceArgs, util};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ShowArg {
    /// Value function whose training history to summarize
    v_function: VFunctionName,
}

pub(crate) fn run(workspace: &WorkspaceArgs, arg: &ShowArg) -> anyhow::Result<()> {
    let ShowArg { v_function } = arg;
    let layout = workspace.network_layout();
    let history = util::read_history_file(&layout, v_function)?;
    print_summary(&layout, v_function, &history);
    Ok(())
}

pub(crate) fn print_summary(
    layout: &NetworkLayout,
    v_function: &VFunctionName,
    history: &TrainingHistory,
) {
    for line in summary_lines(layout, v_function, history) {
        eprintln!("{line}");
    }
}

fn summary_lines(
    layout: &NetworkLayout,
    v_function: &VFunctionName,
    history: &TrainingHistory,
) -> Vec<String> {
    let mut lines = vec![
        format!("  V-function:       {v_function}"),
        format!("  Progress records: {}", history.len()),
    ];
    if let Some(last) = history.last() {
        lines.push(format!("  Last game:        {}", last.game));
        lines.push(format!("  Final test score: {:.3}", last.test_score));
    }
    if let Some(best) = history.best_test() {
        lines.push(format!(
            "  Best test score:  {:.3} (game {})",
            best.test_score, best.game
        ));
    }
    lines.push(format!(
        "  Snapshot:         {}",
        layout.snapshot_path(v_function).display()
    ));
    lines.push(format!(
        "  History:          {}",
        layout.history_path(v_function).display()
    ));
    lines
}

#[cfg(test)]
mod tests {
    use tilelab_history::ProgressRecord;
    use tilelab_ingest::BackupLayout;

    use super::*;

    #[test]
    fn test_summary_reports_last_and_best() {
        let layout = NetworkLayout::new("networks", BackupLayout::Directory);
        let name = VFunctionName::new("legacy").unwrap();
        let mut history = TrainingHistory::new();
        for (game, test) in [(1, 0.4), (2, 0.9), (3, 0.5)] {
            history
                .push(ProgressRecord::new(game, 0.0, test))
                .unwrap();
        }

        let lines = summary_lines(&layout, &name, &history);

        assert!(lines.contains(&"  Progress records: 3".to_owned()));
        assert!(lines.contains(&"  Last game:        3".to_owned()));
        assert!(lines.contains(&"  Final test score: 0.500".to_owned()));
        assert!(lines.contains(&"  Best test score:  0.900 (game 2)".to_owned()));
    }

    #[test]
    fn test_empty_history_summary() {
        let layout = NetworkLayout::new("networks", BackupLayout::Directory);
        let name = VFunctionName::new("legacy").unwrap();

        let lines = summary_lines(&layout, &name, &TrainingHistory::new());

        assert!(lines.contains(&"  Progress records: 0".to_owned()));
        assert!(!lines.iter().any(|l| l.contains("Best test score")));
    }
}
