use ratatui::{
    prelude::{Buffer, Rect},
    style::{Color, Style},
    symbols::Marker,
    widgets::{Axis, Block as BlockWidget, Chart, Dataset, GraphType, Widget},
};
use tilelab_history::TrainingHistory;

use crate::view::palette::Palette;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum SeriesKind {
    Training,
    Test,
}

/// One line of the chart: `(game, score)` points of a single history.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub kind: SeriesKind,
    pub color: Color,
    pub points: Vec<(f64, f64)>,
}

/// Chart series derived from a set of labelled histories.
///
/// Every history contributes a training and a test series sharing one
/// palette colour.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryChartData {
    series: Vec<Series>,
}

impl HistoryChartData {
    pub fn new<'a, I>(histories: I, palette: &Palette) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a TrainingHistory)>,
    {
        let series = histories
            .into_iter()
            .enumerate()
            .flat_map(|(i, (label, history))| {
                let color = palette.color(i);
                [
                    Series {
                        name: format!("{label} (Training)"),
                        kind: SeriesKind::Training,
                        color,
                        points: points(history.games(), history.training_scores()),
                    },
                    Series {
                        name: format!("{label} (Test)"),
                        kind: SeriesKind::Test,
                        color,
                        points: points(history.games(), history.test_scores()),
                    },
                ]
            })
            .collect();
        Self { series }
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn visible(&self, show_training: bool) -> impl Iterator<Item = &Series> {
        self.series
            .iter()
            .filter(move |s| show_training || !s.kind.is_training())
    }

    /// `(x_bounds, y_bounds)` enclosing every visible point.
    ///
    /// Degenerate ranges are widened so the axes stay drawable.
    pub fn bounds(&self, show_training: bool) -> ([f64; 2], [f64; 2]) {
        let mut x = [f64::INFINITY, f64::NEG_INFINITY];
        let mut y = [f64::INFINITY, f64::NEG_INFINITY];
        for &(px, py) in self.visible(show_training).flat_map(|s| &s.points) {
            x = [x[0].min(px), x[1].max(px)];
            y = [y[0].min(py), y[1].max(py)];
        }
        (widen(x), widen(y))
    }
}

#[expect(clippy::cast_precision_loss)]
fn points(games: &[u64], scores: &[f64]) -> Vec<(f64, f64)> {
    games
        .iter()
        .zip(scores)
        .map(|(&game, &score)| (game as f64, score))
        .collect()
}

fn widen([min, max]: [f64; 2]) -> [f64; 2] {
    if min > max {
        [0.0, 1.0]
    } else if max - min > 0.0 {
        [min, max]
    } else {
        [min - 0.5, max + 0.5]
    }
}

#[derive(Debug)]
pub struct HistoryChart<'a> {
    data: &'a HistoryChartData,
    show_training: bool,
    block: Option<BlockWidget<'a>>,
}

impl<'a> HistoryChart<'a> {
    pub fn new(data: &'a HistoryChartData) -> Self {
        Self {
            data,
            show_training: true,
            block: None,
        }
    }

    pub fn show_training(self, show_training: bool) -> Self {
        Self {
            show_training,
            ..self
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }
}

impl Widget for HistoryChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let datasets = self
            .data
            .visible(self.show_training)
            .map(|s| {
                let (marker, graph_type) = match s.kind {
                    SeriesKind::Training => (Marker::Dot, GraphType::Scatter),
                    SeriesKind::Test => (Marker::Braille, GraphType::Line),
                };
                Dataset::default()
                    .name(s.name.as_str())
                    .marker(marker)
                    .graph_type(graph_type)
                    .style(Style::default().fg(s.color))
                    .data(&s.points)
            })
            .collect::<Vec<_>>();

        let (x_bounds, y_bounds) = self.data.bounds(self.show_training);
        let x_axis = Axis::default()
            .title("Game")
            .bounds(x_bounds)
            .labels([
                format!("{:.0}", x_bounds[0]),
                format!("{:.0}", f64::midpoint(x_bounds[0], x_bounds[1])),
                format!("{:.0}", x_bounds[1]),
            ]);
        let y_axis = Axis::default()
            .title("Average Score")
            .bounds(y_bounds)
            .labels([
                format!("{:.2}", y_bounds[0]),
                format!("{:.2}", f64::midpoint(y_bounds[0], y_bounds[1])),
                format!("{:.2}", y_bounds[1]),
            ]);

        let mut chart = Chart::new(datasets).x_axis(x_axis).y_axis(y_axis);
        if let Some(block) = self.block {
            chart = chart.block(block);
        }
        Widget::render(chart, area, buf);
    }
}

#[cfg(test)]
mod tests {
    use tilelab_history::ProgressRecord;

    use super::*;

    fn history(records: &[(u64, f64, f64)]) -> TrainingHistory {
        let mut history = TrainingHistory::new();
        for &(game, training, test) in records {
            history
                .push(ProgressRecord::new(game, training, test))
                .unwrap();
        }
        history
    }

    #[test]
    fn test_two_series_per_history_share_color() {
        let legacy = history(&[(1, 0.5, 0.4), (2, 0.6, 0.5)]);
        let small = history(&[(1, 1.0, 2.0)]);
        let palette = Palette::default();

        let data = HistoryChartData::new([("Legacy", &legacy), ("N-Tuple Small", &small)], &palette);

        let names = data.series().iter().map(|s| s.name.as_str()).collect::<Vec<_>>();
        assert_eq!(
            names,
            [
                "Legacy (Training)",
                "Legacy (Test)",
                "N-Tuple Small (Training)",
                "N-Tuple Small (Test)"
            ]
        );
        assert_eq!(data.series()[0].color, palette.color(0));
        assert_eq!(data.series()[1].color, palette.color(0));
        assert_eq!(data.series()[2].color, palette.color(1));
        assert_eq!(data.series()[1].points, [(1.0, 0.4), (2.0, 0.5)]);
    }

    #[test]
    fn test_bounds_follow_visible_series() {
        let h = history(&[(100, 10.0, 3.0), (200, 20.0, 4.0)]);
        let data = HistoryChartData::new([("h", &h)], &Palette::default());

        assert_eq!(data.bounds(true), ([100.0, 200.0], [3.0, 20.0]));
        assert_eq!(data.bounds(false), ([100.0, 200.0], [3.0, 4.0]));
        assert_eq!(data.visible(false).count(), 1);
    }

    #[test]
    fn test_degenerate_bounds_are_widened() {
        let single = history(&[(5, 1.0, 1.0)]);
        let empty = TrainingHistory::new();

        let data = HistoryChartData::new([("s", &single)], &Palette::default());
        assert_eq!(data.bounds(true), ([4.5, 5.5], [0.5, 1.5]));

        let data = HistoryChartData::new([("e", &empty)], &Palette::default());
        assert_eq!(data.bounds(true), ([0.0, 1.0], [0.0, 1.0]));
    }
}
