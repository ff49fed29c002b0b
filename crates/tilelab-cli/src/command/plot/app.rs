use crossterm::event::{Event, KeyCode};
use ratatui::{
    Frame,
    layout::{Constraint, HorizontalAlignment, Layout},
    style::Color,
    text::Line,
    widgets::{Block as BlockWidget, Paragraph},
};
use tilelab_history::TrainingHistory;

use crate::{
    tui::App,
    view::{
        palette::Palette,
        widgets::{HistoryChart, HistoryChartData},
    },
};

#[derive(Debug)]
pub struct PlotApp {
    title: String,
    data: HistoryChartData,
    show_training: bool,
    should_exit: bool,
}

impl PlotApp {
    pub fn new(title: &str, histories: &[(String, TrainingHistory)], palette: &Palette) -> Self {
        let data = HistoryChartData::new(
            histories
                .iter()
                .map(|(label, history)| (label.as_str(), history)),
            palette,
        );
        Self {
            title: title.to_owned(),
            data,
            show_training: true,
            should_exit: false,
        }
    }
}

impl App for PlotApp {
    fn should_exit(&self) -> bool {
        self.should_exit
    }

    fn handle_event(&mut self, event: &Event) {
        if let Some(event) = event.as_key_event() {
            match event.code {
                KeyCode::Char('t') => self.show_training = !self.show_training,
                KeyCode::Char('q') | KeyCode::Esc => self.should_exit = true,
                _ => {}
            }
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let [chart_area, help_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(3)]).areas(frame.area());

        let chart = HistoryChart::new(&self.data)
            .show_training(self.show_training)
            .block(
                BlockWidget::bordered()
                    .title(self.title.as_str())
                    .title_alignment(HorizontalAlignment::Center),
            );

        let training = if self.show_training { "Hide" } else { "Show" };
        let help = Paragraph::new(vec![
            Line::from(format!("t ({training} training) | q/Esc (Quit)")).centered(),
        ])
        .style(Color::DarkGray)
        .block(BlockWidget::bordered());

        frame.render_widget(chart, chart_area);
        frame.render_widget(help, help_area);
    }
}
