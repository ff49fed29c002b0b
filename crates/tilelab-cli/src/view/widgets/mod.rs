pub use self::history_chart::*;

mod history_chart;
