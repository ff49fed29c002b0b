pub mod palette;
pub mod widgets;
