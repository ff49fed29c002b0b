//! Training history records produced by trainer runs.
//!
//! A [`TrainingHistory`] is the per-run series of evaluation points reported by
//! the trainer: one game index plus a training and a test score per point.

pub use self::{history::*, progress::ProgressRecord};

pub mod history;
pub mod progress;
