use serde::{Deserialize, Serialize};

/// One evaluation point reported by the trainer.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ProgressRecord {
    /// Number of games played when the scores were measured.
    pub game: u64,
    /// Average score over the games played while learning.
    pub training_score: f64,
    /// Average score of the benchmark games played with learning disabled.
    pub test_score: f64,
}

impl ProgressRecord {
    #[must_use]
    pub const fn new(game: u64, training_score: f64, test_score: f64) -> Self {
        Self {
            game,
            training_score,
            test_score,
        }
    }
}
