use std::{
    fs::File,
    io::{self, BufReader, Read},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::ProgressRecord;

/// Score curves of a single training run.
///
/// The three sequences are index-aligned: entry `i` of each one belongs to the
/// `i`-th progress record. They only grow together through [`push`], which
/// also keeps `games` strictly increasing.
///
/// [`push`]: Self::push
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTrainingHistory")]
pub struct TrainingHistory {
    games: Vec<u64>,
    training_scores: Vec<f64>,
    test_scores: Vec<f64>,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("game {game} does not follow previous game {previous}")]
pub struct NonIncreasingGameError {
    pub previous: u64,
    pub game: u64,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum InvalidHistoryError {
    #[display(
        "history sequences differ in length (games: {games}, training_scores: {training_scores}, test_scores: {test_scores})"
    )]
    Misaligned {
        games: usize,
        training_scores: usize,
        test_scores: usize,
    },
    #[display("history games are not strictly increasing")]
    NonIncreasing(NonIncreasingGameError),
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum HistoryFileError {
    #[display("failed to open history file {}", path.display())]
    Open { path: PathBuf, source: io::Error },
    #[display("failed to parse history file {}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
struct RawTrainingHistory {
    games: Vec<u64>,
    training_scores: Vec<f64>,
    test_scores: Vec<f64>,
}

impl TryFrom<RawTrainingHistory> for TrainingHistory {
    type Error = InvalidHistoryError;

    fn try_from(raw: RawTrainingHistory) -> Result<Self, Self::Error> {
        let RawTrainingHistory {
            games,
            training_scores,
            test_scores,
        } = raw;
        if games.len() != training_scores.len() || games.len() != test_scores.len() {
            return Err(InvalidHistoryError::Misaligned {
                games: games.len(),
                training_scores: training_scores.len(),
                test_scores: test_scores.len(),
            });
        }
        if let Some(pair) = games.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(InvalidHistoryError::NonIncreasing(NonIncreasingGameError {
                previous: pair[0],
                game: pair[1],
            }));
        }
        Ok(Self {
            games,
            training_scores,
            test_scores,
        })
    }
}

impl TrainingHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one progress record to all three sequences.
    ///
    /// The history is left untouched when `record.game` is not greater than the
    /// last recorded game.
    pub fn push(&mut self, record: ProgressRecord) -> Result<(), NonIncreasingGameError> {
        if let Some(&previous) = self.games.last()
            && record.game <= previous
        {
            return Err(NonIncreasingGameError {
                previous,
                game: record.game,
            });
        }
        self.games.push(record.game);
        self.training_scores.push(record.training_score);
        self.test_scores.push(record.test_score);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.games.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    #[must_use]
    pub fn games(&self) -> &[u64] {
        &self.games
    }

    #[must_use]
    pub fn training_scores(&self) -> &[f64] {
        &self.training_scores
    }

    #[must_use]
    pub fn test_scores(&self) -> &[f64] {
        &self.test_scores
    }

    pub fn records(&self) -> impl Iterator<Item = ProgressRecord> + '_ {
        (0..self.len()).map(|i| self.record(i))
    }

    #[must_use]
    pub fn last(&self) -> Option<ProgressRecord> {
        self.len().checked_sub(1).map(|i| self.record(i))
    }

    /// Returns the record with the highest test score (earliest one on ties).
    #[must_use]
    pub fn best_test(&self) -> Option<ProgressRecord> {
        self.records()
            .reduce(|best, r| if r.test_score > best.test_score { r } else { best })
    }

    fn record(&self, i: usize) -> ProgressRecord {
        ProgressRecord::new(self.games[i], self.training_scores[i], self.test_scores[i])
    }

    pub fn from_reader<R>(reader: R) -> serde_json::Result<Self>
    where
        R: Read,
    {
        serde_json::from_reader(reader)
    }

    /// Reads a history previously written by a training run.
    pub fn load<P>(path: P) -> Result<Self, HistoryFileError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| HistoryFileError::Open {
            path: path.to_owned(),
            source,
        })?;
        Self::from_reader(BufReader::new(file)).map_err(|source| HistoryFileError::Parse {
            path: path.to_owned(),
            source,
        })
    }
}
