use std::path::Path;

use serde::{Deserialize, Serialize};
use tilelab_ingest::{DEFAULT_ALPHA, InvalidVFunctionName, RunRequest, VFunctionName};

use crate::util;

/// Built-in experiment plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum Preset {
    /// Legacy and small n-tuple value functions, short runs.
    Small,
    /// Medium n-tuple value function, long run with periodic benchmarks.
    Medium,
}

/// A list of training runs to perform one after another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentPlan {
    pub runs: Vec<PlannedRun>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedRun {
    pub v_function: VFunctionName,
    /// Legend label; defaults to the v-function name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub games: u64,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benchmark_interval: Option<u64>,
}

fn default_alpha() -> f64 {
    DEFAULT_ALPHA
}

impl ExperimentPlan {
    /// Resolves `source` as a preset name, falling back to a plan file path.
    pub fn resolve(source: &str) -> anyhow::Result<Self> {
        match source.parse::<Preset>() {
            Ok(preset) => Ok(Self::preset(preset)?),
            Err(_) => Self::load(source),
        }
    }

    pub fn load<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        util::read_json_file("experiment plan", path)
    }

    pub fn preset(preset: Preset) -> Result<Self, InvalidVFunctionName> {
        let runs = match preset {
            Preset::Small => vec![
                PlannedRun::new("legacy", "Legacy", 30_000, 0.0005, None)?,
                PlannedRun::new("n_tuple_small", "N-Tuple Small", 30_000, 0.0005, None)?,
            ],
            Preset::Medium => vec![PlannedRun::new(
                "n_tuple_medium",
                "N-Tuple Medium",
                2_000_000,
                0.0025,
                Some(25_000),
            )?],
        };
        Ok(Self { runs })
    }
}

impl PlannedRun {
    fn new(
        v_function: &str,
        label: &str,
        games: u64,
        alpha: f64,
        benchmark_interval: Option<u64>,
    ) -> Result<Self, InvalidVFunctionName> {
        Ok(Self {
            v_function: VFunctionName::new(v_function)?,
            label: Some(label.to_owned()),
            games,
            alpha,
            benchmark_interval,
        })
    }

    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(self.v_function.as_str())
    }

    #[must_use]
    pub fn to_request(&self) -> RunRequest {
        RunRequest::new(self.v_function.clone(), self.games)
            .alpha(self.alpha)
            .benchmark_interval(self.benchmark_interval)
    }
}
