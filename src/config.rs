//! Dataset file loading.
//!
//! A dataset is a TOML file holding the run settings, the team sizes of every group and the
//! participants:
//!
//! ```toml
//! iterations = 1000
//! seed = 42                 # optional, random when absent
//! time_limit_secs = 30      # optional
//! sweep = "once"            # or "until-stable"
//! groups = [[3, 3, 2]]
//!
//! [[participants]]
//! name = "Inigo"
//! average_lap = 34.502
//! effort = 1.0
//! group = 0
//! unwanted_sizes = [2]
//! ```
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::descent::Sweep;
use crate::error::AssignError;
use crate::model::condition::GroupSizes;
use crate::model::entity::Participant;
use crate::restart::Params;

pub const DEFAULT_ITERATIONS: usize = 1000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse dataset: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("participant {name}: {reason}")]
    InvalidParticipant { name: String, reason: String },
    #[error(transparent)]
    Assign(#[from] AssignError),
}

fn default_iterations() -> usize {
    DEFAULT_ITERATIONS
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dataset {
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub time_limit_secs: Option<u64>,
    #[serde(default)]
    pub sweep: Sweep,
    pub groups: GroupSizes,
    pub participants: Vec<Participant>,
}

impl Dataset {
    pub fn load(path: &Path) -> Result<Dataset, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Dataset::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Dataset, ConfigError> {
        let dataset: Dataset = toml::from_str(text)?;
        dataset.validate()?;
        Ok(dataset)
    }

    /// Rejects lap times and efforts outside their domain, then runs the group size check.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for p in &self.participants {
            let invalid = |reason: String| ConfigError::InvalidParticipant { name: p.name.clone(), reason };
            if !(p.average_lap.is_finite() && p.average_lap > 0.0) {
                return Err(invalid(format!("average lap {} must be positive", p.average_lap)));
            }
            if !(0.0..=1.0).contains(&p.effort) {
                return Err(invalid(format!("effort {} must be between 0 and 1", p.effort)));
            }
        }
        if self.iterations == 0 {
            return Err(AssignError::NoIterations.into());
        }
        self.groups.check(&self.participants)?;
        Ok(())
    }

    pub fn params(&self) -> Params {
        Params {
            iterations: self.iterations,
            time_limit: self.time_limit_secs.map(Duration::from_secs),
            sweep: self.sweep,
        }
    }
}
