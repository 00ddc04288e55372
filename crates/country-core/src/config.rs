//! Pipeline configuration, stored as JSON

use crate::error::{Error, Result};
use crate::merger::CoalescePolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Smallest sample an analysis will run on
pub const DEFAULT_MIN_VALID_ROWS: usize = 6;

/// Settings for every stage of the pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub merge: MergeConfig,
    pub insights: InsightConfig,
}

/// How the two normalized tables are reconciled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Side that wins when both hold a value
    pub coalesce: CoalescePolicy,
    /// Drop columns that end up entirely null
    pub drop_empty_columns: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            coalesce: CoalescePolicy::PreferLeft,
            drop_empty_columns: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    /// Rows with every required field present needed before an analysis runs
    pub min_valid_rows: usize,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            min_valid_rows: DEFAULT_MIN_VALID_ROWS,
        }
    }
}

impl PipelineConfig {
    /// Load a configuration file; a missing file yields the defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save the configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
