//! Engine configuration.

use crate::error::EngineResult;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory holding the database file. Created on open if absent.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_db_file")]
    pub db_file: String,

    /// Milliseconds between the end of one tick and the start of the next.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Fixed walk seed. None draws one at startup.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./stockDB")
}

fn default_db_file() -> String {
    "stocks.db".to_string()
}

fn default_tick_interval_ms() -> u64 {
    crate::sim::TICK_INTERVAL.as_millis() as u64
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir:         default_data_dir(),
            db_file:          default_db_file(),
            tick_interval_ms: default_tick_interval_ms(),
            seed:             None,
        }
    }
}

impl EngineConfig {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> EngineResult<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_file)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
