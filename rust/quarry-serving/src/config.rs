use std::{path::Path, time::Duration};

use quarry_common::{Result, error::Error, verify_arg};
use serde::{Deserialize, Serialize};

/// Options of the parallel query runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServingConfig {
    /// Number of queries evaluated concurrently.
    pub workers: usize,
    /// How long a batch waits for in-flight queries once every query is submitted.
    pub shutdown_timeout_secs: u64,
}

impl Default for ServingConfig {
    fn default() -> Self {
        ServingConfig {
            workers: 20,
            shutdown_timeout_secs: 30,
        }
    }
}

impl ServingConfig {
    pub fn from_json(json: &str) -> Result<ServingConfig> {
        let config: ServingConfig =
            serde_json::from_str(json).map_err(|e| Error::serialization("serving config", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<ServingConfig> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::io(path.display().to_string(), e))?;
        ServingConfig::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        verify_arg!(workers, self.workers > 0);
        Ok(())
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout_secs = timeout.as_secs();
        self
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}
