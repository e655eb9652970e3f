//! Gateway connection configuration.
//!
//! Automation hosts keep a small JSON file per environment (test and
//! production servicer instances have different base URLs); the environment
//! variables cover ad-hoc runs. The token is handed in by the orchestrator
//! either way.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, Result};

/// Default HTTP timeout when the config does not set one.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub base_url: String,
    pub token: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub log_directory: Option<PathBuf>,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl GatewayConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| GatewayError::filesystem(path, e))?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| GatewayError::filesystem(parent, e))?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents).map_err(|e| GatewayError::filesystem(path, e))?;
        Ok(())
    }

    /// Build a config from `FICS_API_URL`, `FICS_API_TOKEN` and the optional
    /// `FICS_API_LOG_DIR` / `FICS_API_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        let require = |name: &str| {
            std::env::var(name)
                .map_err(|_| GatewayError::Configuration(format!("{name} is not set")))
        };

        let timeout_secs = match std::env::var("FICS_API_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().map_err(|_| {
                GatewayError::Configuration(format!(
                    "FICS_API_TIMEOUT_SECS is not a number: '{raw}'"
                ))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            base_url: require("FICS_API_URL")?,
            token: require("FICS_API_TOKEN")?,
            timeout_secs,
            log_directory: std::env::var("FICS_API_LOG_DIR").ok().map(PathBuf::from),
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
