//! Scheduler configuration structures.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::PolicyLimits;

/// Environment variable naming a JSON configuration file.
pub const CONFIG_ENV_VAR: &str = "TECHWM_CONFIG";

/// Storage backend selection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackendConfig {
    /// In-memory storage for development/testing.
    #[default]
    InMemory,
    /// JSON-lines append logs under a directory.
    File {
        /// Directory holding the log files.
        path: PathBuf,
    },
}

/// Root scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Per-account-type request limits.
    #[serde(default)]
    pub policy: PolicyLimits,
    /// Where the registry and job records live.
    #[serde(default)]
    pub storage: StorageBackendConfig,
}

impl SchedulerConfig {
    /// Validate limits and storage settings.
    pub fn validate(&self) -> Result<(), String> {
        if !self.policy.default.is_consistent() {
            return Err("default account: per-class limit exceeds max_resources".into());
        }
        if !self.policy.research.is_consistent() {
            return Err("research account: per-class limit exceeds max_resources".into());
        }
        if let StorageBackendConfig::File { path } = &self.storage {
            if path.as_os_str().is_empty() {
                return Err("file storage path must not be empty".into());
            }
        }
        Ok(())
    }

    /// Parse scheduler configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load `.env` if present, then read the file named by [`CONFIG_ENV_VAR`].
    /// Falls back to the defaults when the variable is unset.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) => {
                let raw = std::fs::read_to_string(&path)
                    .map_err(|e| format!("cannot read {path}: {e}"))?;
                Self::from_json_str(&raw)
            }
            Err(_) => Ok(Self::default()),
        }
    }
}
