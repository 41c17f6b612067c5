// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration and state directory management.
//!
//! Configuration is stored in `<state-dir>/config.toml`. Every field has a
//! default, so a missing file is a valid configuration:
//! - `[remote]`: where queued mutations are delivered
//! - `[queue]`: store capacity
//! - `[replay]`: delay before a deferred replay fires
//! - `[session]`: where the bearer token is read from

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::env;
use crate::error::{Error, Result};

const APP_DIR_NAME: &str = "evq";
const CONFIG_FILE_NAME: &str = "config.toml";
const QUEUE_FILE_NAME: &str = "queue.jsonl";
const CONNECTIVITY_FILE_NAME: &str = "connectivity.json";
const LOG_FILE_NAME: &str = "evq.log";

/// Configuration stored in `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub remote: RemoteConfig,
    pub queue: QueueConfig,
    pub replay: ReplayConfig,
    pub session: SessionConfig,
}

/// Remote API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL of the API server (`http://` or `https://`).
    pub base_url: String,
    /// Path evaluations are posted to.
    pub evaluation_endpoint: String,
    /// Per-request transport timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            base_url: "http://localhost:8080".to_string(),
            evaluation_endpoint: "/api/evaluations".to_string(),
            timeout_secs: 30,
        }
    }
}

impl RemoteConfig {
    /// Validates the URL scheme and timeout.
    pub fn validate(&self) -> Result<()> {
        let url = self.base_url.trim();
        let host = url
            .strip_prefix("http://")
            .or_else(|| url.strip_prefix("https://"));
        match host {
            Some(rest) if !rest.is_empty() => {}
            _ => {
                return Err(Error::Config(format!(
                    "invalid base_url '{}': must start with http:// or https://",
                    self.base_url
                )))
            }
        }
        if !self.evaluation_endpoint.starts_with('/') {
            return Err(Error::Config(format!(
                "invalid evaluation_endpoint '{}': must start with '/'",
                self.evaluation_endpoint
            )));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Maximum number of stored mutations before enqueue fails.
    pub max_items: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        QueueConfig {
            max_items: evq_core::store::DEFAULT_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Seconds between a cycle leaving items pending and the next replay.
    pub delay_secs: u64,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        ReplayConfig { delay_secs: 60 }
    }
}

impl ReplayConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// File holding the bearer token. `EVQ_TOKEN` is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_file: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => return Err(Error::Config(format!("failed to read config: {}", e))),
        };
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        Ok(config)
    }
}

/// Files under the state directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatePaths {
    pub dir: PathBuf,
}

impl StatePaths {
    pub fn new(dir: PathBuf) -> Self {
        StatePaths { dir }
    }

    pub fn config(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE_NAME)
    }

    pub fn queue(&self) -> PathBuf {
        self.dir.join(QUEUE_FILE_NAME)
    }

    pub fn connectivity(&self) -> PathBuf {
        self.dir.join(CONNECTIVITY_FILE_NAME)
    }

    pub fn log(&self) -> PathBuf {
        self.dir.join(LOG_FILE_NAME)
    }
}

/// Resolves the state directory.
///
/// Order: explicit path, `EVQ_STATE_DIR`, `$XDG_STATE_HOME/evq`, then the
/// platform state (or data) directory plus `evq`.
pub fn resolve_state_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = env::state_dir() {
        return Ok(dir);
    }
    if let Some(xdg) = env::xdg_state_home() {
        return Ok(xdg.join(APP_DIR_NAME));
    }
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|base| base.join(APP_DIR_NAME))
        .ok_or(Error::NoStateDir)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
