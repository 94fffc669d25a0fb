//! Client configuration.
//!
//! Resolution order, lowest to highest priority: built-in defaults, the JSON
//! config file, `FOLIO_*` environment variables, then explicit overrides from
//! the caller (CLI flags).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::{normalize_base_url, normalize_text_option};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 4;

pub const ENV_API_URL: &str = "FOLIO_API_URL";
pub const ENV_DATA_DIR: &str = "FOLIO_DATA_DIR";
pub const ENV_REQUEST_TIMEOUT: &str = "FOLIO_REQUEST_TIMEOUT_SECS";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// API host; the posts API lives under `{api_base_url}/api`
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Directory of the local post store; clients pick a platform default
    /// when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            data_dir: None,
        }
    }
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl ClientConfig {
    /// Load from a JSON file. A missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let mut config = serde_json::from_str::<Self>(&raw).map_err(|error| {
            Error::Config(format!("Failed to parse config at {}: {error}", path.display()))
        })?;
        config.normalize()?;
        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut normalized = self.clone();
        normalized.normalize()?;
        std::fs::write(path, serde_json::to_string_pretty(&normalized)?)?;
        Ok(())
    }

    /// Apply `FOLIO_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = normalize_text_option(lookup(ENV_API_URL)) {
            self.api_base_url = url;
        }
        if let Some(dir) = normalize_text_option(lookup(ENV_DATA_DIR)) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = normalize_text_option(lookup(ENV_REQUEST_TIMEOUT)) {
            self.request_timeout_secs = raw.parse().map_err(|_| {
                Error::Config(format!("{ENV_REQUEST_TIMEOUT} must be a whole number of seconds"))
            })?;
        }
        self.normalize()
    }

    /// Trim the API URL and check it is http(s) with a non-zero timeout.
    pub fn normalize(&mut self) -> Result<()> {
        self.api_base_url = normalize_base_url(&self.api_base_url).map_err(Error::Config)?;
        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
