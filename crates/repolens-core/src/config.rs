//! Client configuration.
//!
//! Loaded from a TOML file, then overridden by environment variables and
//! finally by command-line flags (applied by the caller).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{LensError, LensResult};
use crate::poll::PollPolicy;

/// Default backend URL.
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

/// Default API path prefix.
pub const DEFAULT_API_PREFIX: &str = "/api";

pub const ENV_BACKEND_URL: &str = "REPOLENS_BACKEND_URL";
pub const ENV_TOKEN: &str = "REPOLENS_TOKEN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LensConfig {
    pub backend_url: String,
    pub api_prefix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub request_timeout_secs: u64,
    pub poll: PollSettings,
}

impl Default for LensConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            token: None,
            request_timeout_secs: 30,
            poll: PollSettings::default(),
        }
    }
}

/// `[poll]` table of the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    pub initial_delay_secs: u64,
    pub multiplier: f64,
    pub max_delay_secs: u64,
    pub max_attempts: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        let policy = PollPolicy::default();
        Self {
            initial_delay_secs: policy.initial_delay.as_secs(),
            multiplier: policy.multiplier,
            max_delay_secs: policy.max_delay.as_secs(),
            max_attempts: policy.max_attempts,
        }
    }
}

impl PollSettings {
    pub fn policy(&self) -> PollPolicy {
        PollPolicy {
            initial_delay: Duration::from_secs(self.initial_delay_secs),
            multiplier: self.multiplier,
            max_delay: Duration::from_secs(self.max_delay_secs),
            max_attempts: self.max_attempts,
        }
    }
}

impl LensConfig {
    /// `<config dir>/repolens/config.toml`, when the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("repolens").join("config.toml"))
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> LensResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> LensResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `REPOLENS_BACKEND_URL` and `REPOLENS_TOKEN`.
    pub fn with_env(self) -> Self {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_BACKEND_URL).filter(|v| !v.is_empty()) {
            self.backend_url = url;
        }
        if let Some(token) = lookup(ENV_TOKEN).filter(|v| !v.is_empty()) {
            self.token = Some(token);
        }
        self
    }

    /// Write to `path`, creating the parent directory if needed.
    pub fn save(&self, path: &Path) -> LensResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = toml::to_string_pretty(self)
            .map_err(|e| LensError::config(format!("cannot serialize config: {}", e)))?;
        std::fs::write(path, text)?;
        Ok(())
    }

    pub fn validate(&self) -> LensResult<()> {
        if self.backend_url.trim().is_empty() {
            return Err(LensError::config("backend_url must not be empty"));
        }
        if self.request_timeout_secs == 0 {
            return Err(LensError::config("request_timeout_secs must be positive"));
        }
        self.poll.policy().validate()
    }

    /// Base URL plus API prefix, without a trailing slash.
    pub fn api_base(&self) -> String {
        let base = self.backend_url.trim_end_matches('/');
        let prefix = self.api_prefix.trim_matches('/');
        if prefix.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, prefix)
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_policy(&self) -> PollPolicy {
        self.poll.policy()
    }
}
