//! Configuration management for authport
//!
//! Loads and validates the YAML configuration used by the CLI: where the
//! authorization server lives and how the redirect receiver should behave.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{AuthportError, Result};

/// Main configuration structure for authport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Authorization server settings
    pub login: LoginConfig,

    /// Redirect receiver behavior
    #[serde(default)]
    pub receiver: ReceiverConfig,
}

/// Authorization server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginConfig {
    /// Authorization endpoint the browser is sent to
    pub authorization_endpoint: String,

    /// OAuth2 client identifier
    pub client_id: String,

    /// Scopes to request
    #[serde(default)]
    pub scopes: Vec<String>,
}

/// Redirect receiver behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiverConfig {
    /// Seconds to wait for the authorization redirect before giving up.
    /// `0` waits forever.
    #[serde(default = "default_accept_timeout")]
    pub accept_timeout_seconds: u64,

    /// Open the browser as soon as the listener is bound
    #[serde(default = "default_open_browser")]
    pub open_browser_on_start: bool,
}

fn default_accept_timeout() -> u64 {
    300
}

fn default_open_browser() -> bool {
    true
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            accept_timeout_seconds: default_accept_timeout(),
            open_browser_on_start: default_open_browser(),
        }
    }
}

impl Config {
    /// Loads configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AuthportError::Config(format!("could not read {}: {e}", path.display()))
        })?;
        let config: Config = serde_yaml::from_str(&contents).map_err(|e| {
            AuthportError::Config(format!("could not parse {}: {e}", path.display()))
        })?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.login.client_id.trim().is_empty() {
            return Err(AuthportError::Config(
                "login.client_id must not be empty".to_string(),
            ));
        }
        url::Url::parse(&self.login.authorization_endpoint).map_err(|e| {
            AuthportError::Config(format!(
                "login.authorization_endpoint is not a valid URL: {e}"
            ))
        })?;
        Ok(())
    }

    /// The configured accept deadline, `None` when unbounded.
    pub fn accept_timeout(&self) -> Option<Duration> {
        match self.receiver.accept_timeout_seconds {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}
