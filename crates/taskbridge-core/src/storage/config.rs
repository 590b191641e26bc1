//! TOML-based application configuration.
//!
//! Holds the OAuth application credentials for providers that use an
//! authorization-code exchange (Slack, Google) and the default local user
//! id. Per-integration provider settings live in the database, not here.
//!
//! Stored at `~/.config/taskbridge/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::integrations::oauth::OAuthApp;

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/taskbridge/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// User id integrations and tasks are keyed under.
    pub user_id: String,
    /// Slack OAuth application credentials.
    pub slack: OAuthApp,
    /// Google OAuth application credentials.
    pub google: OAuthApp,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_id: "local".to_string(),
            slack: OAuthApp::default(),
            google: OAuthApp::default(),
        }
    }
}

impl AppConfig {
    fn path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load configuration, falling back to defaults when no file exists.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Write configuration back to disk.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let path = Self::path()?;
        std::fs::write(&path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}
