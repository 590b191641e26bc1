pub mod config;
pub mod database;

pub use config::AppConfig;
pub use database::{Integration, IntegrationLog, IntegrationStore, LogStatus, NewLog};

use std::path::PathBuf;

/// Returns `~/.config/taskbridge[-dev]/` based on TASKBRIDGE_ENV.
///
/// Set TASKBRIDGE_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if the config directory cannot be created.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("TASKBRIDGE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("taskbridge-dev")
    } else {
        base_dir.join("taskbridge")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
