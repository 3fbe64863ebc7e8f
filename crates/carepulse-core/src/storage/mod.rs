mod config;
pub mod database;

pub use config::{AccessibilitySettings, Config, NotificationsConfig, SchedulerConfig};
pub use database::{Database, EventRecord, Stats};

use std::path::PathBuf;

/// Returns `~/.config/carepulse[-dev]/` based on CAREPULSE_ENV.
///
/// Set CAREPULSE_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("CAREPULSE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("carepulse-dev")
    } else {
        base_dir.join("carepulse")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
