mod config;
pub mod sessions;

pub use config::{BehaviourConfig, QuizConfig, ResultAnimation, ResultScreenConfig, VisualConfig};
pub use sessions::SessionStore;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/profilequiz[-dev]/` based on PROFILEQUIZ_ENV.
///
/// Set PROFILEQUIZ_ENV=dev to use development data directory.
/// PROFILEQUIZ_DATA_DIR overrides the location entirely.
///
/// # Errors
/// Returns an error if creating the data directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    if let Some(dir) = std::env::var_os("PROFILEQUIZ_DATA_DIR").filter(|dir| !dir.is_empty()) {
        let dir = PathBuf::from(dir);
        std::fs::create_dir_all(&dir)
            .map_err(|e| ConfigError::DataDirUnavailable(format!("{}: {e}", dir.display())))?;
        return Ok(dir);
    }

    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("PROFILEQUIZ_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("profilequiz-dev")
    } else {
        base_dir.join("profilequiz")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDirUnavailable(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
