//! Cross-Platform Path Utilities
//!
//! Functions for resolving application directories across platforms.
//! Everything lives under ~/.excel-interview/.

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the application directory (~/.excel-interview/)
pub fn app_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(".excel-interview"))
}

/// Get the config file path (~/.excel-interview/config.json)
pub fn config_path() -> AppResult<PathBuf> {
    Ok(app_dir()?.join("config.json"))
}

/// Get the database file path (~/.excel-interview/data.db)
pub fn database_path() -> AppResult<PathBuf> {
    Ok(app_dir()?.join("data.db"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Get the application directory, creating it if it doesn't exist
pub fn ensure_app_dir() -> AppResult<PathBuf> {
    let path = app_dir()?;
    ensure_dir(&path)?;
    Ok(path)
}
