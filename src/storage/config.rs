//! JSON Configuration Management
//!
//! Handles reading and writing the application configuration file and
//! layering environment overrides on top of it.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::models::settings::{AppConfig, DatabaseMode, SettingsUpdate};
use crate::utils::error::AppResult;
use crate::utils::paths::{config_path, ensure_dir};

pub const ENV_API_KEY: &str = "GROQ_API_KEY";
pub const ENV_BASE_URL: &str = "EXCEL_INTERVIEW_BASE_URL";
pub const ENV_MODEL: &str = "EXCEL_INTERVIEW_MODEL";
pub const ENV_TIMEOUT: &str = "EXCEL_INTERVIEW_TIMEOUT_SECS";
pub const ENV_MAX_QUESTIONS: &str = "EXCEL_INTERVIEW_MAX_QUESTIONS";
pub const ENV_DATABASE: &str = "EXCEL_INTERVIEW_DATABASE";
pub const ENV_LOG: &str = "EXCEL_INTERVIEW_LOG";

/// Configuration service for managing app settings
#[derive(Debug)]
pub struct ConfigService {
    config_path: PathBuf,
    config: AppConfig,
}

impl ConfigService {
    /// Load config from the default location, creating defaults when absent
    pub fn new() -> AppResult<Self> {
        Self::load(&config_path()?)
    }

    /// Load config from an explicit path, creating defaults when absent.
    /// Environment overrides are applied after loading and are not persisted.
    pub fn load(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }

        let mut config = if path.exists() {
            Self::load_from_file(path)?
        } else {
            debug!(path = %path.display(), "config file missing, writing defaults");
            let default_config = AppConfig::default();
            Self::save_to_file(path, &default_config)?;
            default_config
        };

        apply_env_overrides(&mut config, |key| std::env::var(key).ok());
        config.validate()?;

        Ok(Self {
            config_path: path.to_path_buf(),
            config,
        })
    }

    /// Load configuration from a file
    fn load_from_file(path: &Path) -> AppResult<AppConfig> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file with pretty formatting
    fn save_to_file(path: &Path, config: &AppConfig) -> AppResult<()> {
        config.validate()?;
        let content = serde_json::to_string_pretty(config)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the current configuration
    pub fn get_config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a clone of the current configuration
    pub fn get_config_clone(&self) -> AppConfig {
        self.config.clone()
    }

    /// Update the configuration with a partial update
    pub fn update_config(&mut self, update: SettingsUpdate) -> AppResult<AppConfig> {
        let mut next = self.config.clone();
        next.apply_update(update);
        next.validate()?;
        self.config = next;
        self.save()?;
        Ok(self.config.clone())
    }

    /// Save the current configuration to disk
    pub fn save(&self) -> AppResult<()> {
        Self::save_to_file(&self.config_path, &self.config)
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

/// Layer environment variables over a loaded config. Unparseable numeric
/// values are ignored with a warning.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(key) = get(ENV_API_KEY) {
        config.provider.api_key = Some(key);
    }
    if let Some(url) = get(ENV_BASE_URL) {
        config.provider.base_url = Some(url);
    }
    if let Some(model) = get(ENV_MODEL) {
        config.provider.model = model;
    }
    if let Some(raw) = get(ENV_TIMEOUT) {
        match raw.trim().parse::<u64>() {
            Ok(secs) => config.gateway_timeout_secs = secs,
            Err(_) => warn!(var = ENV_TIMEOUT, value = %raw, "ignoring invalid override"),
        }
    }
    if let Some(raw) = get(ENV_MAX_QUESTIONS) {
        match raw.trim().parse::<u32>() {
            Ok(n) => config.max_questions = n,
            Err(_) => warn!(var = ENV_MAX_QUESTIONS, value = %raw, "ignoring invalid override"),
        }
    }
    if let Some(raw) = get(ENV_DATABASE) {
        match DatabaseMode::parse(&raw) {
            Some(mode) => config.database = mode,
            None => warn!(var = ENV_DATABASE, value = %raw, "ignoring invalid override"),
        }
    }
    if let Some(level) = get(ENV_LOG) {
        config.log_level = level;
    }
}
