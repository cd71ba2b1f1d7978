//! Settings Models
//!
//! Application configuration and settings data structures.

use serde::{Deserialize, Serialize};

use excel_interview_core::{CoreError, CoreResult};
use excel_interview_llm::ProviderConfig;

/// Where sessions are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseMode {
    /// Process-local maps, lost on exit
    Memory,
    /// SQLite file at ~/.excel-interview/data.db
    File,
}

impl DatabaseMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Some(Self::Memory),
            "file" => Some(Self::File),
            _ => None,
        }
    }
}

/// Named model choices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelPreset {
    Fast,
    Balanced,
    Quality,
}

impl ModelPreset {
    pub fn model_id(&self) -> &'static str {
        match self {
            Self::Fast => "llama3-8b-8192",
            Self::Balanced => "llama3-70b-8192",
            Self::Quality => "mixtral-8x7b-32768",
        }
    }
}

/// Application configuration stored in config.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Completion gateway settings
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Upper bound on a single gateway call, in seconds
    #[serde(default = "default_gateway_timeout")]
    pub gateway_timeout_secs: u64,
    /// Questions per interview
    #[serde(default = "default_max_questions")]
    pub max_questions: u32,
    /// Idle time after which an unfinished session is abandoned
    #[serde(default = "default_session_timeout")]
    pub session_timeout_secs: u64,
    /// Age after which completed sessions are removed
    #[serde(default = "default_cleanup_after_hours")]
    pub cleanup_after_hours: u64,
    #[serde(default = "default_database")]
    pub database: DatabaseMode,
    /// tracing filter directive, e.g. "info" or "excel_interview=debug"
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit logs as JSON lines
    #[serde(default)]
    pub log_json: bool,
}

fn default_gateway_timeout() -> u64 {
    30
}

fn default_max_questions() -> u32 {
    10
}

fn default_session_timeout() -> u64 {
    3600
}

fn default_cleanup_after_hours() -> u64 {
    24
}

fn default_database() -> DatabaseMode {
    DatabaseMode::File
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            gateway_timeout_secs: default_gateway_timeout(),
            max_questions: default_max_questions(),
            session_timeout_secs: default_session_timeout(),
            cleanup_after_hours: default_cleanup_after_hours(),
            database: default_database(),
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

/// Settings update request (partial update)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SettingsUpdate {
    pub model: Option<String>,
    pub preset: Option<ModelPreset>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub gateway_timeout_secs: Option<u64>,
    pub max_questions: Option<u32>,
    pub database: Option<DatabaseMode>,
    pub log_level: Option<String>,
    pub log_json: Option<bool>,
}

impl AppConfig {
    /// Apply a partial update to the configuration. An explicit model wins
    /// over a preset.
    pub fn apply_update(&mut self, update: SettingsUpdate) {
        if let Some(preset) = update.preset {
            self.provider.model = preset.model_id().to_string();
        }
        if let Some(model) = update.model {
            self.provider.model = model;
        }
        if let Some(base_url) = update.base_url {
            self.provider.base_url = Some(base_url);
        }
        if let Some(api_key) = update.api_key {
            self.provider.api_key = Some(api_key);
        }
        if let Some(timeout) = update.gateway_timeout_secs {
            self.gateway_timeout_secs = timeout;
        }
        if let Some(max) = update.max_questions {
            self.max_questions = max;
        }
        if let Some(database) = update.database {
            self.database = database;
        }
        if let Some(level) = update.log_level {
            self.log_level = level;
        }
        if let Some(json) = update.log_json {
            self.log_json = json;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if !(1..=50).contains(&self.max_questions) {
            return Err(CoreError::validation(format!(
                "max_questions must be between 1 and 50, got {}",
                self.max_questions
            )));
        }

        if self.gateway_timeout_secs < 1 {
            return Err(CoreError::validation("gateway_timeout_secs must be at least 1 second"));
        }

        let temperature = self.provider.temperature;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(CoreError::validation(format!(
                "Invalid temperature: {}. Must be between 0.0 and 2.0",
                temperature
            )));
        }

        if self.provider.model.trim().is_empty() {
            return Err(CoreError::validation("Model name cannot be empty"));
        }

        if let Some(url) = &self.provider.base_url {
            if url.trim().is_empty() {
                return Err(CoreError::validation("Base URL cannot be empty"));
            }
        }

        Ok(())
    }
}
