//! Excel Interview - Adaptive Skills Assessment Engine
//!
//! This library runs conversational Excel skills interviews. It includes:
//! - The interview engine and its fallback policy
//! - Session stores (in-memory and SQLite)
//! - JSON configuration with environment overrides
//! - Data models and utilities

pub mod logging;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

// Re-export commonly used items
pub use models::response::*;
pub use models::settings::{AppConfig, SettingsUpdate};
pub use services::interview::{EngineSettings, InterviewEngine};
pub use storage::store::{SessionStore, SessionUpdate};
pub use storage::{InMemorySessionStore, SqliteSessionStore};
pub use utils::error::{AppError, AppResult};
