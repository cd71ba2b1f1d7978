//! Services
//!
//! Business logic of the application. The interview engine is the only
//! service; the storage layer and the gateway crate are injected into it.

pub mod interview;

pub use interview::{EngineSettings, InterviewEngine};
