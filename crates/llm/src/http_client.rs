//! HTTP Client Factory
//!
//! Builds the reqwest client shared by OpenAI-compatible providers.

use std::time::Duration;

use crate::types::{LlmError, LlmResult};

/// Build a `reqwest::Client` whose requests give up after `timeout_secs`.
///
/// A zero timeout is treated as one second.
pub fn build_http_client(timeout_secs: u64) -> LlmResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .build()
        .map_err(|e| LlmError::Other {
            message: format!("Failed to build HTTP client: {}", e),
        })
}
