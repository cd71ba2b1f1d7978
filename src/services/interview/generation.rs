//! Generation Client
//!
//! Single place that talks to the completion gateway: applies the call
//! timeout, classifies failures and recovers structured output.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use excel_interview_llm::{LlmProvider, LlmRequestOptions, Message};

use super::extractor::{extract, Extraction};
use super::fallback::FailureReason;

/// Sampling settings and a log label for one kind of call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallProfile {
    pub purpose: &'static str,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CallProfile {
    fn options(&self) -> LlmRequestOptions {
        LlmRequestOptions::sampling(self.temperature, self.max_tokens)
    }
}

pub const INTRO_ANALYSIS: CallProfile = CallProfile {
    purpose: "intro_analysis",
    temperature: 0.3,
    max_tokens: 400,
};

pub const INTRO_TRANSITION: CallProfile = CallProfile {
    purpose: "intro_transition",
    temperature: 0.7,
    max_tokens: 200,
};

pub const EVALUATION: CallProfile = CallProfile {
    purpose: "evaluation",
    temperature: 0.3,
    max_tokens: 600,
};

pub const FOLLOW_UP: CallProfile = CallProfile {
    purpose: "follow_up",
    temperature: 0.7,
    max_tokens: 150,
};

pub const NEXT_QUESTION: CallProfile = CallProfile {
    purpose: "next_question",
    temperature: 0.7,
    max_tokens: 200,
};

pub const CLOSING: CallProfile = CallProfile {
    purpose: "closing",
    temperature: 0.7,
    max_tokens: 300,
};

pub const REPORT_NARRATIVE: CallProfile = CallProfile {
    purpose: "report_narrative",
    temperature: 0.3,
    max_tokens: 800,
};

/// Generation failures. Always absorbed by the fallback policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("generation unavailable: {0}")]
    Unavailable(FailureReason),
    #[error("generated output was not usable structured data")]
    Malformed,
}

/// Gateway wrapper shared by the evaluator, generator and report builder
#[derive(Clone)]
pub struct GenerationClient {
    provider: Arc<dyn LlmProvider>,
    timeout: Duration,
}

impl GenerationClient {
    pub fn new(provider: Arc<dyn LlmProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Whether the provider has credentials to work with
    pub fn is_configured(&self) -> bool {
        self.provider.config().has_api_key()
    }

    /// Ask the provider whether its endpoint answers. Skipped without
    /// credentials; bounded by the gateway timeout.
    pub async fn is_reachable(&self) -> bool {
        if !self.is_configured() {
            return false;
        }
        match tokio::time::timeout(self.timeout, self.provider.health_check()).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!(provider = self.provider.name(), error = %e, "gateway health check failed");
                false
            }
            Err(_) => {
                warn!(provider = self.provider.name(), "gateway health check timed out");
                false
            }
        }
    }

    /// One text completion: a system message followed by `messages`
    pub async fn complete_text(
        &self,
        system: &str,
        messages: Vec<Message>,
        profile: CallProfile,
    ) -> Result<String, GenerationError> {
        let mut request = Vec::with_capacity(messages.len() + 1);
        request.push(Message::system(system));
        request.extend(messages);

        debug!(
            purpose = profile.purpose,
            provider = self.provider.name(),
            model = self.provider.model(),
            messages = request.len(),
            "calling completion gateway"
        );

        let call = self.provider.send_message(request, profile.options());
        let response = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                let reason = FailureReason::from(&e);
                warn!(purpose = profile.purpose, reason = %reason, error = %e, "gateway call failed");
                return Err(GenerationError::Unavailable(reason));
            }
            Err(_) => {
                warn!(
                    purpose = profile.purpose,
                    timeout_secs = self.timeout.as_secs_f64(),
                    "gateway call timed out"
                );
                return Err(GenerationError::Unavailable(FailureReason::Timeout));
            }
        };

        match response.text() {
            Ok(text) => Ok(text.trim().to_string()),
            Err(e) => {
                warn!(purpose = profile.purpose, error = %e, "gateway returned no text");
                Err(GenerationError::Unavailable(FailureReason::InvalidResponse))
            }
        }
    }

    /// Completion parsed into one of the payload schemas. A reply with no
    /// recoverable JSON object is `Malformed`.
    pub async fn complete_json<T: DeserializeOwned>(
        &self,
        system: &str,
        prompt: &str,
        profile: CallProfile,
    ) -> Result<T, GenerationError> {
        let text = self
            .complete_text(system, vec![Message::user(prompt)], profile)
            .await?;

        match extract(&text) {
            Extraction::Parsed(value) => serde_json::from_value(value).map_err(|e| {
                warn!(purpose = profile.purpose, error = %e, "structured output did not fit schema");
                GenerationError::Malformed
            }),
            Extraction::Defaulted(_) => Err(GenerationError::Malformed),
        }
    }
}
