//! OpenAI-Compatible Provider
//!
//! Implementation of the LlmProvider trait for chat-completions endpoints
//! that follow the OpenAI wire format (Groq, OpenAI).

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::provider::{missing_api_key_error, parse_http_error, LlmProvider};
use super::types::{
    LlmError, LlmRequestOptions, LlmResponse, LlmResult, Message, ProviderConfig, ProviderType,
    StopReason, UsageStats,
};
use crate::http_client::build_http_client;

/// OpenAI-compatible provider
pub struct OpenAIProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl OpenAIProvider {
    /// Create a new provider with the given configuration
    pub fn new(config: ProviderConfig) -> LlmResult<Self> {
        let client = build_http_client(config.timeout_secs)?;
        Ok(Self { config, client })
    }

    /// Get the API base URL
    fn base_url(&self) -> &str {
        self.config
            .base_url
            .as_deref()
            .unwrap_or(self.config.provider.default_base_url())
    }

    /// Models endpoint derived from the chat-completions URL
    fn models_url(&self) -> String {
        let base = self.base_url();
        match base.strip_suffix("/chat/completions") {
            Some(root) => format!("{}/models", root),
            None => format!("{}/models", base.trim_end_matches('/')),
        }
    }

    /// Build the request body for the API
    fn build_request_body(
        &self,
        messages: &[Message],
        request_options: &LlmRequestOptions,
    ) -> serde_json::Value {
        let temperature = request_options
            .temperature_override
            .unwrap_or(self.config.temperature)
            .clamp(0.0, 2.0);
        let max_tokens = request_options
            .max_tokens_override
            .unwrap_or(self.config.max_tokens);

        serde_json::json!({
            "model": self.config.model,
            "messages": messages,
            "temperature": temperature,
            "max_tokens": max_tokens,
        })
    }

    /// Parse a response from the API
    fn parse_response(&self, response: &ChatCompletionResponse) -> LlmResponse {
        let choice = response.choices.first();

        let content = choice
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.clone());

        let stop_reason = choice
            .and_then(|c| c.finish_reason.as_ref())
            .map(|r| StopReason::from(r.as_str()))
            .unwrap_or(StopReason::EndTurn);

        let usage = response
            .usage
            .as_ref()
            .map(|u| UsageStats {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        LlmResponse {
            content,
            stop_reason,
            usage,
            model: response
                .model
                .clone()
                .unwrap_or_else(|| self.config.model.clone()),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    fn name(&self) -> &'static str {
        match self.config.provider {
            ProviderType::Groq => "groq",
            ProviderType::OpenAI => "openai",
        }
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn send_message(
        &self,
        messages: Vec<Message>,
        request_options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| missing_api_key_error(self.name()))?;

        let body = self.build_request_body(&messages, &request_options);

        debug!(
            provider = self.name(),
            model = %self.config.model,
            message_count = messages.len(),
            "sending chat completion request"
        );

        let response = self
            .client
            .post(self.base_url())
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout {
                        seconds: self.config.timeout_secs,
                    }
                } else {
                    LlmError::NetworkError {
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status().as_u16();
        let body_text = response.text().await.map_err(|e| LlmError::NetworkError {
            message: e.to_string(),
        })?;

        if status != 200 {
            return Err(parse_http_error(status, &body_text, self.name()));
        }

        let parsed: ChatCompletionResponse =
            serde_json::from_str(&body_text).map_err(|e| LlmError::ParseError {
                message: format!("Failed to parse response: {}", e),
            })?;

        let llm_response = self.parse_response(&parsed);
        llm_response.text()?;
        Ok(llm_response)
    }

    async fn health_check(&self) -> LlmResult<()> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| missing_api_key_error(self.name()))?;

        let response = self
            .client
            .get(self.models_url())
            .header("Authorization", format!("Bearer {}", api_key))
            .send()
            .await
            .map_err(|e| LlmError::NetworkError {
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if status == 200 {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(parse_http_error(status, &body, self.name()))
        }
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

/// Chat-completions response envelope
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<ResponseUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
