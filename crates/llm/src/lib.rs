//! Excel Interview LLM
//!
//! The completion gateway used by the interview engine:
//! - `LlmProvider` trait: ordered role-tagged messages in, one completion out
//! - `OpenAIProvider`: OpenAI-compatible chat completions (Groq by default)
//!
//! Also includes the HTTP client factory.

pub mod http_client;
pub mod openai;
pub mod provider;
pub mod types;

// Re-export main types
pub use http_client::build_http_client;
pub use openai::OpenAIProvider;
pub use provider::LlmProvider;
pub use types::*;
