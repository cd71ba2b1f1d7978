//! Excel Interview Core
//!
//! Foundational error types and conversation primitives for the interview
//! workspace. This crate has zero dependencies on application-level code
//! (storage, HTTP, LLM providers).
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `conversation` - Transcript model (`Role`, `Turn`, `ConversationContext`)

pub mod conversation;
pub mod error;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Conversation ───────────────────────────────────────────────────────
pub use conversation::{ConversationContext, Role, Turn, TurnAudit};
