//! Conversation Primitives
//!
//! The transcript model shared by the engine and the gateway crate. A
//! transcript only ever grows; callers that need a bounded view take a
//! read-only window instead of truncating.

use serde::{Deserialize, Serialize};

/// Speaker of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit payload attached to a turn.
///
/// Kept for inspection only. Never replayed to the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum TurnAudit {
    /// Structured analysis of the candidate introduction
    Analysis(serde_json::Value),
    /// Structured evaluation that led to this turn
    Evaluation(serde_json::Value),
}

/// A single role-tagged message in the transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    /// RFC 3339 timestamp, supplied by the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Marks assistant turns that are follow-ups rather than new questions
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub follow_up: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit: Option<TurnAudit>,
}

impl Turn {
    /// Create a plain turn with no timestamp or audit payload
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: None,
            follow_up: false,
            audit: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Attach a timestamp
    pub fn at(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Attach an audit payload
    pub fn with_audit(mut self, audit: TurnAudit) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Mark this turn as a follow-up question
    pub fn as_follow_up(mut self) -> Self {
        self.follow_up = true;
        self
    }
}

/// Ordered, append-only transcript of a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationContext {
    turns: Vec<Turn>,
}

impl ConversationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// All turns in order
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// The last `n` turns (or fewer if the transcript is shorter)
    pub fn window(&self, n: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    /// Most recent assistant turn, if any
    pub fn last_assistant(&self) -> Option<&Turn> {
        self.turns.iter().rev().find(|t| t.role == Role::Assistant)
    }
}

impl From<Vec<Turn>> for ConversationContext {
    fn from(turns: Vec<Turn>) -> Self {
        Self { turns }
    }
}
