//! Evaluation Models
//!
//! The normalized evaluation of one answer and its persisted record.

use serde::{Deserialize, Serialize};

use super::session::{DifficultyAdjustment, EngagementLevel};

/// Where an evaluation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationSource {
    /// Structured output recovered from the generator
    Generated,
    /// Deterministic keyword-overlap substitute
    KeywordFallback,
}

/// Multi-dimensional evaluation of a candidate answer. All scores are 0-100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub technical_accuracy: f64,
    pub depth: f64,
    pub clarity: f64,
    pub practical_understanding: f64,
    /// Not necessarily the mean of the dimensions
    pub overall_score: f64,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub follow_up_suggestions: Vec<String>,
    pub difficulty_adjustment: DifficultyAdjustment,
    pub engagement_level: EngagementLevel,
    pub feedback: String,
    #[serde(default)]
    pub next_focus_area: Option<String>,
    /// Optional skill category tag used by the report breakdown
    #[serde(default)]
    pub category: Option<String>,
    pub source: EvaluationSource,
}

impl Evaluation {
    pub fn is_fallback(&self) -> bool {
        self.source == EvaluationSource::KeywordFallback
    }
}

/// Persisted evaluation of one answered turn. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub id: String,
    pub session_id: String,
    pub question_index: u32,
    pub question_text: String,
    pub candidate_answer: String,
    pub evaluation: Evaluation,
    pub score: f64,
    pub feedback: String,
    /// Whether the answered question was a follow-up
    #[serde(default)]
    pub follow_up: bool,
    pub created_at: String,
}

impl EvaluationRecord {
    /// Category used for skill-breakdown grouping
    pub fn category(&self) -> &str {
        self.evaluation
            .category
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or("General")
    }
}
