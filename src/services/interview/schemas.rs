//! Generated Payload Schemas
//!
//! One typed schema per call site that asks the generator for JSON. Every
//! field has a default and is decoded leniently, so a partially-correct
//! object still yields a usable value.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Numeric score from a number, a numeric string, or an object with a
/// `score` key. Clamped to 0-100; anything else is 0.
pub fn score_from_value(value: &Value) -> f64 {
    let raw = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().unwrap_or(0.0),
        Value::Object(map) => map.get("score").map(score_from_value).unwrap_or(0.0),
        _ => 0.0,
    };
    if raw.is_finite() {
        raw.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

fn lenient_score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(score_from_value(&value))
}

fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) if !s.trim().is_empty() => Some(s),
                Value::String(_) | Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s],
        _ => Vec::new(),
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}

fn lenient_engagement<'de, D>(deserializer: D) -> Result<EngagementNarrative, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Analysis of the candidate's self-introduction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntroAnalysis {
    #[serde(deserialize_with = "lenient_string")]
    pub experience_level: String,
    #[serde(deserialize_with = "lenient_strings")]
    pub primary_use_cases: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub mentioned_skills: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub confidence_indicators: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub areas_to_explore: Vec<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub suggested_starting_difficulty: String,
    #[serde(deserialize_with = "lenient_strings")]
    pub personality_traits: Vec<String>,
    #[serde(deserialize_with = "lenient_opt_string")]
    pub next_question_focus: Option<String>,
}

/// Structured evaluation of one answer. Dimension scores may arrive as bare
/// numbers or as `{"score": n, ...}` objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationPayload {
    #[serde(deserialize_with = "lenient_score")]
    pub technical_accuracy: f64,
    #[serde(deserialize_with = "lenient_score")]
    pub depth_of_knowledge: f64,
    #[serde(deserialize_with = "lenient_score")]
    pub communication_clarity: f64,
    #[serde(deserialize_with = "lenient_score")]
    pub practical_understanding: f64,
    #[serde(deserialize_with = "lenient_score")]
    pub overall_score: f64,
    #[serde(deserialize_with = "lenient_strings")]
    pub key_strengths: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub areas_for_improvement: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub follow_up_suggestions: Vec<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub difficulty_adjustment: String,
    #[serde(deserialize_with = "lenient_string")]
    pub engagement_level: String,
    #[serde(deserialize_with = "lenient_strings")]
    pub confidence_indicators: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub knowledge_gaps: Vec<String>,
    #[serde(deserialize_with = "lenient_opt_string")]
    pub next_focus_area: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub personalized_feedback: String,
    #[serde(deserialize_with = "lenient_opt_string")]
    pub category: Option<String>,
}

/// Engagement section of the report narrative
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementNarrative {
    #[serde(deserialize_with = "lenient_string")]
    pub participation_level: String,
    #[serde(deserialize_with = "lenient_string")]
    pub detail_in_responses: String,
    #[serde(deserialize_with = "lenient_strings")]
    pub enthusiasm_indicators: Vec<String>,
}

/// Narrative parts of the final report. Scores and tiers are always
/// computed from the evaluation records, never taken from here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportNarrative {
    #[serde(deserialize_with = "lenient_engagement")]
    pub engagement_analysis: EngagementNarrative,
    #[serde(deserialize_with = "lenient_strings")]
    pub strengths: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub weaknesses: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub recommendations: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub learning_recommendations: Vec<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub final_feedback: String,
}
