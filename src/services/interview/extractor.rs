//! Structured-Output Extractor
//!
//! Recovers one JSON object from free-form generated text. Never fails:
//! when nothing usable is found a default object is returned whose keys
//! cover every schema the interview reads.

use serde_json::{json, Value};
use tracing::warn;

/// Outcome of an extraction
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// A JSON object was recovered from the text
    Parsed(Value),
    /// Nothing usable was found; the value is [`default_object`]
    Defaulted(Value),
}

/// Union of every structured schema, filled with neutral values
pub fn default_object() -> Value {
    json!({
        "question": "What is your experience with Excel?",
        "keywords": ["excel", "experience"],
        "follow_up": "Can you provide more details?",
        "score": 50,
        "overall_score": 50,
        "feedback": "Response received but could not be properly evaluated.",
        "personalized_feedback": "Response received but could not be properly evaluated.",
        "strengths": [],
        "improvements": [],
        "key_strengths": [],
        "areas_for_improvement": [],
        "follow_up_suggestions": [],
        "difficulty_adjustment": "maintain",
        "engagement_level": "medium",
        "experience_level": "intermediate",
        "suggested_starting_difficulty": "medium",
        "skill_level": "Intermediate",
        "recommendations": ["Continue practicing Excel skills"],
        "primary_use_cases": [],
        "mentioned_skills": [],
        "confidence_indicators": [],
        "areas_to_explore": [],
        "personality_traits": [],
        "knowledge_gaps": [],
        "weaknesses": [],
        "learning_recommendations": [],
    })
}

fn parse_object(candidate: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(candidate.trim()) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

/// Contents of the first fenced code block, language tag skipped
fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after_fence = &text[start + 3..];
    let content_start = after_fence.find('\n').map(|nl| nl + 1).unwrap_or(0);
    let content = &after_fence[content_start..];
    let end = content.find("```")?;
    Some(&content[..end])
}

/// Greedy span from the first `{` to the last `}`
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start <= end).then(|| &text[start..=end])
}

/// Extract a JSON object from generated text.
///
/// Tries, in order: the whole trimmed text, the first fenced code block,
/// then the greedy brace span. Only objects are accepted.
pub fn extract(text: &str) -> Extraction {
    let trimmed = text.trim();

    let recovered = parse_object(trimmed)
        .or_else(|| fenced_block(trimmed).and_then(parse_object))
        .or_else(|| brace_span(trimmed).and_then(parse_object));

    match recovered {
        Some(value) => Extraction::Parsed(value),
        None => {
            warn!(
                text_len = text.len(),
                "could not recover JSON object from generated text, using defaults"
            );
            Extraction::Defaulted(default_object())
        }
    }
}
