//! Fallback Policy
//!
//! Deterministic substitutes used whenever generation fails or returns
//! nothing usable: failure classification, a fixed question rotation,
//! canned messages and keyword-overlap scoring.

use serde::{Deserialize, Serialize};

use excel_interview_llm::LlmError;

use crate::models::evaluation::{Evaluation, EvaluationSource};
use crate::models::session::{DifficultyAdjustment, EngagementLevel};

/// Why a gateway call did not produce text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// No provider configured or the model is unknown
    Unavailable,
    Timeout,
    RateLimited,
    NetworkError,
    ServerError,
    AuthenticationFailed,
    /// Envelope unparseable, empty, or rejected as a bad request
    InvalidResponse,
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::Unavailable => write!(f, "unavailable"),
            FailureReason::Timeout => write!(f, "timeout"),
            FailureReason::RateLimited => write!(f, "rate_limited"),
            FailureReason::NetworkError => write!(f, "network_error"),
            FailureReason::ServerError => write!(f, "server_error"),
            FailureReason::AuthenticationFailed => write!(f, "authentication_failed"),
            FailureReason::InvalidResponse => write!(f, "invalid_response"),
        }
    }
}

impl From<&LlmError> for FailureReason {
    fn from(error: &LlmError) -> Self {
        match error {
            LlmError::AuthenticationFailed { .. } => FailureReason::AuthenticationFailed,
            LlmError::RateLimited { .. } => FailureReason::RateLimited,
            LlmError::ModelNotFound { .. } => FailureReason::Unavailable,
            LlmError::InvalidRequest { .. } => FailureReason::InvalidResponse,
            LlmError::ServerError { .. } => FailureReason::ServerError,
            LlmError::NetworkError { .. } => FailureReason::NetworkError,
            LlmError::Timeout { .. } => FailureReason::Timeout,
            LlmError::ParseError { .. } | LlmError::EmptyResponse { .. } => {
                FailureReason::InvalidResponse
            }
            LlmError::Other { .. } => FailureReason::Unavailable,
        }
    }
}

/// A canned question with the keywords its fallback score looks for
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CannedQuestion {
    pub text: &'static str,
    pub keywords: &'static [&'static str],
}

/// Rotation used when the next question cannot be generated
pub const FALLBACK_QUESTIONS: [CannedQuestion; 5] = [
    CannedQuestion {
        text: "How do you handle data validation in Excel?",
        keywords: &["validation", "dropdown", "list", "rule", "input", "error"],
    },
    CannedQuestion {
        text: "What's your approach to creating dynamic charts?",
        keywords: &["chart", "dynamic", "named range", "table", "offset", "series"],
    },
    CannedQuestion {
        text: "Tell me about your experience with Excel macros or VBA.",
        keywords: &["macro", "vba", "record", "automate", "module", "loop"],
    },
    CannedQuestion {
        text: "How would you troubleshoot a formula that's not working as expected?",
        keywords: &["evaluate", "trace", "precedent", "error", "reference", "iferror"],
    },
    CannedQuestion {
        text: "What Excel features do you find most useful for data analysis?",
        keywords: &["pivot", "filter", "sort", "conditional formatting", "power query", "chart"],
    },
];

/// First question asked when the introduction could not be analyzed
pub const FIRST_QUESTION: CannedQuestion = CannedQuestion {
    text: "How would you approach analyzing a large dataset in Excel to identify trends and outliers?",
    keywords: &["pivot", "filter", "sort", "conditional formatting", "chart", "outlier"],
};

pub const INTRO_FALLBACK_MESSAGE: &str = "Thank you for sharing your background! I can see you have valuable Excel experience. Let's dive into some questions to explore your skills further.\n\nLet's start with this: How would you approach analyzing a large dataset in Excel to identify trends and outliers?";

pub const FOLLOW_UP_FALLBACK_MESSAGE: &str = "That's a great response! Could you tell me about a specific situation where you've applied this knowledge?";

pub const NEXT_QUESTION_PREFIX: &str = "Great! Let's explore another area. ";

pub const CLOSING_FALLBACK_MESSAGE: &str = "Thank you for completing the Excel skills assessment! It's been a pleasure learning about your experience and skills. Your detailed report is now ready.";

pub const COMPLETED_ACKNOWLEDGEMENT: &str =
    "Thank you for completing the assessment! Your comprehensive report has been generated.";

pub const KEYWORD_FEEDBACK: &str = "Response evaluated based on keyword matching.";

/// Canned question for a question index
pub fn fallback_question(question_index: u32) -> CannedQuestion {
    FALLBACK_QUESTIONS[question_index as usize % FALLBACK_QUESTIONS.len()]
}

/// Fraction of keywords present in the answer (case-insensitive substring
/// match), scaled to 0-100. No keywords scores 0.
pub fn keyword_score(answer: &str, keywords: &[String]) -> f64 {
    let answer_lower = answer.to_lowercase();
    let matched = keywords
        .iter()
        .filter(|k| !k.trim().is_empty() && answer_lower.contains(&k.to_lowercase()))
        .count();
    (matched as f64 / keywords.len().max(1) as f64) * 100.0
}

/// Keyword-overlap evaluation used when the evaluator cannot be reached
pub fn keyword_evaluation(answer: &str, keywords: &[String]) -> Evaluation {
    let score = keyword_score(answer, keywords);
    Evaluation {
        technical_accuracy: score,
        depth: score,
        clarity: score,
        practical_understanding: score,
        overall_score: score,
        strengths: vec!["Attempted answer".to_string()],
        improvements: vec!["Could provide more detail".to_string()],
        follow_up_suggestions: Vec::new(),
        difficulty_adjustment: DifficultyAdjustment::Maintain,
        engagement_level: EngagementLevel::Medium,
        feedback: KEYWORD_FEEDBACK.to_string(),
        next_focus_area: None,
        category: None,
        source: EvaluationSource::KeywordFallback,
    }
}

const STOP_WORDS: &[&str] = &[
    "about", "after", "also", "another", "approach", "area", "areas", "been", "could", "does",
    "excel", "experience", "explain", "from", "have", "into", "let's", "more", "most", "other",
    "question", "should", "some", "tell", "that", "that's", "their", "them", "then", "there",
    "these", "they", "this", "what", "what's", "when", "where", "which", "while", "with",
    "would", "your", "you've", "you're", "great", "really", "describe", "like", "share",
];

/// The sentence ending in the last `?` of a generated message. Generated
/// questions often open with praise or a transition, which carries no
/// keywords. `None` when the message asks nothing.
fn question_sentence(message: &str) -> Option<&str> {
    let end = message.rfind('?')?;
    let start = message[..end]
        .rfind(|c: char| matches!(c, '.' | '!' | '?' | '\n'))
        .map_or(0, |i| i + 1);
    Some(message[start..=end].trim())
}

fn content_words(text: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for word in text.split(|c: char| !(c.is_alphanumeric() || c == '\'')) {
        let word = word.trim_matches('\'').to_lowercase();
        if word.chars().count() < 4 || STOP_WORDS.contains(&word.as_str()) {
            continue;
        }
        if !keywords.contains(&word) {
            keywords.push(word);
        }
        if keywords.len() == 6 {
            break;
        }
    }
    keywords
}

/// Content words of a question, used as the expected keywords of a
/// generated question. At most six, in order of appearance, taken from the
/// final question sentence and from the whole message only when that
/// sentence has none.
pub fn derive_keywords(question: &str) -> Vec<String> {
    if let Some(sentence) = question_sentence(question) {
        let keywords = content_words(sentence);
        if !keywords.is_empty() {
            return keywords;
        }
    }
    content_words(question)
}

/// Owned keyword list of a canned question
pub fn canned_keywords(question: &CannedQuestion) -> Vec<String> {
    question.keywords.iter().map(|k| k.to_string()).collect()
}
