//! Adaptive Question Generator
//!
//! Produces every interviewer message after the opening one. Each method
//! returns usable text; when generation fails the fixed fallback text is
//! substituted and the result is flagged.

use excel_interview_core::ConversationContext;
use excel_interview_llm::Message;
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::evaluation::Evaluation;
use crate::models::session::{CandidateProfile, Difficulty, SkillCategory};

use super::fallback::{self, CannedQuestion};
use super::generation::{
    GenerationClient, GenerationError, CLOSING, FOLLOW_UP, INTRO_ANALYSIS, INTRO_TRANSITION,
    NEXT_QUESTION,
};
use super::prompts;
use super::schemas::IntroAnalysis;

/// Turns of context sent with a follow-up request
pub const FOLLOW_UP_WINDOW: usize = 3;
/// Turns of context sent with a next-question request
pub const QUESTION_WINDOW: usize = 4;

/// An interviewer question and the keywords its fallback score looks for
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedQuestion {
    pub text: String,
    pub keywords: Vec<String>,
    /// Whether the text came from the fallback policy
    pub fallback: bool,
}

impl GeneratedQuestion {
    fn generated(text: String) -> Self {
        let keywords = fallback::derive_keywords(&text);
        Self {
            text,
            keywords,
            fallback: false,
        }
    }

    fn canned(text: String, question: &CannedQuestion) -> Self {
        Self {
            text,
            keywords: fallback::canned_keywords(question),
            fallback: true,
        }
    }
}

/// Generates interviewer messages through the generation client
pub struct QuestionGenerator<'a> {
    client: &'a GenerationClient,
}

impl<'a> QuestionGenerator<'a> {
    pub fn new(client: &'a GenerationClient) -> Self {
        Self { client }
    }

    /// Structured analysis of the candidate's introduction
    pub async fn analyze_introduction(
        &self,
        introduction: &str,
    ) -> Result<IntroAnalysis, GenerationError> {
        let prompt = prompts::build_analysis_prompt(introduction);
        let analysis: IntroAnalysis = self
            .client
            .complete_json(&prompts::analysis_system(), &prompt, INTRO_ANALYSIS)
            .await?;
        debug!(
            experience_level = %analysis.experience_level,
            skills = analysis.mentioned_skills.len(),
            "introduction analyzed"
        );
        Ok(analysis)
    }

    /// Acknowledgement of the introduction followed by the first question
    pub async fn transition(
        &self,
        analysis: &IntroAnalysis,
        introduction: &str,
    ) -> Result<GeneratedQuestion, GenerationError> {
        let analysis = serde_json::to_value(analysis).unwrap_or(Value::Null);
        let prompt = prompts::build_transition_prompt(&analysis, introduction);
        let text = self
            .client
            .complete_text(
                &prompts::transition_system(),
                vec![Message::user(prompt)],
                INTRO_TRANSITION,
            )
            .await?;
        Ok(GeneratedQuestion::generated(text))
    }

    /// Canned first question used when the introduction cannot be handled
    pub fn intro_fallback(&self) -> GeneratedQuestion {
        GeneratedQuestion::canned(
            fallback::INTRO_FALLBACK_MESSAGE.to_string(),
            &fallback::FIRST_QUESTION,
        )
    }

    /// Deeper question about a strong answer
    pub async fn follow_up(
        &self,
        history: &ConversationContext,
        evaluation: &Evaluation,
    ) -> GeneratedQuestion {
        let prompt = prompts::build_follow_up_prompt(history.window(FOLLOW_UP_WINDOW), evaluation);
        match self
            .client
            .complete_text(
                &prompts::follow_up_system(),
                vec![Message::user(prompt)],
                FOLLOW_UP,
            )
            .await
        {
            Ok(text) => GeneratedQuestion::generated(text),
            Err(e) => {
                warn!(error = %e, "follow-up generation failed, using fallback");
                GeneratedQuestion {
                    text: fallback::FOLLOW_UP_FALLBACK_MESSAGE.to_string(),
                    keywords: fallback::derive_keywords(
                        &evaluation.follow_up_suggestions.join(" "),
                    ),
                    fallback: true,
                }
            }
        }
    }

    /// Next main question. `question_index` is the index of the question
    /// being asked and selects the canned fallback.
    #[allow(clippy::too_many_arguments)]
    pub async fn next_question(
        &self,
        history: &ConversationContext,
        evaluation: &Evaluation,
        profile: &CandidateProfile,
        question_index: u32,
        total_questions: u32,
        difficulty: Difficulty,
        category: SkillCategory,
    ) -> GeneratedQuestion {
        let prompt = prompts::build_next_question_prompt(
            history.window(QUESTION_WINDOW),
            evaluation,
            profile,
            question_index + 1,
            total_questions,
            difficulty,
            category,
        );
        match self
            .client
            .complete_text(
                &prompts::next_question_system(),
                vec![Message::user(prompt)],
                NEXT_QUESTION,
            )
            .await
        {
            Ok(text) => GeneratedQuestion::generated(text),
            Err(e) => {
                let canned = fallback::fallback_question(question_index);
                warn!(
                    error = %e,
                    question_index,
                    "question generation failed, using canned question"
                );
                GeneratedQuestion::canned(
                    format!("{}{}", fallback::NEXT_QUESTION_PREFIX, canned.text),
                    &canned,
                )
            }
        }
    }

    /// Closing message for a completed interview
    pub async fn closing(&self, profile: &CandidateProfile, responses: usize) -> String {
        let prompt = prompts::build_closing_prompt(profile, responses);
        match self
            .client
            .complete_text(
                &prompts::closing_system(),
                vec![Message::user(prompt)],
                CLOSING,
            )
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "closing message generation failed, using fallback");
                fallback::CLOSING_FALLBACK_MESSAGE.to_string()
            }
        }
    }
}
