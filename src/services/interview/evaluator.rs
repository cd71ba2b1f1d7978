//! Response Evaluator
//!
//! Scores one candidate answer. Generation problems never escape: any
//! failure is replaced by the keyword-overlap evaluation so the turn still
//! counts toward progress.

use excel_interview_core::ConversationContext;
use tracing::{debug, warn};

use crate::models::evaluation::{Evaluation, EvaluationSource};
use crate::models::session::{CandidateProfile, DifficultyAdjustment, EngagementLevel};

use super::fallback;
use super::generation::{GenerationClient, EVALUATION};
use super::prompts;
use super::schemas::EvaluationPayload;

/// Turns of context the evaluator sees
pub const EVALUATION_WINDOW: usize = 4;

impl From<EvaluationPayload> for Evaluation {
    fn from(payload: EvaluationPayload) -> Self {
        let feedback = if payload.personalized_feedback.trim().is_empty() {
            "Response received but could not be properly evaluated.".to_string()
        } else {
            payload.personalized_feedback
        };

        Evaluation {
            technical_accuracy: payload.technical_accuracy,
            depth: payload.depth_of_knowledge,
            clarity: payload.communication_clarity,
            practical_understanding: payload.practical_understanding,
            overall_score: payload.overall_score,
            strengths: payload.key_strengths,
            improvements: payload.areas_for_improvement,
            follow_up_suggestions: payload.follow_up_suggestions,
            difficulty_adjustment: DifficultyAdjustment::parse_lenient(
                &payload.difficulty_adjustment,
            ),
            engagement_level: EngagementLevel::from_generated(&payload.engagement_level),
            feedback,
            next_focus_area: payload.next_focus_area,
            category: payload.category,
            source: EvaluationSource::Generated,
        }
    }
}

/// Evaluates answers through the generation client
pub struct Evaluator<'a> {
    client: &'a GenerationClient,
}

impl<'a> Evaluator<'a> {
    pub fn new(client: &'a GenerationClient) -> Self {
        Self { client }
    }

    /// Evaluate `answer` to `question`.
    ///
    /// Only the last few turns of `history` are sent.
    /// `keywords` are the expected keywords used if generation fails.
    pub async fn evaluate(
        &self,
        history: &ConversationContext,
        profile: &CandidateProfile,
        question: &str,
        answer: &str,
        keywords: &[String],
    ) -> Evaluation {
        let prompt = prompts::build_evaluation_prompt(
            history.window(EVALUATION_WINDOW),
            profile,
            question,
            answer,
        );

        match self
            .client
            .complete_json::<EvaluationPayload>(&prompts::evaluation_system(), &prompt, EVALUATION)
            .await
        {
            Ok(payload) => {
                let evaluation = Evaluation::from(payload);
                debug!(
                    overall_score = evaluation.overall_score,
                    depth = evaluation.depth,
                    "answer evaluated"
                );
                evaluation
            }
            Err(e) => {
                let evaluation = fallback::keyword_evaluation(answer, keywords);
                warn!(
                    error = %e,
                    score = evaluation.overall_score,
                    keywords = keywords.len(),
                    "evaluation fell back to keyword matching"
                );
                evaluation
            }
        }
    }
}
