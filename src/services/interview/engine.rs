//! Interview Engine
//!
//! Drives the interview state machine over a [`SessionStore`]. Every
//! mutating call takes the session's lock, re-reads the session, mutates a
//! local copy and writes it back. Generation failures are absorbed by the
//! fallback policy; only `NotFound` and `InvalidState` reach the caller.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info, warn};

use excel_interview_core::{Turn, TurnAudit};
use excel_interview_llm::LlmProvider;

use crate::models::evaluation::{Evaluation, EvaluationRecord};
use crate::models::records::{
    IncidentStatus, NewPreInterviewCheck, NewSupportIncident, PreInterviewCheck, SupportIncident,
};
use crate::models::response::{
    CandidateInsights, EvaluationSummary, HealthStatus, InterviewStage, ReportLookup,
    SessionStatus, TurnResponse,
};
use crate::models::session::{
    Difficulty, EngagementLevel, ExperienceLevel, NewCandidate, ResponsePattern, Session,
    SessionState, SkillCategory,
};
use crate::models::settings::AppConfig;
use crate::storage::store::{new_id, now_timestamp, ChildRecord, SessionStore, SessionUpdate};
use crate::utils::error::{AppError, AppResult};

use super::evaluator::Evaluator;
use super::fallback::COMPLETED_ACKNOWLEDGEMENT;
use super::generation::GenerationClient;
use super::generator::{GeneratedQuestion, QuestionGenerator};
use super::locks::SessionLocks;
use super::prompts;
use super::report::ReportBuilder;
use super::schemas::IntroAnalysis;

/// Depth score an answer must exceed to earn a follow-up
pub const FOLLOW_UP_DEPTH: f64 = 80.0;
/// Follow-ups allowed per session
pub const MAX_FOLLOW_UPS: u32 = 2;

/// Engine tunables, usually taken from [`AppConfig`]
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub total_questions: u32,
    pub gateway_timeout: Duration,
    /// Idle time after which an unfinished session is removed
    pub session_timeout: Duration,
    /// Age after which a completed session is removed
    pub completed_retention: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for EngineSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            total_questions: config.max_questions,
            gateway_timeout: Duration::from_secs(config.gateway_timeout_secs),
            session_timeout: Duration::from_secs(config.session_timeout_secs),
            completed_retention: Duration::from_secs(config.cleanup_after_hours * 3600),
        }
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Whether `since` lies further than `limit` in the past
fn older_than(since: Option<&str>, limit: Duration, now: DateTime<Utc>) -> bool {
    let Some(since) = since.and_then(parse_timestamp) else {
        return false;
    };
    match chrono::Duration::from_std(limit) {
        Ok(limit) => now - since > limit,
        Err(_) => false,
    }
}

fn evaluation_summary(evaluation: &Evaluation) -> EvaluationSummary {
    EvaluationSummary {
        score: evaluation.overall_score,
        strengths: evaluation.strengths.iter().take(2).cloned().collect(),
        focus_area: evaluation.next_focus_area.clone(),
    }
}

fn evaluation_audit(evaluation: &Evaluation) -> Option<TurnAudit> {
    serde_json::to_value(evaluation)
        .ok()
        .map(TurnAudit::Evaluation)
}

/// The interview core
pub struct InterviewEngine {
    store: Arc<dyn SessionStore>,
    generation: GenerationClient,
    locks: SessionLocks,
    settings: EngineSettings,
}

impl InterviewEngine {
    pub fn new(
        store: Arc<dyn SessionStore>,
        provider: Arc<dyn LlmProvider>,
        settings: EngineSettings,
    ) -> Self {
        let generation = GenerationClient::new(provider, settings.gateway_timeout);
        Self {
            store,
            generation,
            locks: SessionLocks::new(),
            settings,
        }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    async fn load(&self, session_id: &str) -> AppResult<Session> {
        self.store
            .get(session_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Session not found: {}", session_id)))
    }

    /// Take the session's lock and load it. A lock entry created for an
    /// unknown id is released again before `NotFound` is returned.
    async fn lock_session(&self, session_id: &str) -> AppResult<(OwnedMutexGuard<()>, Session)> {
        let guard = self.locks.lock(session_id).await;
        match self.load(session_id).await {
            Ok(session) => Ok((guard, session)),
            Err(e) => {
                drop(guard);
                self.locks.release_if_idle(session_id);
                Err(e)
            }
        }
    }

    fn is_expired(&self, session: &Session, now: DateTime<Utc>) -> bool {
        match session.state {
            SessionState::Completed => older_than(
                session.completed_at.as_deref(),
                self.settings.completed_retention,
                now,
            ),
            _ => older_than(
                Some(session.updated_at.as_str()),
                self.settings.session_timeout,
                now,
            ),
        }
    }

    async fn save(&self, session: &Session) -> AppResult<()> {
        if self
            .store
            .update(&session.id, SessionUpdate::from_session(session))
            .await?
        {
            Ok(())
        } else {
            Err(AppError::not_found(format!(
                "Session not found: {}",
                session.id
            )))
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Create a session in INIT, optionally linked to a new candidate record
    pub async fn create_session(&self, candidate: Option<NewCandidate>) -> AppResult<String> {
        let candidate_id = match candidate {
            Some(candidate) => Some(self.store.create_candidate(candidate).await?.id),
            None => None,
        };

        let session = Session::new(
            self.settings.total_questions,
            candidate_id,
            &now_timestamp(),
        );
        let session = self.store.create(session).await?;
        info!(
            session_id = %session.id,
            total_questions = session.total_questions,
            store = self.store.name(),
            "session created"
        );
        Ok(session.id)
    }

    /// Move a session from INIT to INTRO and return the opening message
    pub async fn start_interview(&self, session_id: &str) -> AppResult<TurnResponse> {
        let (_guard, mut session) = self.lock_session(session_id).await?;

        if session.state != SessionState::Init {
            return Err(AppError::invalid_state(format!(
                "Interview already started (state: {})",
                session.state
            )));
        }

        let now = now_timestamp();
        session
            .conversation
            .push(Turn::system(prompts::INTERVIEWER_SYSTEM).at(now.clone()));
        session
            .conversation
            .push(Turn::assistant(prompts::INTRO_MESSAGE).at(now));
        session.state = SessionState::Intro;
        self.save(&session).await?;

        info!(session_id = %session_id, "interview started");
        Ok(
            TurnResponse::new(prompts::INTRO_MESSAGE, session.state, InterviewStage::Introduction)
                .with_guidance(prompts::INTRO_GUIDANCE),
        )
    }

    /// Handle one candidate message
    pub async fn process_response(&self, session_id: &str, text: &str) -> AppResult<TurnResponse> {
        let (_guard, session) = self.lock_session(session_id).await?;

        debug!(session_id = %session_id, state = %session.state, "processing response");
        match session.state {
            SessionState::Init => Err(AppError::invalid_state(
                "Interview has not been started".to_string(),
            )),
            SessionState::Intro => self.handle_introduction(session, text).await,
            SessionState::Questioning | SessionState::Evaluating => {
                self.handle_answer(session, text).await
            }
            SessionState::Completed => Ok(TurnResponse::new(
                COMPLETED_ACKNOWLEDGEMENT,
                SessionState::Completed,
                InterviewStage::Completed,
            )),
        }
    }

    // ========================================================================
    // Introduction
    // ========================================================================

    async fn handle_introduction(
        &self,
        mut session: Session,
        introduction: &str,
    ) -> AppResult<TurnResponse> {
        let now = now_timestamp();
        session
            .conversation
            .push(Turn::user(introduction).at(now.clone()));

        let generator = QuestionGenerator::new(&self.generation);
        let (question, insights, audit) = match generator.analyze_introduction(introduction).await
        {
            Ok(analysis) => {
                apply_introduction(&mut session, &analysis);
                let insights = CandidateInsights {
                    experience_level: session.profile.experience_level.as_str().to_string(),
                    focus_areas: analysis.areas_to_explore.iter().take(3).cloned().collect(),
                    confidence: if analysis.confidence_indicators.len() > 2 {
                        "high".to_string()
                    } else {
                        "moderate".to_string()
                    },
                };
                let question = match generator.transition(&analysis, introduction).await {
                    Ok(question) => question,
                    Err(e) => {
                        warn!(session_id = %session.id, error = %e, "intro transition failed, using fallback");
                        generator.intro_fallback()
                    }
                };
                let audit = serde_json::to_value(&analysis).ok().map(TurnAudit::Analysis);
                (question, insights, audit)
            }
            Err(e) => {
                warn!(session_id = %session.id, error = %e, "intro analysis failed, using fallback");
                session.profile.experience_level = ExperienceLevel::Intermediate;
                session.profile.engagement_level = EngagementLevel::Medium;
                let insights = CandidateInsights {
                    experience_level: ExperienceLevel::Intermediate.as_str().to_string(),
                    focus_areas: Vec::new(),
                    confidence: "moderate".to_string(),
                };
                (generator.intro_fallback(), insights, None)
            }
        };

        let mut turn = Turn::assistant(question.text.clone()).at(now);
        if let Some(audit) = audit {
            turn = turn.with_audit(audit);
        }
        session.conversation.push(turn);

        session.flow.introduction_complete = true;
        session.flow.technical_assessment_started = true;
        set_current_question(&mut session, &question);
        session.state = SessionState::Questioning;
        session.current_question_index = 0;
        self.save(&session).await?;

        info!(
            session_id = %session.id,
            experience_level = session.profile.experience_level.as_str(),
            difficulty = session.difficulty.as_str(),
            fallback = question.fallback,
            "introduction handled, questioning started"
        );

        let mut response = TurnResponse::new(
            question.text,
            session.state,
            InterviewStage::TechnicalAssessment,
        )
        .with_progress(1, session.total_questions)
        .with_guidance(prompts::ASSESSMENT_GUIDANCE);
        response.candidate_insights = Some(insights);
        Ok(response)
    }

    // ========================================================================
    // Questioning
    // ========================================================================

    async fn handle_answer(&self, mut session: Session, answer: &str) -> AppResult<TurnResponse> {
        let now = now_timestamp();
        let question = session
            .flow
            .current_question
            .clone()
            .or_else(|| session.conversation.last_assistant().map(|t| t.content.clone()))
            .unwrap_or_default();
        let answered_follow_up = session
            .conversation
            .last_assistant()
            .map(|t| t.follow_up)
            .unwrap_or(false);

        session.conversation.push(Turn::user(answer).at(now.clone()));

        let evaluation = Evaluator::new(&self.generation)
            .evaluate(
                &session.conversation,
                &session.profile,
                &question,
                answer,
                &session.flow.current_keywords,
            )
            .await;

        let record = EvaluationRecord {
            id: new_id(),
            session_id: session.id.clone(),
            question_index: session.current_question_index,
            question_text: question,
            candidate_answer: answer.to_string(),
            evaluation: evaluation.clone(),
            score: evaluation.overall_score,
            feedback: evaluation.feedback.clone(),
            follow_up: answered_follow_up,
            created_at: now.clone(),
        };
        self.store
            .append_child(&session.id, ChildRecord::Response(record))
            .await?;

        session.score += evaluation.overall_score;
        update_profile(&mut session, &evaluation);
        let previous = session.difficulty;
        session.difficulty = session.difficulty.adjust(evaluation.difficulty_adjustment);
        if session.difficulty != previous {
            debug!(
                session_id = %session.id,
                from = previous.as_str(),
                to = session.difficulty.as_str(),
                "difficulty adjusted"
            );
        }

        let wants_follow_up = evaluation.depth > FOLLOW_UP_DEPTH
            && session.flow.follow_up_questions < MAX_FOLLOW_UPS
            && !evaluation.follow_up_suggestions.is_empty();

        if wants_follow_up {
            self.ask_follow_up(session, evaluation, now).await
        } else if session.current_question_index + 1 >= session.total_questions {
            self.complete(session, now).await
        } else {
            self.ask_next_question(session, evaluation, now).await
        }
    }

    async fn ask_follow_up(
        &self,
        mut session: Session,
        evaluation: Evaluation,
        now: String,
    ) -> AppResult<TurnResponse> {
        let question = QuestionGenerator::new(&self.generation)
            .follow_up(&session.conversation, &evaluation)
            .await;

        session.flow.follow_up_questions += 1;
        let mut turn = Turn::assistant(question.text.clone()).at(now).as_follow_up();
        if let Some(audit) = evaluation_audit(&evaluation) {
            turn = turn.with_audit(audit);
        }
        session.conversation.push(turn);
        set_current_question(&mut session, &question);
        self.save(&session).await?;

        info!(
            session_id = %session.id,
            follow_ups = session.flow.follow_up_questions,
            question_index = session.current_question_index,
            "follow-up asked"
        );

        let mut response = TurnResponse::new(
            question.text,
            session.state,
            InterviewStage::FollowUpExploration,
        )
        .with_progress(session.current_question_index + 1, session.total_questions)
        .with_guidance(prompts::FOLLOW_UP_GUIDANCE);
        response.evaluation_summary = Some(evaluation_summary(&evaluation));
        Ok(response)
    }

    async fn ask_next_question(
        &self,
        mut session: Session,
        evaluation: Evaluation,
        now: String,
    ) -> AppResult<TurnResponse> {
        session.current_question_index += 1;
        let index = session.current_question_index;
        session.skill_category = SkillCategory::for_question(index);

        let question = QuestionGenerator::new(&self.generation)
            .next_question(
                &session.conversation,
                &evaluation,
                &session.profile,
                index,
                session.total_questions,
                session.difficulty,
                session.skill_category,
            )
            .await;

        let mut turn = Turn::assistant(question.text.clone()).at(now);
        if let Some(audit) = evaluation_audit(&evaluation) {
            turn = turn.with_audit(audit);
        }
        session.conversation.push(turn);
        set_current_question(&mut session, &question);
        self.save(&session).await?;

        info!(
            session_id = %session.id,
            question_index = index,
            difficulty = session.difficulty.as_str(),
            category = session.skill_category.label(),
            fallback = question.fallback,
            "next question asked"
        );

        let stage = if question.fallback {
            InterviewStage::TechnicalAssessment
        } else {
            InterviewStage::AdaptiveQuestioning
        };
        let mut response = TurnResponse::new(question.text, session.state, stage)
            .with_progress(index + 1, session.total_questions)
            .with_guidance(prompts::NEXT_QUESTION_GUIDANCE);
        response.evaluation_summary = Some(evaluation_summary(&evaluation));
        Ok(response)
    }

    async fn complete(&self, mut session: Session, now: String) -> AppResult<TurnResponse> {
        session.current_question_index = session.total_questions;
        session.state = SessionState::Completed;
        session.completed_at = Some(now.clone());

        let records = self.store.list_responses(&session.id).await?;
        let closing = QuestionGenerator::new(&self.generation)
            .closing(&session.profile, records.len())
            .await;
        session
            .conversation
            .push(Turn::assistant(closing.clone()).at(now.clone()));

        let report = ReportBuilder::new(&self.generation)
            .build(&session, &records, &closing, &now)
            .await;
        self.store.save_report(report.clone()).await?;
        self.save(&session).await?;

        info!(
            session_id = %session.id,
            answers = records.len(),
            overall_score = report.overall_score,
            "interview completed"
        );

        let mut response = TurnResponse::new(closing, session.state, InterviewStage::Completed)
            .with_progress(session.total_questions, session.total_questions);
        response.report = Some(report);
        Ok(response)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub async fn get_status(&self, session_id: &str) -> AppResult<SessionStatus> {
        let session = self.load(session_id).await?;
        let answered = self.store.list_responses(session_id).await?.len() as u32;
        let current_score = if answered == 0 {
            0.0
        } else {
            session.score / answered as f64
        };

        Ok(SessionStatus {
            session_id: session.id,
            state: session.state,
            questions_answered: answered,
            total_questions: session.total_questions,
            current_question_index: session.current_question_index,
            current_score,
            difficulty: session.difficulty,
            follow_ups_used: session.flow.follow_up_questions,
        })
    }

    pub async fn get_report(&self, session_id: &str) -> AppResult<ReportLookup> {
        let session = self.load(session_id).await?;
        if session.state != SessionState::Completed {
            return Ok(ReportLookup::NotCompleted);
        }
        Ok(match self.store.get_report(session_id).await? {
            Some(report) => ReportLookup::Ready(Box::new(report)),
            None => ReportLookup::Missing,
        })
    }

    pub async fn list_active_sessions(&self) -> AppResult<Vec<Session>> {
        self.store.list_active().await
    }

    pub async fn latest_session(&self) -> AppResult<Option<Session>> {
        self.store.latest().await
    }

    // ========================================================================
    // Auxiliary records
    // ========================================================================

    pub async fn record_pre_interview_check(
        &self,
        session_id: &str,
        check: NewPreInterviewCheck,
    ) -> AppResult<PreInterviewCheck> {
        let record = PreInterviewCheck {
            id: new_id(),
            session_id: session_id.to_string(),
            check_type: check.check_type,
            passed: check.passed,
            details: check.details,
            created_at: now_timestamp(),
        };
        self.store
            .append_child(session_id, ChildRecord::Check(record.clone()))
            .await?;
        debug!(session_id = %session_id, check_type = %record.check_type, passed = record.passed, "pre-interview check recorded");
        Ok(record)
    }

    pub async fn report_incident(
        &self,
        session_id: &str,
        incident: NewSupportIncident,
    ) -> AppResult<SupportIncident> {
        let record = SupportIncident {
            id: new_id(),
            session_id: session_id.to_string(),
            category: incident.category,
            description: incident.description,
            status: IncidentStatus::Open,
            created_at: now_timestamp(),
        };
        self.store
            .append_child(session_id, ChildRecord::Incident(record.clone()))
            .await?;
        warn!(session_id = %session_id, category = %record.category, "support incident reported");
        Ok(record)
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Remove expired completed sessions and abandoned unfinished ones.
    /// Returns how many sessions were removed.
    pub async fn cleanup_old_sessions(&self) -> AppResult<usize> {
        let now = Utc::now();
        let mut removed = 0;

        for candidate in self.store.list_all().await? {
            if !self.is_expired(&candidate, now) {
                continue;
            }

            // A request may have touched the session while we waited
            let guard = self.locks.lock(&candidate.id).await;
            let still_expired = match self.store.get(&candidate.id).await? {
                Some(current) => self.is_expired(&current, now),
                None => false,
            };
            if still_expired && self.store.delete(&candidate.id).await? {
                removed += 1;
                debug!(session_id = %candidate.id, state = %candidate.state, "expired session removed");
            } else if !still_expired {
                debug!(session_id = %candidate.id, "session refreshed during cleanup, kept");
            }
            drop(guard);
            self.locks.release_if_idle(&candidate.id);
        }

        if removed > 0 {
            info!(removed, "session cleanup finished");
        }
        Ok(removed)
    }

    pub async fn health(&self) -> HealthStatus {
        let (store_ok, active) = match self.store.list_active().await {
            Ok(sessions) => (true, sessions.len()),
            Err(e) => {
                warn!(error = %e, "session store health check failed");
                (false, 0)
            }
        };
        HealthStatus::new(
            self.generation.is_configured(),
            self.generation.is_reachable().await,
            store_ok,
            active,
        )
    }
}

/// Fold the introduction analysis into the profile and starting difficulty
fn apply_introduction(session: &mut Session, analysis: &IntroAnalysis) {
    let profile = &mut session.profile;
    profile.experience_level = ExperienceLevel::from_generated(&analysis.experience_level);
    profile.engagement_level = EngagementLevel::Medium;
    profile.mentioned_skills = analysis.mentioned_skills.clone();
    profile.confidence_indicators = analysis.confidence_indicators.clone();
    profile.areas_to_explore = analysis.areas_to_explore.clone();
    profile.personality_traits = analysis.personality_traits.clone();
    profile.primary_use_cases = analysis.primary_use_cases.clone();

    session.difficulty =
        Difficulty::parse(&analysis.suggested_starting_difficulty).unwrap_or(Difficulty::Medium);
}

/// Record what one evaluation says about the candidate
fn update_profile(session: &mut Session, evaluation: &Evaluation) {
    let profile = &mut session.profile;
    profile.strengths.extend(evaluation.strengths.iter().cloned());
    profile.weaknesses.extend(evaluation.improvements.iter().cloned());
    profile.response_patterns.push(ResponsePattern {
        question_index: session.current_question_index,
        accuracy: evaluation.technical_accuracy,
        depth: evaluation.depth,
        clarity: evaluation.clarity,
    });
    profile.engagement_level = evaluation.engagement_level;

    if evaluation.depth > FOLLOW_UP_DEPTH {
        session.flow.depth_questions_asked += 1;
    }
}

fn set_current_question(session: &mut Session, question: &GeneratedQuestion) {
    session.flow.current_question = Some(question.text.clone());
    session.flow.current_keywords = question.keywords.clone();
}
