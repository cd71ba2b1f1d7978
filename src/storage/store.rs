//! Session Store Contract
//!
//! Key-value persistence the interview engine depends on. Any backing store
//! that satisfies [`SessionStore`] can drive an interview.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use excel_interview_core::ConversationContext;

use crate::models::evaluation::EvaluationRecord;
use crate::models::records::{PreInterviewCheck, SupportIncident};
use crate::models::report::Report;
use crate::models::session::{
    Candidate, CandidateProfile, Difficulty, InterviewFlow, NewCandidate, Session, SessionState,
    SkillCategory,
};
use crate::utils::error::AppResult;

/// Child collections hanging off a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildCollection {
    Responses,
    Checks,
    Incidents,
}

impl ChildCollection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Responses => "responses",
            Self::Checks => "checks",
            Self::Incidents => "incidents",
        }
    }
}

/// A record appended to one of a session's child collections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "collection", content = "record", rename_all = "snake_case")]
pub enum ChildRecord {
    Response(EvaluationRecord),
    Check(PreInterviewCheck),
    Incident(SupportIncident),
}

impl ChildRecord {
    pub fn collection(&self) -> ChildCollection {
        match self {
            Self::Response(_) => ChildCollection::Responses,
            Self::Check(_) => ChildCollection::Checks,
            Self::Incident(_) => ChildCollection::Incidents,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Response(r) => &r.id,
            Self::Check(c) => &c.id,
            Self::Incident(i) => &i.id,
        }
    }

    pub fn created_at(&self) -> &str {
        match self {
            Self::Response(r) => &r.created_at,
            Self::Check(c) => &c.created_at,
            Self::Incident(i) => &i.created_at,
        }
    }
}

/// Field-wise partial update of a session. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct SessionUpdate {
    pub state: Option<SessionState>,
    pub skill_category: Option<SkillCategory>,
    pub difficulty: Option<Difficulty>,
    pub current_question_index: Option<u32>,
    pub score: Option<f64>,
    pub conversation: Option<ConversationContext>,
    pub profile: Option<CandidateProfile>,
    pub flow: Option<InterviewFlow>,
    pub completed_at: Option<String>,
}

impl SessionUpdate {
    /// Update carrying every mutable field of `session`
    pub fn from_session(session: &Session) -> Self {
        Self {
            state: Some(session.state),
            skill_category: Some(session.skill_category),
            difficulty: Some(session.difficulty),
            current_question_index: Some(session.current_question_index),
            score: Some(session.score),
            conversation: Some(session.conversation.clone()),
            profile: Some(session.profile.clone()),
            flow: Some(session.flow.clone()),
            completed_at: session.completed_at.clone(),
        }
    }

    /// Apply the update to a session. `completed_at` is only ever set once.
    pub fn apply_to(self, session: &mut Session, now: &str) {
        if let Some(state) = self.state {
            session.state = state;
        }
        if let Some(category) = self.skill_category {
            session.skill_category = category;
        }
        if let Some(difficulty) = self.difficulty {
            session.difficulty = difficulty;
        }
        if let Some(index) = self.current_question_index {
            session.current_question_index = index;
        }
        if let Some(score) = self.score {
            session.score = score;
        }
        if let Some(conversation) = self.conversation {
            session.conversation = conversation;
        }
        if let Some(profile) = self.profile {
            session.profile = profile;
        }
        if let Some(flow) = self.flow {
            session.flow = flow;
        }
        if session.completed_at.is_none() {
            if let Some(completed_at) = self.completed_at {
                session.completed_at = Some(completed_at);
            }
        }
        session.updated_at = now.to_string();
    }
}

/// Persistence contract consumed by the interview engine.
///
/// Implementations do not serialize concurrent read-modify-write cycles on
/// the same session; callers hold a per-session lock for that.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Short name for logs and health output
    fn name(&self) -> &'static str;

    /// Persist a new session. An empty id is replaced by a generated one.
    async fn create(&self, session: Session) -> AppResult<Session>;

    async fn get(&self, id: &str) -> AppResult<Option<Session>>;

    /// Returns false when no session has the id
    async fn update(&self, id: &str, update: SessionUpdate) -> AppResult<bool>;

    /// Remove a session with its child records and report
    async fn delete(&self, id: &str) -> AppResult<bool>;

    /// Sessions in init, questioning or evaluating, oldest first
    async fn list_active(&self) -> AppResult<Vec<Session>>;

    /// Every session, oldest first
    async fn list_all(&self) -> AppResult<Vec<Session>>;

    /// Most recently created session
    async fn latest(&self) -> AppResult<Option<Session>>;

    /// Append a record to a child collection of the session.
    /// Fails with NotFound when the session does not exist.
    async fn append_child(&self, session_id: &str, record: ChildRecord) -> AppResult<()>;

    /// Records of one collection in insertion order
    async fn list_children(
        &self,
        collection: ChildCollection,
        session_id: &str,
    ) -> AppResult<Vec<ChildRecord>>;

    /// Store the session's report, replacing any earlier one
    async fn save_report(&self, report: Report) -> AppResult<()>;

    async fn get_report(&self, session_id: &str) -> AppResult<Option<Report>>;

    async fn create_candidate(&self, candidate: NewCandidate) -> AppResult<Candidate>;

    async fn get_candidate(&self, id: &str) -> AppResult<Option<Candidate>>;

    /// Evaluation records of a session in creation order
    async fn list_responses(&self, session_id: &str) -> AppResult<Vec<EvaluationRecord>> {
        let records = self
            .list_children(ChildCollection::Responses, session_id)
            .await?;
        Ok(records
            .into_iter()
            .filter_map(|r| match r {
                ChildRecord::Response(record) => Some(record),
                _ => None,
            })
            .collect())
    }
}

/// Current time as an RFC 3339 string
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Fresh record id
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
