//! In-Memory Session Store
//!
//! Process-local store used by tests and ephemeral runs.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::report::Report;
use crate::models::session::{Candidate, NewCandidate, Session};
use crate::utils::error::{AppError, AppResult};

use super::store::{new_id, now_timestamp, ChildCollection, ChildRecord, SessionStore, SessionUpdate};

#[derive(Default)]
struct MemoryState {
    /// Session with its insertion sequence, used to break created_at ties
    sessions: HashMap<String, (u64, Session)>,
    children: HashMap<(ChildCollection, String), Vec<ChildRecord>>,
    reports: HashMap<String, Report>,
    candidates: HashMap<String, Candidate>,
    next_seq: u64,
}

impl MemoryState {
    fn sorted_sessions<'a>(&'a self, filter: impl Fn(&Session) -> bool) -> Vec<Session> {
        let mut entries: Vec<&'a (u64, Session)> =
            self.sessions.values().filter(|(_, s)| filter(s)).collect();
        entries.sort_by(|a, b| a.1.created_at.cmp(&b.1.created_at).then(a.0.cmp(&b.0)));
        entries.into_iter().map(|(_, s)| s.clone()).collect()
    }
}

/// Session store backed by maps behind a tokio `RwLock`
#[derive(Default)]
pub struct InMemorySessionStore {
    state: RwLock<MemoryState>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, mut session: Session) -> AppResult<Session> {
        if session.id.is_empty() {
            session.id = new_id();
        }
        let mut state = self.state.write().await;
        if state.sessions.contains_key(&session.id) {
            return Err(AppError::validation(format!(
                "Session already exists: {}",
                session.id
            )));
        }
        let seq = state.next_seq;
        state.next_seq += 1;
        state
            .sessions
            .insert(session.id.clone(), (seq, session.clone()));
        Ok(session)
    }

    async fn get(&self, id: &str) -> AppResult<Option<Session>> {
        let state = self.state.read().await;
        Ok(state.sessions.get(id).map(|(_, s)| s.clone()))
    }

    async fn update(&self, id: &str, update: SessionUpdate) -> AppResult<bool> {
        let mut state = self.state.write().await;
        match state.sessions.get_mut(id) {
            Some((_, session)) => {
                update.apply_to(session, &now_timestamp());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let removed = state.sessions.remove(id).is_some();
        state.children.retain(|(_, session_id), _| session_id != id);
        state.reports.remove(id);
        Ok(removed)
    }

    async fn list_active(&self) -> AppResult<Vec<Session>> {
        let state = self.state.read().await;
        Ok(state.sorted_sessions(|s| s.state.is_active()))
    }

    async fn list_all(&self) -> AppResult<Vec<Session>> {
        let state = self.state.read().await;
        Ok(state.sorted_sessions(|_| true))
    }

    async fn latest(&self) -> AppResult<Option<Session>> {
        let state = self.state.read().await;
        Ok(state.sorted_sessions(|_| true).pop())
    }

    async fn append_child(&self, session_id: &str, record: ChildRecord) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !state.sessions.contains_key(session_id) {
            return Err(AppError::not_found(format!("Session not found: {}", session_id)));
        }
        state
            .children
            .entry((record.collection(), session_id.to_string()))
            .or_default()
            .push(record);
        Ok(())
    }

    async fn list_children(
        &self,
        collection: ChildCollection,
        session_id: &str,
    ) -> AppResult<Vec<ChildRecord>> {
        let state = self.state.read().await;
        Ok(state
            .children
            .get(&(collection, session_id.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn save_report(&self, report: Report) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.reports.insert(report.session_id.clone(), report);
        Ok(())
    }

    async fn get_report(&self, session_id: &str) -> AppResult<Option<Report>> {
        let state = self.state.read().await;
        Ok(state.reports.get(session_id).cloned())
    }

    async fn create_candidate(&self, candidate: NewCandidate) -> AppResult<Candidate> {
        let record = Candidate {
            id: new_id(),
            name: candidate.name,
            email: candidate.email,
            metadata: candidate.metadata,
            created_at: now_timestamp(),
        };
        let mut state = self.state.write().await;
        state.candidates.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn get_candidate(&self, id: &str) -> AppResult<Option<Candidate>> {
        let state = self.state.read().await;
        Ok(state.candidates.get(id).cloned())
    }
}
