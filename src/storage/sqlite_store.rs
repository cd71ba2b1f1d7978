//! SQLite Session Store
//!
//! Durable [`SessionStore`] over the pooled [`Database`]. Nested session
//! state and child records are stored as JSON text columns.

use async_trait::async_trait;
use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension, Row};

use crate::models::report::Report;
use crate::models::session::{Candidate, Difficulty, NewCandidate, Session, SessionState};
use crate::utils::error::{AppError, AppResult};

use super::database::{Database, DbPool};
use super::store::{new_id, now_timestamp, ChildCollection, ChildRecord, SessionStore, SessionUpdate};

const SESSION_COLUMNS: &str = "id, candidate_id, state, skill_category, difficulty,
    current_question_index, total_questions, score, conversation, profile, flow,
    created_at, started_at, updated_at, completed_at";

/// Raw session row from the database
#[derive(Debug, Clone)]
struct SessionRow {
    id: String,
    candidate_id: Option<String>,
    state: String,
    skill_category: String,
    difficulty: String,
    current_question_index: u32,
    total_questions: u32,
    score: f64,
    conversation: String,
    profile: String,
    flow: String,
    created_at: String,
    started_at: String,
    updated_at: String,
    completed_at: Option<String>,
}

impl SessionRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            candidate_id: row.get(1)?,
            state: row.get(2)?,
            skill_category: row.get(3)?,
            difficulty: row.get(4)?,
            current_question_index: row.get(5)?,
            total_questions: row.get(6)?,
            score: row.get(7)?,
            conversation: row.get(8)?,
            profile: row.get(9)?,
            flow: row.get(10)?,
            created_at: row.get(11)?,
            started_at: row.get(12)?,
            updated_at: row.get(13)?,
            completed_at: row.get(14)?,
        })
    }

    fn into_session(self) -> AppResult<Session> {
        let state = SessionState::parse(&self.state)
            .ok_or_else(|| AppError::database(format!("Unknown session state: {}", self.state)))?;
        let difficulty = Difficulty::parse(&self.difficulty).ok_or_else(|| {
            AppError::database(format!("Unknown difficulty: {}", self.difficulty))
        })?;

        Ok(Session {
            id: self.id,
            candidate_id: self.candidate_id,
            state,
            skill_category: serde_json::from_str(&self.skill_category)?,
            difficulty,
            current_question_index: self.current_question_index,
            total_questions: self.total_questions,
            score: self.score,
            conversation: serde_json::from_str(&self.conversation)?,
            profile: serde_json::from_str(&self.profile)?,
            flow: serde_json::from_str(&self.flow)?,
            created_at: self.created_at,
            started_at: self.started_at,
            updated_at: self.updated_at,
            completed_at: self.completed_at,
        })
    }
}

fn child_table(collection: ChildCollection) -> &'static str {
    match collection {
        ChildCollection::Responses => "evaluation_records",
        ChildCollection::Checks => "pre_interview_checks",
        ChildCollection::Incidents => "support_incidents",
    }
}

fn get_conn(pool: &DbPool) -> AppResult<PooledConnection<SqliteConnectionManager>> {
    pool.get()
        .map_err(|e| AppError::database(format!("Failed to get connection: {}", e)))
}

fn write_session(
    conn: &rusqlite::Connection,
    session: &Session,
    insert: bool,
) -> AppResult<usize> {
    let skill_category = serde_json::to_string(&session.skill_category)?;
    let conversation = serde_json::to_string(&session.conversation)?;
    let profile = serde_json::to_string(&session.profile)?;
    let flow = serde_json::to_string(&session.flow)?;

    let sql = if insert {
        "INSERT INTO interview_sessions (id, candidate_id, state, skill_category, difficulty,
            current_question_index, total_questions, score, conversation, profile, flow,
            created_at, started_at, updated_at, completed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"
    } else {
        "UPDATE interview_sessions SET candidate_id = ?2, state = ?3, skill_category = ?4,
            difficulty = ?5, current_question_index = ?6, total_questions = ?7, score = ?8,
            conversation = ?9, profile = ?10, flow = ?11, created_at = ?12, started_at = ?13,
            updated_at = ?14, completed_at = ?15
         WHERE id = ?1"
    };

    let changed = conn.execute(
        sql,
        params![
            session.id,
            session.candidate_id,
            session.state.as_str(),
            skill_category,
            session.difficulty.as_str(),
            session.current_question_index,
            session.total_questions,
            session.score,
            conversation,
            profile,
            flow,
            session.created_at,
            session.started_at,
            session.updated_at,
            session.completed_at,
        ],
    )?;
    Ok(changed)
}

fn load_session(conn: &rusqlite::Connection, id: &str) -> AppResult<Option<Session>> {
    let result = conn.query_row(
        &format!("SELECT {} FROM interview_sessions WHERE id = ?1", SESSION_COLUMNS),
        params![id],
        SessionRow::from_row,
    );

    match result {
        Ok(row) => Ok(Some(row.into_session()?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(AppError::database(e.to_string())),
    }
}

fn query_sessions(conn: &rusqlite::Connection, where_clause: &str) -> AppResult<Vec<Session>> {
    let sql = format!(
        "SELECT {} FROM interview_sessions {} ORDER BY created_at ASC, rowid ASC",
        SESSION_COLUMNS, where_clause
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows: Vec<SessionRow> = stmt
        .query_map([], SessionRow::from_row)?
        .filter_map(|r| r.ok())
        .collect();
    rows.into_iter().map(SessionRow::into_session).collect()
}

/// Session store over an r2d2 pool of rusqlite connections
#[derive(Clone)]
pub struct SqliteSessionStore {
    pool: DbPool,
}

impl SqliteSessionStore {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    /// Run blocking database work off the async executor
    async fn run<F, T>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> AppResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = get_conn(&pool)?;
            f(&conn)
        })
        .await
        .map_err(|e| AppError::database(format!("Task join error: {}", e)))?
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn create(&self, mut session: Session) -> AppResult<Session> {
        if session.id.is_empty() {
            session.id = new_id();
        }
        self.run(move |conn| {
            write_session(conn, &session, true)?;
            Ok(session)
        })
        .await
    }

    async fn get(&self, id: &str) -> AppResult<Option<Session>> {
        let id = id.to_string();
        self.run(move |conn| load_session(conn, &id)).await
    }

    async fn update(&self, id: &str, update: SessionUpdate) -> AppResult<bool> {
        let id = id.to_string();
        self.run(move |conn| {
            let Some(mut session) = load_session(conn, &id)? else {
                return Ok(false);
            };
            update.apply_to(&mut session, &now_timestamp());
            Ok(write_session(conn, &session, false)? > 0)
        })
        .await
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let id = id.to_string();
        self.run(move |conn| {
            for collection in [
                ChildCollection::Responses,
                ChildCollection::Checks,
                ChildCollection::Incidents,
            ] {
                conn.execute(
                    &format!("DELETE FROM {} WHERE session_id = ?1", child_table(collection)),
                    params![id],
                )?;
            }
            conn.execute(
                "DELETE FROM interview_reports WHERE session_id = ?1",
                params![id],
            )?;
            let removed = conn.execute("DELETE FROM interview_sessions WHERE id = ?1", params![id])?;
            Ok(removed > 0)
        })
        .await
    }

    async fn list_active(&self) -> AppResult<Vec<Session>> {
        let [a, b, c] = SessionState::active_states();
        let clause = format!("WHERE state IN ('{}', '{}', '{}')", a, b, c);
        self.run(move |conn| query_sessions(conn, &clause)).await
    }

    async fn list_all(&self) -> AppResult<Vec<Session>> {
        self.run(|conn| query_sessions(conn, "")).await
    }

    async fn latest(&self) -> AppResult<Option<Session>> {
        self.run(|conn| {
            let id: Option<String> = conn
                .query_row(
                    "SELECT id FROM interview_sessions ORDER BY created_at DESC, rowid DESC LIMIT 1",
                    [],
                    |row| row.get(0),
                )
                .optional()?;
            match id {
                Some(id) => load_session(conn, &id),
                None => Ok(None),
            }
        })
        .await
    }

    async fn append_child(&self, session_id: &str, record: ChildRecord) -> AppResult<()> {
        let session_id = session_id.to_string();
        self.run(move |conn| {
            let exists: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM interview_sessions WHERE id = ?1",
                    params![session_id],
                    |row| row.get(0),
                )
                .optional()?;
            if exists.is_none() {
                return Err(AppError::not_found(format!("Session not found: {}", session_id)));
            }

            let table = child_table(record.collection());
            let seq: i64 = conn.query_row(
                &format!(
                    "SELECT COALESCE(MAX(seq), -1) + 1 FROM {} WHERE session_id = ?1",
                    table
                ),
                params![session_id],
                |row| row.get(0),
            )?;
            let payload = serde_json::to_string(&record)?;
            conn.execute(
                &format!(
                    "INSERT INTO {} (id, session_id, seq, payload, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    table
                ),
                params![record.id(), session_id, seq, payload, record.created_at()],
            )?;
            Ok(())
        })
        .await
    }

    async fn list_children(
        &self,
        collection: ChildCollection,
        session_id: &str,
    ) -> AppResult<Vec<ChildRecord>> {
        let session_id = session_id.to_string();
        self.run(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT payload FROM {} WHERE session_id = ?1 ORDER BY seq ASC",
                child_table(collection)
            ))?;
            let payloads: Vec<String> = stmt
                .query_map(params![session_id], |row| row.get(0))?
                .filter_map(|r| r.ok())
                .collect();
            payloads
                .iter()
                .map(|p| serde_json::from_str::<ChildRecord>(p).map_err(AppError::from))
                .collect()
        })
        .await
    }

    async fn save_report(&self, report: Report) -> AppResult<()> {
        self.run(move |conn| {
            let payload = serde_json::to_string(&report)?;
            conn.execute(
                "INSERT INTO interview_reports (session_id, payload, created_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(session_id) DO UPDATE SET payload = ?2, created_at = ?3",
                params![report.session_id, payload, report.created_at],
            )?;
            Ok(())
        })
        .await
    }

    async fn get_report(&self, session_id: &str) -> AppResult<Option<Report>> {
        let session_id = session_id.to_string();
        self.run(move |conn| {
            let payload: Option<String> = conn
                .query_row(
                    "SELECT payload FROM interview_reports WHERE session_id = ?1",
                    params![session_id],
                    |row| row.get(0),
                )
                .optional()?;
            match payload {
                Some(p) => Ok(Some(serde_json::from_str(&p)?)),
                None => Ok(None),
            }
        })
        .await
    }

    async fn create_candidate(&self, candidate: NewCandidate) -> AppResult<Candidate> {
        let record = Candidate {
            id: new_id(),
            name: candidate.name,
            email: candidate.email,
            metadata: candidate.metadata,
            created_at: now_timestamp(),
        };
        self.run(move |conn| {
            let metadata = serde_json::to_string(&record.metadata)?;
            conn.execute(
                "INSERT INTO candidates (id, name, email, metadata, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![record.id, record.name, record.email, metadata, record.created_at],
            )?;
            Ok(record)
        })
        .await
    }

    async fn get_candidate(&self, id: &str) -> AppResult<Option<Candidate>> {
        let id = id.to_string();
        self.run(move |conn| {
            let result = conn.query_row(
                "SELECT id, name, email, metadata, created_at FROM candidates WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            );

            match result {
                Ok((id, name, email, metadata, created_at)) => Ok(Some(Candidate {
                    id,
                    name,
                    email,
                    metadata: serde_json::from_str(&metadata)?,
                    created_at,
                })),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(AppError::database(e.to_string())),
            }
        })
        .await
    }
}
