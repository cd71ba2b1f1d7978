//! SQLite Database
//!
//! Embedded database for persistent storage using rusqlite with r2d2 connection pooling.

use std::path::Path;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use tracing::debug;

use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::{database_path, ensure_dir};

/// Type alias for the connection pool
pub type DbPool = Pool<SqliteConnectionManager>;

/// Database service for managing SQLite operations
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Create a database from an existing connection pool. The schema is
    /// created if missing.
    pub fn from_pool(pool: DbPool) -> AppResult<Self> {
        let db = Self { pool };
        db.init_schema()?;
        Ok(db)
    }

    /// Create an in-memory database.
    ///
    /// Each in-memory SQLite connection is its own database, so the pool is
    /// capped at a single connection.
    pub fn new_in_memory() -> AppResult<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| AppError::database(format!("Failed to create connection pool: {}", e)))?;

        Self::from_pool(pool)
    }

    /// Open the database at the default location (~/.excel-interview/data.db)
    pub fn new() -> AppResult<Self> {
        Self::open(&database_path()?)
    }

    /// Open (or create) a database file with connection pooling
    pub fn open(db_path: &Path) -> AppResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            ensure_dir(parent)?;
        }

        debug!(path = %db_path.display(), "opening database");
        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder()
            .max_size(10)
            .build(manager)
            .map_err(|e| AppError::database(format!("Failed to create connection pool: {}", e)))?;

        Self::from_pool(pool)
    }

    /// Initialize the database schema
    fn init_schema(&self) -> AppResult<()> {
        let conn = self.get_connection()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS candidates (
                id TEXT PRIMARY KEY,
                name TEXT,
                email TEXT,
                metadata TEXT NOT NULL DEFAULT 'null',
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        // Nested session state (conversation, profile, flow) is stored as JSON
        conn.execute(
            "CREATE TABLE IF NOT EXISTS interview_sessions (
                id TEXT PRIMARY KEY,
                candidate_id TEXT,
                state TEXT NOT NULL,
                skill_category TEXT NOT NULL,
                difficulty TEXT NOT NULL,
                current_question_index INTEGER NOT NULL DEFAULT 0,
                total_questions INTEGER NOT NULL,
                score REAL NOT NULL DEFAULT 0,
                conversation TEXT NOT NULL,
                profile TEXT NOT NULL,
                flow TEXT NOT NULL,
                created_at TEXT NOT NULL,
                started_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                completed_at TEXT
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_interview_sessions_state
             ON interview_sessions(state)",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_interview_sessions_created
             ON interview_sessions(created_at)",
            [],
        )?;

        // Child collections keyed by session id
        conn.execute(
            "CREATE TABLE IF NOT EXISTS evaluation_records (
                id TEXT PRIMARY KEY,
                session_id TEXT NOT NULL,
                seq INTEGER NOT NULL,
                payload TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS pre_interview_checks (
                id TEXT PRIMARY KEY,
                session_id TEXT NOT NULL,
                seq INTEGER NOT NULL,
                payload TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS support_incidents (
                id TEXT PRIMARY KEY,
                session_id TEXT NOT NULL,
                seq INTEGER NOT NULL,
                payload TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        for table in ["evaluation_records", "pre_interview_checks", "support_incidents"] {
            conn.execute(
                &format!(
                    "CREATE INDEX IF NOT EXISTS idx_{table}_session ON {table}(session_id, seq)"
                ),
                [],
            )?;
        }

        // One report per session; later writes replace
        conn.execute(
            "CREATE TABLE IF NOT EXISTS interview_reports (
                session_id TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Get a connection from the pool
    pub fn get_connection(&self) -> AppResult<r2d2::PooledConnection<SqliteConnectionManager>> {
        self.pool
            .get()
            .map_err(|e| AppError::database(format!("Failed to get connection: {}", e)))
    }

    /// Get the connection pool
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Check if the database is healthy
    pub fn is_healthy(&self) -> bool {
        if let Ok(conn) = self.pool.get() {
            conn.query_row("SELECT 1", [], |_| Ok(())).is_ok()
        } else {
            false
        }
    }
}
