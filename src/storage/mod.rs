//! Storage Layer
//!
//! Handles all data persistence: the session store contract with its
//! in-memory and SQLite implementations, and the JSON config.

pub mod config;
pub mod database;
pub mod memory_store;
pub mod sqlite_store;
pub mod store;

pub use config::*;
pub use database::*;
pub use memory_store::InMemorySessionStore;
pub use sqlite_store::SqliteSessionStore;
pub use store::*;
