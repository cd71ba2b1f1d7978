//! Auxiliary Session Records
//!
//! Pre-interview technical checks and support incidents, stored as child
//! collections of a session.

use serde::{Deserialize, Serialize};

/// Result of a pre-interview environment check (microphone, browser, network)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreInterviewCheck {
    pub id: String,
    pub session_id: String,
    pub check_type: String,
    pub passed: bool,
    #[serde(default)]
    pub details: serde_json::Value,
    pub created_at: String,
}

/// Caller-supplied check data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPreInterviewCheck {
    pub check_type: String,
    pub passed: bool,
    #[serde(default)]
    pub details: serde_json::Value,
}

/// Support incident lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    Open,
    Resolved,
}

/// A problem reported during a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportIncident {
    pub id: String,
    pub session_id: String,
    pub category: String,
    pub description: String,
    pub status: IncidentStatus,
    pub created_at: String,
}

/// Caller-supplied incident data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSupportIncident {
    pub category: String,
    pub description: String,
}
