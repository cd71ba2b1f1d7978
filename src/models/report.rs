//! Report Models
//!
//! Final assessment report and the proficiency tiers it is labelled with.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::session::CandidateProfile;

/// Score band of an assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProficiencyTier {
    Expert,
    Advanced,
    Intermediate,
    Beginner,
    /// No answers were evaluated
    Unknown,
}

impl ProficiencyTier {
    /// Tier for an average overall score
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::Expert
        } else if score >= 75.0 {
            Self::Advanced
        } else if score >= 60.0 {
            Self::Intermediate
        } else {
            Self::Beginner
        }
    }

    pub fn technical_proficiency(&self) -> &'static str {
        match self {
            Self::Expert => "Expert",
            Self::Advanced => "Advanced",
            Self::Intermediate => "Intermediate",
            Self::Beginner => "Beginner",
            Self::Unknown => "Unknown",
        }
    }

    pub fn communication_skills(&self) -> &'static str {
        match self {
            Self::Expert => "Excellent",
            Self::Advanced => "Good",
            Self::Intermediate => "Adequate",
            Self::Beginner => "Needs Improvement",
            Self::Unknown => "Unknown",
        }
    }

    pub fn problem_solving(&self) -> &'static str {
        match self {
            Self::Expert => "Advanced",
            Self::Advanced => "Good",
            Self::Intermediate => "Developing",
            Self::Beginner => "Basic",
            Self::Unknown => "Unknown",
        }
    }
}

/// How the candidate engaged over the interview
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngagementAnalysis {
    pub participation_level: String,
    pub detail_in_responses: String,
    #[serde(default)]
    pub enthusiasm_indicators: Vec<String>,
}

/// Final aggregated report, one per completed session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub session_id: String,
    /// Average of per-answer overall scores, rounded to 2 decimals
    pub overall_score: f64,
    pub tier: ProficiencyTier,
    pub technical_proficiency: String,
    pub communication_skills: String,
    pub problem_solving: String,
    /// Category label to average score
    pub skill_breakdown: BTreeMap<String, f64>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub learning_recommendations: Vec<String>,
    pub engagement_analysis: EngagementAnalysis,
    pub final_feedback: String,
    /// Closing message shown to the candidate
    pub closing_message: String,
    pub questions_answered: u32,
    pub interview_duration_minutes: i64,
    pub conversation_insights: CandidateProfile,
    /// Whether narrative fields came from the generator
    pub generated_narrative: bool,
    pub created_at: String,
}
