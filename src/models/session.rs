//! Session Models
//!
//! The session record, candidate profile and their enums.

use serde::{Deserialize, Serialize};

use excel_interview_core::ConversationContext;

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Init,
    Intro,
    Questioning,
    /// Reserved label; sessions are never stored in this state
    Evaluating,
    Completed,
}

impl SessionState {
    /// Get the string form for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Intro => "intro",
            Self::Questioning => "questioning",
            Self::Evaluating => "evaluating",
            Self::Completed => "completed",
        }
    }

    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "init" => Some(Self::Init),
            "intro" => Some(Self::Intro),
            "questioning" => Some(Self::Questioning),
            "evaluating" => Some(Self::Evaluating),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// States reported by `list_active`
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Init | Self::Questioning | Self::Evaluating)
    }

    /// All states that `list_active` matches, in storage form
    pub fn active_states() -> [&'static str; 3] {
        ["init", "questioning", "evaluating"]
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Question difficulty, ordered from easiest to hardest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Expert => "expert",
        }
    }

    /// Lenient parse; unknown labels yield `None`
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            "expert" => Some(Self::Expert),
            _ => None,
        }
    }

    /// One step harder, saturating at Expert
    pub fn harder(self) -> Self {
        match self {
            Self::Easy => Self::Medium,
            Self::Medium => Self::Hard,
            Self::Hard | Self::Expert => Self::Expert,
        }
    }

    /// One step easier, saturating at Easy
    pub fn easier(self) -> Self {
        match self {
            Self::Easy | Self::Medium => Self::Easy,
            Self::Hard => Self::Medium,
            Self::Expert => Self::Hard,
        }
    }

    pub fn adjust(self, adjustment: DifficultyAdjustment) -> Self {
        match adjustment {
            DifficultyAdjustment::Increase => self.harder(),
            DifficultyAdjustment::Maintain => self,
            DifficultyAdjustment::Decrease => self.easier(),
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Medium
    }
}

/// Directive produced by the evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyAdjustment {
    Increase,
    Maintain,
    Decrease,
}

impl DifficultyAdjustment {
    /// Lenient parse; anything unrecognised means Maintain
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "increase" => Self::Increase,
            "decrease" => Self::Decrease,
            _ => Self::Maintain,
        }
    }
}

impl Default for DifficultyAdjustment {
    fn default() -> Self {
        Self::Maintain
    }
}

/// Excel skill areas the interview rotates through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillCategory {
    #[serde(rename = "Formulas & Functions")]
    Formulas,
    #[serde(rename = "Pivot Tables")]
    PivotTables,
    #[serde(rename = "Data Analysis")]
    DataAnalysis,
    #[serde(rename = "VLOOKUP & Lookups")]
    Lookups,
    #[serde(rename = "Macros & VBA")]
    Macros,
    #[serde(rename = "Charts & Visualization")]
    Charts,
    #[serde(rename = "Power Query & Power Pivot")]
    PowerQuery,
    #[serde(rename = "Conditional Formatting")]
    ConditionalFormatting,
}

impl SkillCategory {
    pub const ALL: [SkillCategory; 8] = [
        Self::Formulas,
        Self::PivotTables,
        Self::DataAnalysis,
        Self::Lookups,
        Self::Macros,
        Self::Charts,
        Self::PowerQuery,
        Self::ConditionalFormatting,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Formulas => "Formulas & Functions",
            Self::PivotTables => "Pivot Tables",
            Self::DataAnalysis => "Data Analysis",
            Self::Lookups => "VLOOKUP & Lookups",
            Self::Macros => "Macros & VBA",
            Self::Charts => "Charts & Visualization",
            Self::PowerQuery => "Power Query & Power Pivot",
            Self::ConditionalFormatting => "Conditional Formatting",
        }
    }

    /// Category for a given question index (simple rotation)
    pub fn for_question(index: u32) -> Self {
        Self::ALL[index as usize % Self::ALL.len()]
    }
}

impl Default for SkillCategory {
    fn default() -> Self {
        Self::Formulas
    }
}

/// Inferred experience level of the candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Unknown,
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Expert => "expert",
        }
    }

    /// Parse a generated label. Anything outside the four known levels
    /// (including "beginner|intermediate" echoes of the prompt) becomes Intermediate.
    pub fn from_generated(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Self::Beginner,
            "intermediate" => Self::Intermediate,
            "advanced" => Self::Advanced,
            "expert" => Self::Expert,
            _ => Self::Intermediate,
        }
    }
}

impl Default for ExperienceLevel {
    fn default() -> Self {
        Self::Unknown
    }
}

/// Engagement tag reported by the evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngagementLevel {
    Neutral,
    Low,
    Medium,
    High,
}

impl EngagementLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Lenient parse; unknown tags mean Medium
    pub fn from_generated(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "low" => Self::Low,
            "high" => Self::High,
            _ => Self::Medium,
        }
    }
}

impl Default for EngagementLevel {
    fn default() -> Self {
        Self::Neutral
    }
}

/// Per-turn dimension scores kept on the profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsePattern {
    pub question_index: u32,
    pub accuracy: f64,
    pub depth: f64,
    pub clarity: f64,
}

/// Accumulating record of inferred candidate traits
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub experience_level: ExperienceLevel,
    /// Append-only, duplicates allowed
    #[serde(default)]
    pub strengths: Vec<String>,
    /// Append-only, duplicates allowed
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub response_patterns: Vec<ResponsePattern>,
    pub engagement_level: EngagementLevel,
    #[serde(default)]
    pub mentioned_skills: Vec<String>,
    #[serde(default)]
    pub confidence_indicators: Vec<String>,
    #[serde(default)]
    pub areas_to_explore: Vec<String>,
    #[serde(default)]
    pub personality_traits: Vec<String>,
    #[serde(default)]
    pub primary_use_cases: Vec<String>,
}

/// Interview progress flags and the question currently awaiting an answer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterviewFlow {
    pub introduction_complete: bool,
    pub technical_assessment_started: bool,
    /// Answers whose depth score cleared the follow-up threshold
    pub depth_questions_asked: u32,
    pub follow_up_questions: u32,
    /// Text of the question the candidate is answering
    #[serde(default)]
    pub current_question: Option<String>,
    /// Expected keywords for the keyword-overlap fallback score
    #[serde(default)]
    pub current_keywords: Vec<String>,
}

/// One end-to-end assessment attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub candidate_id: Option<String>,
    pub state: SessionState,
    pub skill_category: SkillCategory,
    pub difficulty: Difficulty,
    pub current_question_index: u32,
    pub total_questions: u32,
    /// Running sum of per-turn overall scores
    pub score: f64,
    pub conversation: ConversationContext,
    pub profile: CandidateProfile,
    pub flow: InterviewFlow,
    pub created_at: String,
    pub started_at: String,
    pub updated_at: String,
    pub completed_at: Option<String>,
}

impl Session {
    /// A fresh session in INIT with zeroed counters. The id is left empty for
    /// the store to assign.
    pub fn new(total_questions: u32, candidate_id: Option<String>, now: &str) -> Self {
        Self {
            id: String::new(),
            candidate_id,
            state: SessionState::Init,
            skill_category: SkillCategory::default(),
            difficulty: Difficulty::default(),
            current_question_index: 0,
            total_questions,
            score: 0.0,
            conversation: ConversationContext::new(),
            profile: CandidateProfile::default(),
            flow: InterviewFlow::default(),
            created_at: now.to_string(),
            started_at: now.to_string(),
            updated_at: now.to_string(),
            completed_at: None,
        }
    }
}

/// Candidate identity data supplied at session creation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCandidate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Any extra fields supplied by the caller
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Stored candidate record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: String,
}
