//! Interview Prompts
//!
//! Fixed interviewer texts and builders for every generator prompt.

use serde_json::Value;

use excel_interview_core::Turn;
use excel_interview_llm::Message;

use crate::models::evaluation::Evaluation;
use crate::models::session::{CandidateProfile, Difficulty, SkillCategory};

/// System turn seeded into every conversation
pub const INTERVIEWER_SYSTEM: &str = "You are an expert Excel interviewer running a professional skills assessment. \
Be conversational, encouraging and adaptive. Build rapport, assess Excel skills through \
thoughtful questions, adapt to the candidate's answers, give constructive feedback and keep \
a professional yet friendly tone.";

/// Opening message returned by `start_interview`
pub const INTRO_MESSAGE: &str = "Hello! I'm your AI interviewer conducting your Excel skills assessment today.

Format: 10 questions over 25 minutes covering technical concepts, problem-solving, creativity, and domain expertise.

How it works: I'll adapt questions based on your responses and evaluate your technical knowledge, thought process, and practical application skills in real-time.

Tips for success:
• Be specific with examples
• Explain your reasoning
• Share alternative approaches when possible

Let's begin: What's your background with Excel, what do you primarily use it for, and how would you describe your current skill level?";

pub const INTRO_GUIDANCE: &str =
    "Take your time to share your Excel experience. I'm here to learn about YOU!";

pub const ASSESSMENT_GUIDANCE: &str =
    "I'm now asking questions tailored to your experience level. Feel free to elaborate!";

pub const FOLLOW_UP_GUIDANCE: &str = "Great response! I'd love to explore this further with you.";

pub const NEXT_QUESTION_GUIDANCE: &str = "Building on your previous response...";

const JSON_ONLY: &str = "Respond only with valid JSON.";

const NO_STOCK_OPENERS: &str =
    "Do not open with \"I appreciate\" or \"Thank you for\". Vary your wording.";

/// Turns as `{role, content}` objects, audit payloads dropped
pub fn turns_json(turns: &[Turn]) -> String {
    let stripped: Vec<Message> = turns.iter().map(Message::from).collect();
    serde_json::to_string_pretty(&stripped).unwrap_or_else(|_| "[]".to_string())
}

fn pretty<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

// ============================================================================
// Introduction
// ============================================================================

pub fn analysis_system() -> String {
    format!("You analyze candidate introductions for an Excel interview. {}", JSON_ONLY)
}

pub fn build_analysis_prompt(introduction: &str) -> String {
    format!(
        r#"Read the candidate's introduction and extract what it tells us about their Excel background.

Introduction: "{introduction}"

Return a JSON object:
{{
  "experience_level": "beginner|intermediate|advanced|expert",
  "primary_use_cases": ["..."],
  "mentioned_skills": ["..."],
  "confidence_indicators": ["..."],
  "areas_to_explore": ["..."],
  "suggested_starting_difficulty": "easy|medium|hard",
  "personality_traits": ["..."],
  "next_question_focus": "area to explore first"
}}"#
    )
}

pub fn transition_system() -> String {
    format!(
        "You are an enthusiastic Excel interviewer. Answer in two or three sentences. {}",
        NO_STOCK_OPENERS
    )
}

pub fn build_transition_prompt(analysis: &Value, introduction: &str) -> String {
    format!(
        r#"Candidate introduction: "{introduction}"

What we learned:
{analysis}

Write a short reply that warmly acknowledges this background, then asks one focused
technical Excel question suited to their level."#,
        analysis = pretty(analysis)
    )
}

// ============================================================================
// Evaluation
// ============================================================================

pub fn evaluation_system() -> String {
    format!("You are an expert Excel skills evaluator. {}", JSON_ONLY)
}

pub fn build_evaluation_prompt(
    history: &[Turn],
    profile: &CandidateProfile,
    question: &str,
    answer: &str,
) -> String {
    format!(
        r#"Evaluate the candidate's latest answer.

RECENT CONVERSATION:
{history}

CANDIDATE PROFILE:
{profile}

QUESTION: "{question}"
ANSWER: "{answer}"

Return a JSON object (all scores 0-100):
{{
  "technical_accuracy": {{"score": 0, "reasoning": "..."}},
  "depth_of_knowledge": {{"score": 0, "indicators": ["..."]}},
  "communication_clarity": {{"score": 0, "strengths": ["..."]}},
  "practical_understanding": {{"score": 0, "examples": ["..."]}},
  "overall_score": 0,
  "key_strengths": ["..."],
  "areas_for_improvement": ["..."],
  "follow_up_suggestions": ["topics worth a follow-up question"],
  "difficulty_adjustment": "increase|maintain|decrease",
  "engagement_level": "high|medium|low",
  "confidence_indicators": ["..."],
  "knowledge_gaps": ["..."],
  "next_focus_area": "...",
  "category": "skill area this answer demonstrates",
  "personalized_feedback": "specific, encouraging feedback"
}}"#,
        history = turns_json(history),
        profile = pretty(profile),
    )
}

// ============================================================================
// Follow-up and next question
// ============================================================================

pub fn follow_up_system() -> String {
    format!(
        "You are an Excel interviewer. Answer in one or two sentences. {}",
        NO_STOCK_OPENERS
    )
}

pub fn build_follow_up_prompt(history: &[Turn], evaluation: &Evaluation) -> String {
    format!(
        r#"The candidate just gave a strong answer.

RECENT CONVERSATION:
{history}

EVALUATION:
{evaluation}

Reply with a brief, enthusiastic remark and one follow-up question that digs deeper
into what they said. Suggested directions: {suggestions}"#,
        history = turns_json(history),
        evaluation = pretty(evaluation),
        suggestions = evaluation.follow_up_suggestions.join("; "),
    )
}

pub fn next_question_system() -> String {
    format!(
        "You are an Excel interviewer. Answer in two or three sentences. {}",
        NO_STOCK_OPENERS
    )
}

pub fn build_next_question_prompt(
    history: &[Turn],
    evaluation: &Evaluation,
    profile: &CandidateProfile,
    question_number: u32,
    total_questions: u32,
    difficulty: Difficulty,
    category: SkillCategory,
) -> String {
    format!(
        r#"Write the next interview question.

RECENT CONVERSATION:
{history}

LATEST EVALUATION:
{evaluation}

EXPERIENCE LEVEL: {level}
QUESTION {question_number} of {total_questions}
DIFFICULTY: {difficulty}
SKILL AREA: {category}

Open with a short encouraging comment on their last answer, then ask one focused
Excel question at this difficulty in this skill area."#,
        history = turns_json(history),
        evaluation = pretty(evaluation),
        level = profile.experience_level.as_str(),
        difficulty = difficulty.as_str(),
        category = category.label(),
    )
}

// ============================================================================
// Completion
// ============================================================================

pub fn closing_system() -> String {
    "You are concluding a successful interview warmly and professionally.".to_string()
}

pub fn build_closing_prompt(profile: &CandidateProfile, responses: usize) -> String {
    format!(
        r#"Write a warm, personal closing message for this interview.

CANDIDATE PROFILE:
{profile}

Answers given: {responses}
Engagement: {engagement}
Observed strengths: {strengths}

Thank them, mention specific strengths you observed and let them know their detailed
report is ready."#,
        profile = pretty(profile),
        engagement = profile.engagement_level.as_str(),
        strengths = profile.strengths.join(", "),
    )
}

pub fn report_system() -> String {
    format!(
        "You write Excel skills assessment reports. {}",
        JSON_ONLY
    )
}

pub fn build_report_prompt(
    profile: &CandidateProfile,
    responses: usize,
    average_score: f64,
    tier_label: &str,
) -> String {
    format!(
        r#"Write the narrative sections of an Excel skills assessment report.

CANDIDATE PROFILE:
{profile}

Answers evaluated: {responses}
Average score: {average_score:.1}
Proficiency: {tier_label}

Return a JSON object:
{{
  "engagement_analysis": {{
    "participation_level": "high|medium|low",
    "detail_in_responses": "comprehensive|adequate|basic",
    "enthusiasm_indicators": ["..."]
  }},
  "strengths": ["..."],
  "weaknesses": ["..."],
  "recommendations": ["..."],
  "learning_recommendations": ["..."],
  "final_feedback": "personal summary of their performance"
}}"#,
        profile = pretty(profile),
    )
}
