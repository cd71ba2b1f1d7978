//! Report Synthesis
//!
//! Builds the final report of a completed session. Scores, tiers and the
//! skill breakdown are always computed here from the evaluation records;
//! the generator only contributes narrative text.

use std::collections::BTreeMap;

use chrono::DateTime;
use tracing::{info, warn};

use crate::models::evaluation::EvaluationRecord;
use crate::models::report::{EngagementAnalysis, ProficiencyTier, Report};
use crate::models::session::{EngagementLevel, Session};

use super::generation::{GenerationClient, REPORT_NARRATIVE};
use super::prompts;
use super::schemas::ReportNarrative;

const STRONG_SCORE: f64 = 80.0;
const WEAK_SCORE: f64 = 60.0;

/// Score aggregates over a session's evaluation records
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSummary {
    pub average: f64,
    pub tier: ProficiencyTier,
    pub breakdown: BTreeMap<String, f64>,
    /// Share of answers scoring at least 80
    pub strong_ratio: f64,
    /// Share of answers scoring below 60
    pub weak_ratio: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Aggregate the records. `None` when nothing was evaluated.
pub fn summarize(records: &[EvaluationRecord]) -> Option<ScoreSummary> {
    if records.is_empty() {
        return None;
    }

    let count = records.len() as f64;
    let average = records.iter().map(|r| r.score).sum::<f64>() / count;

    let mut grouped: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for record in records {
        let entry = grouped.entry(record.category().to_string()).or_default();
        entry.0 += record.score;
        entry.1 += 1;
    }
    let breakdown = grouped
        .into_iter()
        .map(|(category, (sum, n))| (category, round2(sum / n as f64)))
        .collect();

    let strong = records.iter().filter(|r| r.score >= STRONG_SCORE).count() as f64;
    let weak = records.iter().filter(|r| r.score < WEAK_SCORE).count() as f64;

    Some(ScoreSummary {
        average: round2(average),
        tier: ProficiencyTier::from_score(average),
        breakdown,
        strong_ratio: strong / count,
        weak_ratio: weak / count,
    })
}

/// Fixed recommendations for a tier
pub fn tier_recommendations(tier: ProficiencyTier) -> Vec<String> {
    let items: &[&str] = match tier {
        ProficiencyTier::Beginner => &[
            "Start with Excel basics and core functions",
            "Practice with sample datasets",
            "Take introductory Excel courses",
        ],
        ProficiencyTier::Intermediate => &[
            "Focus on advanced functions and data analysis",
            "Learn pivot tables and charts",
            "Practice with real-world scenarios",
        ],
        ProficiencyTier::Advanced | ProficiencyTier::Expert => &[
            "Explore advanced Excel features like Power Query",
            "Consider Excel certification",
            "Mentor others in Excel skills",
        ],
        ProficiencyTier::Unknown => &["Complete the full assessment"],
    };
    items.iter().map(|s| s.to_string()).collect()
}

/// Whole minutes between two RFC 3339 timestamps, 0 if either is unreadable
fn duration_minutes(started_at: &str, completed_at: Option<&str>) -> i64 {
    let Some(completed_at) = completed_at else {
        return 0;
    };
    match (
        DateTime::parse_from_rfc3339(started_at),
        DateTime::parse_from_rfc3339(completed_at),
    ) {
        (Ok(start), Ok(end)) => (end - start).num_minutes().max(0),
        _ => 0,
    }
}

fn fallback_engagement(level: EngagementLevel) -> EngagementAnalysis {
    let participation = match level {
        EngagementLevel::Neutral => EngagementLevel::Medium,
        other => other,
    };
    EngagementAnalysis {
        participation_level: participation.as_str().to_string(),
        detail_in_responses: "adequate".to_string(),
        enthusiasm_indicators: Vec::new(),
    }
}

/// Deterministic report from the records alone
pub fn fallback_report(
    session: &Session,
    records: &[EvaluationRecord],
    closing_message: &str,
    now: &str,
) -> Report {
    let duration = duration_minutes(&session.started_at, session.completed_at.as_deref());

    let Some(summary) = summarize(records) else {
        let tier = ProficiencyTier::Unknown;
        return Report {
            session_id: session.id.clone(),
            overall_score: 0.0,
            tier,
            technical_proficiency: tier.technical_proficiency().to_string(),
            communication_skills: tier.communication_skills().to_string(),
            problem_solving: tier.problem_solving().to_string(),
            skill_breakdown: BTreeMap::new(),
            strengths: vec!["No responses recorded".to_string()],
            weaknesses: vec!["Assessment not completed".to_string()],
            recommendations: tier_recommendations(tier),
            learning_recommendations: Vec::new(),
            engagement_analysis: fallback_engagement(session.profile.engagement_level),
            final_feedback: "Assessment was not completed.".to_string(),
            closing_message: closing_message.to_string(),
            questions_answered: 0,
            interview_duration_minutes: duration,
            conversation_insights: session.profile.clone(),
            generated_narrative: false,
            created_at: now.to_string(),
        };
    };

    let mut strengths = Vec::new();
    if summary.strong_ratio > 0.7 {
        strengths.push("Strong technical knowledge demonstrated".to_string());
    }
    if strengths.is_empty() {
        strengths = vec![
            "Completed assessment".to_string(),
            "Engaged with questions".to_string(),
        ];
    }

    let mut weaknesses = Vec::new();
    if summary.weak_ratio > 0.3 {
        weaknesses.push("Inconsistent performance across questions".to_string());
    }
    if weaknesses.is_empty() {
        weaknesses.push("Could benefit from more practice".to_string());
    }

    let tier = summary.tier;
    Report {
        session_id: session.id.clone(),
        overall_score: summary.average,
        tier,
        technical_proficiency: tier.technical_proficiency().to_string(),
        communication_skills: tier.communication_skills().to_string(),
        problem_solving: tier.problem_solving().to_string(),
        skill_breakdown: summary.breakdown,
        strengths,
        weaknesses,
        recommendations: tier_recommendations(tier),
        learning_recommendations: Vec::new(),
        engagement_analysis: fallback_engagement(session.profile.engagement_level),
        final_feedback: format!(
            "Overall performance shows {} level Excel skills with room for growth in specific areas.",
            tier.technical_proficiency().to_lowercase()
        ),
        closing_message: closing_message.to_string(),
        questions_answered: records.len() as u32,
        interview_duration_minutes: duration,
        conversation_insights: session.profile.clone(),
        generated_narrative: false,
        created_at: now.to_string(),
    }
}

/// Overlay generated narrative on a deterministic report. Empty sections
/// keep the deterministic text.
pub fn apply_narrative(report: &mut Report, narrative: ReportNarrative) {
    if !narrative.strengths.is_empty() {
        report.strengths = narrative.strengths;
    }
    if !narrative.weaknesses.is_empty() {
        report.weaknesses = narrative.weaknesses;
    }
    if !narrative.recommendations.is_empty() {
        report.recommendations = narrative.recommendations;
    }
    if !narrative.learning_recommendations.is_empty() {
        report.learning_recommendations = narrative.learning_recommendations;
    }
    if !narrative.final_feedback.trim().is_empty() {
        report.final_feedback = narrative.final_feedback;
    }

    let engagement = narrative.engagement_analysis;
    if !engagement.participation_level.trim().is_empty() {
        report.engagement_analysis.participation_level = engagement.participation_level;
    }
    if !engagement.detail_in_responses.trim().is_empty() {
        report.engagement_analysis.detail_in_responses = engagement.detail_in_responses;
    }
    if !engagement.enthusiasm_indicators.is_empty() {
        report.engagement_analysis.enthusiasm_indicators = engagement.enthusiasm_indicators;
    }

    report.generated_narrative = true;
}

/// Builds reports, asking the generator for narrative when it can
pub struct ReportBuilder<'a> {
    client: &'a GenerationClient,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(client: &'a GenerationClient) -> Self {
        Self { client }
    }

    pub async fn build(
        &self,
        session: &Session,
        records: &[EvaluationRecord],
        closing_message: &str,
        now: &str,
    ) -> Report {
        let mut report = fallback_report(session, records, closing_message, now);
        if records.is_empty() {
            return report;
        }

        let prompt = prompts::build_report_prompt(
            &session.profile,
            records.len(),
            report.overall_score,
            report.technical_proficiency.as_str(),
        );
        match self
            .client
            .complete_json::<ReportNarrative>(&prompts::report_system(), &prompt, REPORT_NARRATIVE)
            .await
        {
            Ok(narrative) => apply_narrative(&mut report, narrative),
            Err(e) => warn!(
                session_id = %session.id,
                error = %e,
                "report narrative unavailable, using templates"
            ),
        }

        info!(
            session_id = %session.id,
            overall_score = report.overall_score,
            tier = report.technical_proficiency.as_str(),
            generated_narrative = report.generated_narrative,
            "report built"
        );
        report
    }
}
