//! Interview Flow Integration Tests
//!
//! Drives the engine end to end with scripted gateways: introduction,
//! adaptive questioning, follow-ups, completion. The completion path runs
//! over both session stores.

use std::sync::Arc;

use excel_interview::models::response::{InterviewStage, ReportLookup};
use excel_interview::models::session::{
    Difficulty, EngagementLevel, ExperienceLevel, SessionState,
};
use excel_interview::services::interview::fallback::{
    COMPLETED_ACKNOWLEDGEMENT, INTRO_FALLBACK_MESSAGE,
};
use excel_interview::services::interview::prompts::{INTRO_GUIDANCE, INTRO_MESSAGE};
use excel_interview::models::report::ProficiencyTier;
use excel_interview::AppError;
use excel_interview_core::{Role, TurnAudit};

use crate::support::{
    engine_on, engine_with, evaluation_json, intro_analysis_json, stores, text, unavailable,
    InterviewerProvider, MockLlmProvider, INTRODUCTION,
};

// ============================================================================
// Start and introduction
// ============================================================================

#[tokio::test]
async fn test_start_interview_returns_intro() {
    let engine = engine_with(Arc::new(InterviewerProvider::new(50.0, 70.0)), 5);
    let id = engine.create_session(None).await.unwrap();

    let reply = engine.start_interview(&id).await.unwrap();
    assert_eq!(reply.message, INTRO_MESSAGE);
    assert_eq!(reply.state, SessionState::Intro);
    assert_eq!(reply.stage, InterviewStage::Introduction);
    assert_eq!(reply.guidance.as_deref(), Some(INTRO_GUIDANCE));

    let session = engine.store().get(&id).await.unwrap().unwrap();
    assert_eq!(session.state, SessionState::Intro);
    assert_eq!(session.conversation.turns()[0].role, Role::System);
}

#[tokio::test]
async fn test_start_twice_is_invalid_state() {
    let engine = engine_with(Arc::new(InterviewerProvider::new(50.0, 70.0)), 5);
    let id = engine.create_session(None).await.unwrap();
    engine.start_interview(&id).await.unwrap();

    let err = engine.start_interview(&id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
}

#[tokio::test]
async fn test_response_before_start_is_invalid_state() {
    let engine = engine_with(Arc::new(InterviewerProvider::new(50.0, 70.0)), 5);
    let id = engine.create_session(None).await.unwrap();

    let err = engine.process_response(&id, "hello").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    let session = engine.store().get(&id).await.unwrap().unwrap();
    assert_eq!(session.state, SessionState::Init);
    assert!(session.conversation.is_empty());
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let engine = engine_with(Arc::new(InterviewerProvider::new(50.0, 70.0)), 5);

    assert!(engine.start_interview("missing").await.unwrap_err().is_not_found());
    assert!(engine
        .process_response("missing", "hi")
        .await
        .unwrap_err()
        .is_not_found());
    assert!(engine.get_status("missing").await.unwrap_err().is_not_found());
    assert!(engine.get_report("missing").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_rich_introduction_moves_to_questioning() {
    let engine = engine_with(Arc::new(InterviewerProvider::new(50.0, 70.0)), 5);
    let id = engine.create_session(None).await.unwrap();
    engine.start_interview(&id).await.unwrap();

    let reply = engine.process_response(&id, INTRODUCTION).await.unwrap();
    assert_eq!(reply.state, SessionState::Questioning);
    assert_eq!(reply.stage, InterviewStage::TechnicalAssessment);
    assert_eq!(reply.question_number, Some(1));
    assert_eq!(reply.total_questions, Some(5));

    let insights = reply.candidate_insights.unwrap();
    assert_eq!(insights.experience_level, "advanced");
    assert_eq!(insights.focus_areas, vec!["VBA", "Power Pivot", "dynamic arrays"]);
    assert_eq!(insights.confidence, "high");

    let session = engine.store().get(&id).await.unwrap().unwrap();
    assert!(matches!(
        session.profile.experience_level,
        ExperienceLevel::Beginner
            | ExperienceLevel::Intermediate
            | ExperienceLevel::Advanced
            | ExperienceLevel::Expert
    ));
    assert_eq!(session.profile.experience_level, ExperienceLevel::Advanced);
    assert_eq!(session.difficulty, Difficulty::Hard);
    assert_eq!(session.current_question_index, 0);
    assert!(session.flow.introduction_complete);
    assert!(session.flow.technical_assessment_started);
    assert_eq!(session.flow.current_question.as_deref(), Some(reply.message.as_str()));
    assert!(!session.flow.current_keywords.is_empty());

    let last = session.conversation.last_assistant().unwrap();
    assert!(matches!(last.audit, Some(TurnAudit::Analysis(_))));
}

#[tokio::test]
async fn test_failed_intro_analysis_uses_fallback() {
    let provider = MockLlmProvider::with_responses(vec![text("I can't do JSON today")]);
    let engine = engine_with(Arc::new(provider), 5);
    let id = engine.create_session(None).await.unwrap();
    engine.start_interview(&id).await.unwrap();

    let reply = engine.process_response(&id, "I use Excel a bit").await.unwrap();
    assert_eq!(reply.message, INTRO_FALLBACK_MESSAGE);
    assert_eq!(reply.state, SessionState::Questioning);
    assert_eq!(reply.question_number, Some(1));

    let session = engine.store().get(&id).await.unwrap().unwrap();
    assert_eq!(session.profile.experience_level, ExperienceLevel::Intermediate);
    assert_eq!(session.profile.engagement_level, EngagementLevel::Medium);
    assert!(session.flow.current_keywords.contains(&"pivot".to_string()));
}

#[tokio::test]
async fn test_failed_transition_keeps_analysis() {
    let provider =
        MockLlmProvider::with_responses(vec![text(intro_analysis_json()), unavailable()]);
    let engine = engine_with(Arc::new(provider), 5);
    let id = engine.create_session(None).await.unwrap();
    engine.start_interview(&id).await.unwrap();

    let reply = engine.process_response(&id, INTRODUCTION).await.unwrap();
    assert_eq!(reply.message, INTRO_FALLBACK_MESSAGE);

    let session = engine.store().get(&id).await.unwrap().unwrap();
    assert_eq!(session.profile.experience_level, ExperienceLevel::Advanced);
    assert_eq!(session.difficulty, Difficulty::Hard);
}

// ============================================================================
// Questioning
// ============================================================================

#[tokio::test]
async fn test_answer_advances_question() {
    let engine = engine_with(Arc::new(InterviewerProvider::new(50.0, 72.0)), 5);
    let id = engine.create_session(None).await.unwrap();
    engine.start_interview(&id).await.unwrap();
    engine.process_response(&id, INTRODUCTION).await.unwrap();

    let reply = engine
        .process_response(&id, "I'd use INDEX/MATCH with an exact match")
        .await
        .unwrap();
    assert_eq!(reply.state, SessionState::Questioning);
    assert_eq!(reply.stage, InterviewStage::AdaptiveQuestioning);
    assert_eq!(reply.question_number, Some(2));

    let summary = reply.evaluation_summary.unwrap();
    assert_eq!(summary.score, 72.0);
    assert_eq!(summary.strengths, vec!["Clear reasoning", "Practical examples"]);
    assert_eq!(summary.focus_area.as_deref(), Some("automation"));

    let status = engine.get_status(&id).await.unwrap();
    assert_eq!(status.questions_answered, 1);
    assert_eq!(status.current_question_index, 1);
    assert_eq!(status.current_score, 72.0);
    assert_eq!(status.follow_ups_used, 0);

    let session = engine.store().get(&id).await.unwrap().unwrap();
    assert_eq!(session.profile.response_patterns.len(), 1);
    assert_eq!(session.profile.engagement_level, EngagementLevel::High);
    assert!(session.profile.strengths.contains(&"Clear reasoning".to_string()));
    assert!(session
        .profile
        .weaknesses
        .contains(&"Mention error handling".to_string()));
    assert_eq!(session.score, 72.0);
}

#[tokio::test]
async fn test_follow_ups_capped_and_do_not_advance() {
    let total = 4;
    let engine = engine_with(Arc::new(InterviewerProvider::new(95.0, 90.0)), total);
    let id = engine.create_session(None).await.unwrap();
    engine.start_interview(&id).await.unwrap();
    engine.process_response(&id, INTRODUCTION).await.unwrap();

    let mut last_index = 0;
    let mut follow_up_replies = 0;
    let mut answers = 0;
    loop {
        let before = engine.get_status(&id).await.unwrap();
        let reply = engine
            .process_response(&id, "A detailed answer covering edge cases")
            .await
            .unwrap();
        answers += 1;
        let after = engine.get_status(&id).await.unwrap();

        assert!(after.current_question_index >= last_index);
        assert!(after.current_question_index <= total);
        assert!(after.follow_ups_used <= 2);
        last_index = after.current_question_index;

        if reply.stage == InterviewStage::FollowUpExploration {
            follow_up_replies += 1;
            assert_eq!(after.current_question_index, before.current_question_index);
        }
        if reply.state == SessionState::Completed {
            break;
        }
        assert!(answers < 20, "interview did not terminate");
    }

    let session = engine.store().get(&id).await.unwrap().unwrap();
    assert_eq!(follow_up_replies, 2);
    assert_eq!(session.flow.follow_up_questions, 2);
    assert_eq!(session.current_question_index, total);
    assert_eq!(session.state, SessionState::Completed);
    // every main question plus the two follow-ups
    assert_eq!(answers, total + 2);
    assert_eq!(session.flow.depth_questions_asked, total + 2);

    let follow_up_turns = session
        .conversation
        .turns()
        .iter()
        .filter(|t| t.follow_up)
        .count();
    assert_eq!(follow_up_turns, 2);

    let records = engine.store().list_responses(&id).await.unwrap();
    assert_eq!(records.len() as u32, total + 2);
    assert_eq!(records.iter().filter(|r| r.follow_up).count(), 2);
}

#[tokio::test]
async fn test_no_follow_up_without_suggestions() {
    let evaluation = serde_json::json!({
        "depth_of_knowledge": 99,
        "overall_score": 88,
        "follow_up_suggestions": []
    })
    .to_string();
    let provider = MockLlmProvider::with_responses(vec![
        text(intro_analysis_json()),
        text("First question?"),
        text(evaluation),
        text("Second question?"),
    ]);
    let engine = engine_with(Arc::new(provider), 5);
    let id = engine.create_session(None).await.unwrap();
    engine.start_interview(&id).await.unwrap();
    engine.process_response(&id, INTRODUCTION).await.unwrap();

    let reply = engine.process_response(&id, "answer").await.unwrap();
    assert_eq!(reply.stage, InterviewStage::AdaptiveQuestioning);
    assert_eq!(reply.message, "Second question?");
    assert_eq!(engine.get_status(&id).await.unwrap().follow_ups_used, 0);
}

// ============================================================================
// Completion
// ============================================================================

#[tokio::test]
async fn test_completion_persists_one_report() {
    let total = 3;
    for store in stores() {
        let engine = engine_on(store, Arc::new(InterviewerProvider::new(40.0, 85.0)), total);
        let id = engine.create_session(None).await.unwrap();
        engine.start_interview(&id).await.unwrap();
        engine.process_response(&id, INTRODUCTION).await.unwrap();

        assert_eq!(engine.get_report(&id).await.unwrap(), ReportLookup::NotCompleted);

        let mut reply = None;
        for _ in 0..total {
            reply = Some(engine.process_response(&id, "answer").await.unwrap());
        }
        let reply = reply.unwrap();
        assert_eq!(reply.state, SessionState::Completed);
        assert_eq!(reply.stage, InterviewStage::Completed);
        assert_eq!(reply.message, "Thank you, it was a pleasure. Your report is ready.");

        let report = reply.report.unwrap();
        assert_eq!(report.overall_score, 85.0);
        assert_eq!(report.tier, ProficiencyTier::Advanced);
        assert_eq!(report.questions_answered, total);
        assert!(report.generated_narrative);
        assert_eq!(report.strengths, vec!["Confident with lookups"]);
        assert_eq!(report.final_feedback, "A strong, well-rounded performance.");
        assert_eq!(report.closing_message, reply.message);

        let session = engine.store().get(&id).await.unwrap().unwrap();
        assert!(session.completed_at.is_some());
        assert_eq!(session.current_question_index, total);

        match engine.get_report(&id).await.unwrap() {
            ReportLookup::Ready(stored) => assert_eq!(*stored, report),
            other => panic!("expected stored report, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_completed_session_is_idempotent() {
    let engine = engine_with(Arc::new(InterviewerProvider::new(40.0, 85.0)), 1);
    let id = engine.create_session(None).await.unwrap();
    engine.start_interview(&id).await.unwrap();
    engine.process_response(&id, INTRODUCTION).await.unwrap();
    let done = engine.process_response(&id, "answer").await.unwrap();
    assert_eq!(done.state, SessionState::Completed);

    let before = engine.store().get(&id).await.unwrap().unwrap();
    let report_before = engine.store().get_report(&id).await.unwrap();

    for _ in 0..3 {
        let reply = engine.process_response(&id, "anything else?").await.unwrap();
        assert_eq!(reply.message, COMPLETED_ACKNOWLEDGEMENT);
        assert_eq!(reply.state, SessionState::Completed);
        assert_eq!(reply.stage, InterviewStage::Completed);
        assert!(reply.report.is_none());
    }

    let after = engine.store().get(&id).await.unwrap().unwrap();
    assert_eq!(before, after);
    assert_eq!(report_before, engine.store().get_report(&id).await.unwrap());
    assert_eq!(engine.store().list_responses(&id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_fallback_report_aggregation() {
    let shallow = |overall: f64| text(evaluation_json(10.0, overall));
    let provider = MockLlmProvider::with_responses(vec![
        unavailable(),
        shallow(90.0),
        text("Second question?"),
        shallow(60.0),
        text("Third question?"),
        shallow(30.0),
        // closing and report narrative fail from here on
    ]);
    let engine = engine_with(Arc::new(provider), 3);
    let id = engine.create_session(None).await.unwrap();
    engine.start_interview(&id).await.unwrap();
    engine.process_response(&id, "intro").await.unwrap();

    for answer in ["one", "two", "three"] {
        engine.process_response(&id, answer).await.unwrap();
    }

    let report = match engine.get_report(&id).await.unwrap() {
        ReportLookup::Ready(report) => report,
        other => panic!("expected report, got {:?}", other),
    };
    assert_eq!(report.overall_score, 60.0);
    assert_eq!(report.tier, ProficiencyTier::Intermediate);
    assert_eq!(report.technical_proficiency, "Intermediate");
    assert_eq!(report.skill_breakdown.get("General"), Some(&60.0));
    assert!(!report.generated_narrative);

    let status = engine.get_status(&id).await.unwrap();
    assert_eq!(status.questions_answered, 3);
    assert_eq!(status.current_score, 60.0);
}

#[tokio::test]
async fn test_concurrent_answers_are_serialized() {
    let engine = engine_with(Arc::new(InterviewerProvider::new(40.0, 70.0)), 10);
    let id = engine.create_session(None).await.unwrap();
    engine.start_interview(&id).await.unwrap();
    engine.process_response(&id, INTRODUCTION).await.unwrap();

    let (a, b) = tokio::join!(
        engine.process_response(&id, "first answer"),
        engine.process_response(&id, "second answer"),
    );
    a.unwrap();
    b.unwrap();

    let session = engine.store().get(&id).await.unwrap().unwrap();
    assert_eq!(session.current_question_index, 2);
    assert_eq!(session.score, 140.0);
    let user_turns = session
        .conversation
        .turns()
        .iter()
        .filter(|t| t.role == Role::User)
        .count();
    // introduction plus both answers
    assert_eq!(user_turns, 3);
    assert_eq!(engine.store().list_responses(&id).await.unwrap().len(), 2);
}
