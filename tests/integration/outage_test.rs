//! Gateway Outage Integration Tests
//!
//! With the gateway down or too slow, the interview must still reach
//! COMPLETED using canned questions and keyword scoring only.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use excel_interview::models::report::ProficiencyTier;
use excel_interview::models::response::{InterviewStage, ReportLookup};
use excel_interview::models::session::SessionState;
use excel_interview::services::interview::fallback::{
    fallback_question, CLOSING_FALLBACK_MESSAGE, INTRO_FALLBACK_MESSAGE, KEYWORD_FEEDBACK,
    NEXT_QUESTION_PREFIX,
};
use excel_interview::{EngineSettings, InMemorySessionStore, InterviewEngine};

use crate::support::{engine_on, engine_with, stores, FailingProvider, SlowProvider};

#[tokio::test]
async fn test_total_outage_still_completes() {
    let total = 4;
    for store in stores() {
        let provider = Arc::new(FailingProvider::new());
        let engine = engine_on(store, provider.clone(), total);
        let id = engine.create_session(None).await.unwrap();
        engine.start_interview(&id).await.unwrap();

        let intro = engine.process_response(&id, "I use Excel daily").await.unwrap();
        assert_eq!(intro.message, INTRO_FALLBACK_MESSAGE);
        assert_eq!(intro.state, SessionState::Questioning);

        let mut last_index = 0;
        for n in 1..=total {
            let reply = engine
                .process_response(&id, "I would use a pivot table and a filter")
                .await
                .unwrap();
            let status = engine.get_status(&id).await.unwrap();
            assert!(status.current_question_index >= last_index);
            assert!(status.current_question_index <= total);
            last_index = status.current_question_index;

            if n < total {
                assert_eq!(reply.state, SessionState::Questioning);
                assert_eq!(reply.stage, InterviewStage::TechnicalAssessment);
                let canned = fallback_question(n);
                assert_eq!(reply.message, format!("{}{}", NEXT_QUESTION_PREFIX, canned.text));
            } else {
                assert_eq!(reply.state, SessionState::Completed);
                assert_eq!(reply.message, CLOSING_FALLBACK_MESSAGE);
                assert!(reply.report.is_some());
            }
        }
        assert!(provider.calls.load(Ordering::SeqCst) > 0);

        let records = engine.store().list_responses(&id).await.unwrap();
        assert_eq!(records.len() as u32, total);
        assert!(records.iter().all(|r| r.evaluation.is_fallback()));
        assert!(records.iter().all(|r| r.feedback == KEYWORD_FEEDBACK));
        // "pivot" and "filter" out of six expected keywords for the first question
        assert!((records[0].score - 100.0 / 3.0).abs() < 1e-9);

        let session = engine.store().get(&id).await.unwrap().unwrap();
        assert_eq!(session.current_question_index, total);
        assert!(session.completed_at.is_some());
        assert_eq!(session.flow.follow_up_questions, 0);

        match engine.get_report(&id).await.unwrap() {
            ReportLookup::Ready(report) => {
                assert!(!report.generated_narrative);
                assert_eq!(report.questions_answered, total);
                assert_eq!(report.closing_message, CLOSING_FALLBACK_MESSAGE);
            }
            other => panic!("expected report, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_keyword_score_for_empty_answer_is_zero() {
    let engine = engine_with(Arc::new(FailingProvider::new()), 3);
    let id = engine.create_session(None).await.unwrap();
    engine.start_interview(&id).await.unwrap();
    engine.process_response(&id, "intro").await.unwrap();

    engine.process_response(&id, "no idea").await.unwrap();
    let records = engine.store().list_responses(&id).await.unwrap();
    assert_eq!(records[0].score, 0.0);
    assert_eq!(engine.get_status(&id).await.unwrap().current_score, 0.0);
}

#[tokio::test]
async fn test_all_zero_outage_report_is_beginner() {
    let engine = engine_with(Arc::new(FailingProvider::new()), 2);
    let id = engine.create_session(None).await.unwrap();
    engine.start_interview(&id).await.unwrap();
    engine.process_response(&id, "intro").await.unwrap();
    engine.process_response(&id, "no idea").await.unwrap();
    let done = engine.process_response(&id, "still no idea").await.unwrap();

    let report = done.report.unwrap();
    assert_eq!(report.overall_score, 0.0);
    assert_eq!(report.tier, ProficiencyTier::Beginner);
    assert_eq!(report.weaknesses, vec!["Inconsistent performance across questions"]);
    assert_eq!(
        report.recommendations,
        vec![
            "Start with Excel basics and core functions",
            "Practice with sample datasets",
            "Take introductory Excel courses"
        ]
    );
}

#[tokio::test]
async fn test_slow_gateway_times_out_into_fallback() {
    let settings = EngineSettings {
        total_questions: 3,
        gateway_timeout: Duration::from_millis(50),
        ..EngineSettings::default()
    };
    let engine = InterviewEngine::new(
        Arc::new(InMemorySessionStore::new()),
        Arc::new(SlowProvider::new(Duration::from_secs(10))),
        settings,
    );
    let id = engine.create_session(None).await.unwrap();
    engine.start_interview(&id).await.unwrap();

    let started = Instant::now();
    let reply = engine.process_response(&id, "I use Excel daily").await.unwrap();
    assert_eq!(reply.message, INTRO_FALLBACK_MESSAGE);
    assert_eq!(reply.state, SessionState::Questioning);
    assert!(started.elapsed() < Duration::from_secs(5));
}
