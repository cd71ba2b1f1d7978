//! Session Maintenance Integration Tests
//!
//! Candidate linking, auxiliary records, cleanup of stale sessions and
//! health reporting.

use std::sync::Arc;

use serde_json::json;

use excel_interview::models::records::{IncidentStatus, NewPreInterviewCheck, NewSupportIncident};
use excel_interview::models::session::{NewCandidate, Session, SessionState};
use excel_interview::storage::store::{now_timestamp, ChildCollection, ChildRecord};
use excel_interview::SessionStore;

use crate::support::{engine_on, engine_with, stores, FailingProvider, InterviewerProvider};

#[tokio::test]
async fn test_create_session_links_candidate() {
    let engine = engine_with(Arc::new(InterviewerProvider::new(50.0, 70.0)), 5);
    let id = engine
        .create_session(Some(NewCandidate {
            name: Some("Robin".to_string()),
            email: None,
            metadata: json!({"role": "analyst"}),
        }))
        .await
        .unwrap();

    let session = engine.store().get(&id).await.unwrap().unwrap();
    assert_eq!(session.state, SessionState::Init);
    assert_eq!(session.total_questions, 5);
    let candidate_id = session.candidate_id.unwrap();
    let candidate = engine
        .store()
        .get_candidate(&candidate_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(candidate.name.as_deref(), Some("Robin"));

    let anonymous = engine.create_session(None).await.unwrap();
    let session = engine.store().get(&anonymous).await.unwrap().unwrap();
    assert!(session.candidate_id.is_none());
}

#[tokio::test]
async fn test_checks_and_incidents() {
    let engine = engine_with(Arc::new(InterviewerProvider::new(50.0, 70.0)), 5);
    let id = engine.create_session(None).await.unwrap();

    let check = engine
        .record_pre_interview_check(
            &id,
            NewPreInterviewCheck {
                check_type: "microphone".to_string(),
                passed: true,
                details: json!({"level": 0.8}),
            },
        )
        .await
        .unwrap();
    assert_eq!(check.session_id, id);

    let incident = engine
        .report_incident(
            &id,
            NewSupportIncident {
                category: "network".to_string(),
                description: "Connection dropped".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(incident.status, IncidentStatus::Open);

    let checks = engine
        .store()
        .list_children(ChildCollection::Checks, &id)
        .await
        .unwrap();
    assert_eq!(checks, vec![ChildRecord::Check(check)]);
    let incidents = engine
        .store()
        .list_children(ChildCollection::Incidents, &id)
        .await
        .unwrap();
    assert_eq!(incidents, vec![ChildRecord::Incident(incident)]);

    let err = engine
        .report_incident(
            "missing",
            NewSupportIncident {
                category: "audio".to_string(),
                description: "No sound".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

fn stale_session(state: SessionState, completed_at: Option<&str>) -> Session {
    let mut session = Session::new(5, None, "2020-01-01T00:00:00Z");
    session.state = state;
    session.completed_at = completed_at.map(|s| s.to_string());
    session
}

#[tokio::test]
async fn test_cleanup_removes_stale_sessions() {
    for store in stores() {
        let engine = engine_on(store.clone(), Arc::new(FailingProvider::new()), 3);

        let old_completed = store
            .create(stale_session(SessionState::Completed, Some("2020-01-01T00:30:00Z")))
            .await
            .unwrap();
        let abandoned = store
            .create(stale_session(SessionState::Questioning, None))
            .await
            .unwrap();
        let mut recent = stale_session(SessionState::Completed, None);
        recent.completed_at = Some(now_timestamp());
        let recent = store.create(recent).await.unwrap();
        let fresh = engine.create_session(None).await.unwrap();

        let removed = engine.cleanup_old_sessions().await.unwrap();
        assert_eq!(removed, 2, "{}", store.name());

        assert!(store.get(&old_completed.id).await.unwrap().is_none());
        assert!(store.get(&abandoned.id).await.unwrap().is_none());
        assert!(store.get(&recent.id).await.unwrap().is_some());
        assert!(store.get(&fresh).await.unwrap().is_some());

        assert_eq!(engine.cleanup_old_sessions().await.unwrap(), 0);
    }
}

#[tokio::test]
async fn test_health_reports_gateway_and_store() {
    let engine = engine_with(Arc::new(InterviewerProvider::new(50.0, 70.0)), 5);
    engine.create_session(None).await.unwrap();
    let health = engine.health().await;
    assert_eq!(health.status, "healthy");
    assert!(health.gateway_configured);
    assert!(health.gateway_reachable);
    assert!(health.store);
    assert_eq!(health.active_sessions, 1);
    assert_eq!(health.service, "excel-interview");

    let degraded = engine_with(Arc::new(FailingProvider::unconfigured()), 5);
    let health = degraded.health().await;
    assert_eq!(health.status, "degraded");
    assert!(!health.gateway_configured);
    assert!(!health.gateway_reachable);
    assert!(health.store);

    // Credentials present but the endpoint does not answer
    let unreachable = engine_with(Arc::new(FailingProvider::new()), 5);
    let health = unreachable.health().await;
    assert_eq!(health.status, "degraded");
    assert!(health.gateway_configured);
    assert!(!health.gateway_reachable);
}

#[tokio::test]
async fn test_latest_and_active_sessions() {
    let engine = engine_with(Arc::new(InterviewerProvider::new(50.0, 70.0)), 5);
    assert!(engine.latest_session().await.unwrap().is_none());

    let first = engine.create_session(None).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = engine.create_session(None).await.unwrap();
    engine.start_interview(&second).await.unwrap();

    let latest = engine.latest_session().await.unwrap().unwrap();
    assert_eq!(latest.id, second);

    // INTRO is not one of the listed active states
    let active: Vec<String> = engine
        .list_active_sessions()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(active, vec![first]);
}
