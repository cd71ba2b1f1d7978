//! Session Store Contract Tests
//!
//! The same scenarios run against the in-memory and the SQLite store so
//! both implementations keep identical semantics.

use excel_interview::models::records::{IncidentStatus, SupportIncident};
use excel_interview::models::session::{NewCandidate, Session, SessionState};
use excel_interview::storage::store::{ChildCollection, ChildRecord};
use excel_interview::{SessionStore, SessionUpdate};

use crate::support::stores;

fn session_at(created_at: &str) -> Session {
    Session::new(5, None, created_at)
}

fn incident(session_id: &str, n: u32) -> SupportIncident {
    SupportIncident {
        id: format!("inc-{}", n),
        session_id: session_id.to_string(),
        category: "audio".to_string(),
        description: format!("problem {}", n),
        status: IncidentStatus::Open,
        created_at: format!("2024-01-01T00:00:0{}Z", n),
    }
}

#[tokio::test]
async fn test_create_assigns_id_and_get_returns_it() {
    for store in stores() {
        let created = store.create(session_at("2024-01-01T00:00:00Z")).await.unwrap();
        assert!(!created.id.is_empty(), "{}", store.name());

        let fetched = store.get(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created, "{}", store.name());
        assert!(store.get("missing").await.unwrap().is_none());
    }
}

#[tokio::test]
async fn test_partial_update() {
    for store in stores() {
        let created = store.create(session_at("2024-01-01T00:00:00Z")).await.unwrap();

        let updated = store
            .update(
                &created.id,
                SessionUpdate {
                    state: Some(SessionState::Questioning),
                    score: Some(42.5),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated);

        let fetched = store.get(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.state, SessionState::Questioning, "{}", store.name());
        assert_eq!(fetched.score, 42.5);
        assert_eq!(fetched.total_questions, created.total_questions);
        assert_eq!(fetched.difficulty, created.difficulty);

        assert!(!store
            .update("missing", SessionUpdate::default())
            .await
            .unwrap());
    }
}

#[tokio::test]
async fn test_completed_at_is_set_once() {
    for store in stores() {
        let created = store.create(session_at("2024-01-01T00:00:00Z")).await.unwrap();
        for stamp in ["2024-01-01T01:00:00Z", "2024-01-01T02:00:00Z"] {
            store
                .update(
                    &created.id,
                    SessionUpdate {
                        state: Some(SessionState::Completed),
                        completed_at: Some(stamp.to_string()),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }
        let fetched = store.get(&created.id).await.unwrap().unwrap();
        assert_eq!(
            fetched.completed_at.as_deref(),
            Some("2024-01-01T01:00:00Z"),
            "{}",
            store.name()
        );
    }
}

#[tokio::test]
async fn test_list_active_and_latest() {
    for store in stores() {
        let first = store.create(session_at("2024-01-01T00:00:00Z")).await.unwrap();
        let second = store.create(session_at("2024-01-02T00:00:00Z")).await.unwrap();
        let third = store.create(session_at("2024-01-03T00:00:00Z")).await.unwrap();

        for (id, state) in [
            (&first.id, SessionState::Questioning),
            (&second.id, SessionState::Completed),
            (&third.id, SessionState::Intro),
        ] {
            store
                .update(
                    id,
                    SessionUpdate {
                        state: Some(state),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }

        let active: Vec<String> = store
            .list_active()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(active, vec![first.id.clone()], "{}", store.name());

        let latest = store.latest().await.unwrap().unwrap();
        assert_eq!(latest.id, third.id, "{}", store.name());
        assert_eq!(store.list_all().await.unwrap().len(), 3);
    }
}

#[tokio::test]
async fn test_children_are_ordered_and_scoped() {
    for store in stores() {
        let a = store.create(session_at("2024-01-01T00:00:00Z")).await.unwrap();
        let b = store.create(session_at("2024-01-02T00:00:00Z")).await.unwrap();

        for n in 1..=3 {
            store
                .append_child(&a.id, ChildRecord::Incident(incident(&a.id, n)))
                .await
                .unwrap();
        }
        store
            .append_child(&b.id, ChildRecord::Incident(incident(&b.id, 9)))
            .await
            .unwrap();

        let children = store
            .list_children(ChildCollection::Incidents, &a.id)
            .await
            .unwrap();
        let ids: Vec<&str> = children.iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["inc-1", "inc-2", "inc-3"], "{}", store.name());
        assert!(store
            .list_children(ChildCollection::Checks, &a.id)
            .await
            .unwrap()
            .is_empty());
        assert!(store.list_responses(&a.id).await.unwrap().is_empty());

        let err = store
            .append_child("missing", ChildRecord::Incident(incident("missing", 1)))
            .await
            .unwrap_err();
        assert!(err.is_not_found(), "{}", store.name());
    }
}

#[tokio::test]
async fn test_delete_cascades() {
    for store in stores() {
        let created = store.create(session_at("2024-01-01T00:00:00Z")).await.unwrap();
        store
            .append_child(&created.id, ChildRecord::Incident(incident(&created.id, 1)))
            .await
            .unwrap();

        assert!(store.delete(&created.id).await.unwrap());
        assert!(!store.delete(&created.id).await.unwrap());
        assert!(store.get(&created.id).await.unwrap().is_none());
        assert!(store
            .list_children(ChildCollection::Incidents, &created.id)
            .await
            .unwrap()
            .is_empty());
    }
}

#[tokio::test]
async fn test_candidates() {
    for store in stores() {
        let candidate = store
            .create_candidate(NewCandidate {
                name: Some("Dana".to_string()),
                email: Some("dana@example.com".to_string()),
                metadata: serde_json::json!({"source": "referral"}),
            })
            .await
            .unwrap();
        let fetched = store.get_candidate(&candidate.id).await.unwrap().unwrap();
        assert_eq!(fetched, candidate, "{}", store.name());
        assert!(store.get_candidate("missing").await.unwrap().is_none());
    }
}
