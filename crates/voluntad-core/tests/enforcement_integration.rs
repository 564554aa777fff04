//! End-to-end enforcement tests against a mock gateway server.

use std::sync::Arc;
use std::time::Duration;

use mockito::Matcher;
use serde_json::json;

use voluntad_core::pact::{Pact, StimulusType};
use voluntad_core::storage::EnforcementConfig;
use voluntad_core::store::PactStore;
use voluntad_core::worker::{CheckOutcome, EnforcementWorker, EscalationRng};
use voluntad_core::HttpStimulusGateway;

/// Pinned escalation roll.
struct FixedRng {
    jitter: i32,
    critical: bool,
}

impl EscalationRng for FixedRng {
    fn jitter(&mut self) -> i32 {
        self.jitter
    }
    fn critical(&mut self) -> bool {
        self.critical
    }
}

fn test_config() -> EnforcementConfig {
    EnforcementConfig {
        retry_max_attempts: 3,
        retry_backoff_secs: 0,
        override_already_enforced: false,
        escalation_seed: None,
    }
}

fn gateway_for(server: &mockito::ServerGuard) -> HttpStimulusGateway {
    HttpStimulusGateway::new(&server.url(), "test-token".into(), Duration::from_secs(5)).unwrap()
}

fn pinned_worker(
    store: Arc<PactStore>,
    gateway: HttpStimulusGateway,
) -> EnforcementWorker<HttpStimulusGateway> {
    EnforcementWorker::new(store, gateway, test_config()).with_rng(Box::new(FixedRng {
        jitter: 0,
        critical: false,
    }))
}

#[tokio::test]
async fn auto_check_dispatches_base_threat_and_updates_state() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v5/stimulus/send")
        .match_header("authorization", "Bearer test-token")
        .match_body(Matcher::PartialJson(json!({
            "stimulus": {
                "stimulusType": "zap",
                "stimulusValue": 40,
            }
        })))
        .with_status(200)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(PactStore::open(dir.path()));
    store.add_pact(Pact::new("meditate"));

    let mut worker = pinned_worker(Arc::clone(&store), gateway_for(&server));
    let outcome = worker.run_auto().await;

    match outcome {
        CheckOutcome::Enforced { intensity } => assert_eq!(intensity, 40),
        other => panic!("expected enforcement, got {other:?}"),
    }
    mock.assert_async().await;

    let snap = store.snapshot();
    assert!(snap.summary.zap_sent);
    assert_eq!(snap.summary.streak, 0);
    assert_eq!(snap.history.len(), 1);
    assert!(snap.history[0].reason.contains("Auto"));
    // One enforcement today escalates the baseline for the next check.
    assert_eq!(snap.threat_level, 60);
}

#[tokio::test]
async fn server_errors_retry_up_to_the_cap() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v5/stimulus/send")
        .with_status(503)
        .with_body("maintenance")
        .expect(3)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(PactStore::open(dir.path()));
    store.add_pact(Pact::new("meditate"));

    let mut worker = pinned_worker(Arc::clone(&store), gateway_for(&server));
    let outcome = worker.run_auto().await;

    match outcome {
        CheckOutcome::Failed { error, attempts } => {
            assert!(error.is_transient());
            assert_eq!(attempts, 3);
        }
        other => panic!("expected failure, got {other:?}"),
    }
    mock.assert_async().await;
    assert!(!store.snapshot().summary.zap_sent);
}

#[tokio::test]
async fn auth_rejection_fails_permanently_without_state_changes() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v5/stimulus/send")
        .with_status(401)
        .with_body(r#"{"detail": "invalid token"}"#)
        .expect(1)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(PactStore::open(dir.path()));
    store.add_pact(Pact::new("meditate"));

    let mut worker = pinned_worker(Arc::clone(&store), gateway_for(&server));
    let outcome = worker.run_auto().await;

    match outcome {
        CheckOutcome::Failed { error, attempts } => {
            assert!(!error.is_transient());
            assert_eq!(attempts, 1);
        }
        other => panic!("expected failure, got {other:?}"),
    }
    mock.assert_async().await;

    let snap = store.snapshot();
    assert!(!snap.summary.zap_sent);
    assert!(snap.history.is_empty());
}

#[tokio::test]
async fn manual_dispatch_uses_wire_names_and_records_history() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v5/stimulus/send")
        .match_body(Matcher::PartialJson(json!({
            "stimulus": {
                "stimulusType": "vibe",
                "stimulusValue": 20,
                "reason": "band check",
            }
        })))
        .with_status(200)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(PactStore::open(dir.path()));

    let mut worker = pinned_worker(Arc::clone(&store), gateway_for(&server));
    worker
        .run_manual(StimulusType::Vibrate, 20, "band check")
        .await
        .unwrap();

    mock.assert_async().await;
    let snap = store.snapshot();
    assert!(!snap.summary.zap_sent);
    assert_eq!(snap.history.len(), 1);
    assert_eq!(snap.history[0].stimulus, StimulusType::Vibrate);
}

#[tokio::test]
async fn verify_returns_the_account_email() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v5/user")
        .match_header("authorization", "Bearer test-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"email": "user@example.com"}"#)
        .create_async()
        .await;

    let gateway = gateway_for(&server);
    let email = gateway.verify().await.unwrap();
    assert_eq!(email, "user@example.com");
    mock.assert_async().await;
}

#[tokio::test]
async fn verify_surfaces_auth_failures() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/v5/user")
        .with_status(401)
        .create_async()
        .await;

    let gateway = gateway_for(&server);
    let err = gateway.verify().await.unwrap_err();
    assert!(!err.is_transient());
}
