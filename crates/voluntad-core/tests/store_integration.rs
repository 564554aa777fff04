//! Integration tests for store persistence: round-trips, fail-open loads,
//! and rollover applied while the process was down.

use chrono::{Days, Local};
use voluntad_core::pact::{Pact, PactStatus, StimulusType};
use voluntad_core::store::PactStore;

#[test]
fn full_state_roundtrips_across_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let store = PactStore::open(dir.path());
    let pact = Pact::new("no sugar");
    let id = pact.id.clone();
    store.add_pact(pact);
    store.add_pact(Pact::new("gym"));
    store.update_status(&id, PactStatus::Signed);
    store.record_manual_stimulus(StimulusType::Vibrate, 15, "band check");
    store.set_scheduled_time(20, 45).unwrap();
    let before = store.snapshot();
    drop(store);

    let reopened = PactStore::open(dir.path());
    assert_eq!(reopened.snapshot(), before);
}

#[test]
fn corrupted_blob_falls_back_without_losing_the_rest() {
    let dir = tempfile::tempdir().unwrap();

    let store = PactStore::open(dir.path());
    store.add_pact(Pact::new("read"));
    store.set_scheduled_time(8, 15).unwrap();
    drop(store);

    // Only the pact list is damaged; every other field must survive.
    std::fs::write(dir.path().join("pacts.json"), "{definitely not json").unwrap();

    let reopened = PactStore::open(dir.path());
    let snap = reopened.snapshot();
    assert!(snap.pacts.is_empty());
    assert_eq!((snap.scheduled_hour, snap.scheduled_minute), (8, 15));
    assert_eq!(snap.integrity_score, 100);
}

#[test]
fn fully_missing_directory_content_opens_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = PactStore::open(dir.path());
    let snap = store.snapshot();
    assert!(snap.pacts.is_empty());
    assert!(snap.history.is_empty());
    assert_eq!(snap.integrity_score, 100);
    assert_eq!((snap.scheduled_hour, snap.scheduled_minute), (21, 0));
    assert_eq!(snap.threat_level, 40);
}

#[test]
fn stale_summary_rolls_over_on_open() {
    let dir = tempfile::tempdir().unwrap();

    let yesterday = Local::now()
        .date_naive()
        .checked_sub_days(Days::new(1))
        .unwrap();
    let stale = serde_json::json!({
        "date": yesterday.to_string(),
        "total_tasks": 0,
        "completed_tasks": 0,
        "completion_rate": 0.0,
        "zap_sent": true,
        "streak": 3
    });
    std::fs::write(
        dir.path().join("today_summary.json"),
        serde_json::to_string_pretty(&stale).unwrap(),
    )
    .unwrap();

    let store = PactStore::open(dir.path());
    let snap = store.snapshot();
    assert_eq!(snap.summary.date, Local::now().date_naive());
    assert!(!snap.summary.zap_sent);
    // Streak survives the rollover; the empty day costs integrity.
    assert_eq!(snap.summary.streak, 3);
    assert_eq!(snap.integrity_score, 98);
    // The rolled state is persisted immediately.
    drop(store);
    let reopened = PactStore::open(dir.path());
    assert_eq!(reopened.snapshot().integrity_score, 98);
}

#[test]
fn daily_pacts_reset_across_a_missed_day() {
    let dir = tempfile::tempdir().unwrap();

    let store = PactStore::open(dir.path());
    let pact = Pact::new("write");
    let id = pact.id.clone();
    store.add_pact(pact);
    store.update_status(&id, PactStatus::Signed);
    drop(store);

    // Age the summary on disk by one day.
    let yesterday = Local::now()
        .date_naive()
        .checked_sub_days(Days::new(1))
        .unwrap();
    let content = std::fs::read_to_string(dir.path().join("today_summary.json")).unwrap();
    let mut summary: serde_json::Value = serde_json::from_str(&content).unwrap();
    summary["date"] = serde_json::Value::String(yesterday.to_string());
    std::fs::write(
        dir.path().join("today_summary.json"),
        serde_json::to_string_pretty(&summary).unwrap(),
    )
    .unwrap();

    let reopened = PactStore::open(dir.path());
    let snap = reopened.snapshot();
    let pact = snap.pacts.iter().find(|p| p.id == id).unwrap();
    assert_eq!(pact.status, PactStatus::Pending);
    assert!(pact.is_active);
    assert_eq!(snap.summary.total_tasks, 1);
    assert_eq!(snap.summary.completed_tasks, 0);
    // Yesterday had a pact, so no atrophy.
    assert_eq!(snap.integrity_score, 100);
}
