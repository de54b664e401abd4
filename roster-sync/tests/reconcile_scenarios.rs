use std::collections::BTreeMap;

use rstest::rstest;
use serde_json::{json, Value};

use roster_core::{LoadedWorkerRecord, SkillAssignment, SkillSource, SkillTable, WorkerName};
use roster_directory::{DirectoryCall, DirectoryError, ErrorKind, InMemoryDirectory};
use roster_sync::{
    run, ActivityFlip, ApplyOutcome, DriverSettings, FlipOutcome, RunPhase, RunReport, WriteAction,
};

fn settings(dry_run: bool) -> DriverSettings {
    DriverSettings {
        page_size: 1000,
        flip: ActivityFlip {
            temp_activity_sid: "WA-temp".into(),
            offline_activity_sid: "WA-offline".into(),
        },
        dry_run,
    }
}

fn record(pairs: &[(&str, &str)]) -> LoadedWorkerRecord {
    let fields: BTreeMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    LoadedWorkerRecord {
        name: WorkerName::from(fields.get("friendlyName").cloned().unwrap_or_default()),
        row: 1,
        fields,
    }
}

fn confirmed(dir: &InMemoryDirectory, records: Vec<LoadedWorkerRecord>) -> RunReport {
    run(dir, settings(false), records, SkillSource::None, |_| true).expect("run")
}

fn stored(dir: &InMemoryDirectory, name: &str) -> Value {
    let worker = dir.worker(name).expect("worker exists");
    serde_json::from_str(&worker.attributes).expect("stored json")
}

fn activity_calls(dir: &InMemoryDirectory) -> Vec<String> {
    dir.write_calls()
        .into_iter()
        .filter_map(|c| match c {
            DirectoryCall::Update { update, .. } => update.activity_sid,
            _ => None,
        })
        .collect()
}

#[test]
fn new_worker_is_created_with_contact_uri() {
    let dir = InMemoryDirectory::new();
    let report = confirmed(
        &dir,
        vec![record(&[
            ("friendlyName", "Jo Smith"),
            ("email", "a@b.com"),
            ("date_left", ""),
        ])],
    );
    assert!(matches!(report.outcomes[0], ApplyOutcome::Created { .. }));
    let attrs = stored(&dir, "Jo Smith");
    assert_eq!(attrs["contact_uri"], json!("client:Jo_20Smith"));
    assert_eq!(attrs["email"], json!("a@b.com"));
    assert!(attrs.get("date_left").is_none());
}

#[test]
fn matching_worker_is_left_alone() {
    let dir = InMemoryDirectory::new().with_worker("Jo", r#"{"team_id":"5"}"#);
    let report = confirmed(&dir, vec![record(&[("friendlyName", "Jo"), ("team_id", "5")])]);
    assert_eq!(report.summary().unchanged, 1);
    assert!(dir.write_calls().is_empty());
}

#[test]
fn departure_updates_then_flips_activity() {
    let dir = InMemoryDirectory::new().with_worker("Jo", r#"{"wfm_id":"X9"}"#);
    let report = confirmed(
        &dir,
        vec![record(&[("friendlyName", "Jo"), ("date_left", "2024-01-01")])],
    );
    assert_eq!(
        report.outcomes[0],
        ApplyOutcome::Updated {
            name: WorkerName::from("Jo"),
            flip: Some(FlipOutcome::Flipped),
        }
    );
    let attrs = stored(&dir, "Jo");
    assert_eq!(attrs["date_left"], json!(2024));
    assert_eq!(attrs["wfm_id"], json!("X9"));
    assert_eq!(activity_calls(&dir), vec!["WA-temp", "WA-offline"]);
    assert_eq!(
        dir.worker("Jo").and_then(|w| w.activity_sid),
        Some("WA-offline".to_string())
    );
}

#[test]
fn failed_attribute_write_does_not_flip() {
    let dir = InMemoryDirectory::new().with_worker("Jo", "{}");
    dir.fail_attribute_update("Jo", DirectoryError::Transport("timed out".into()));
    let report = confirmed(
        &dir,
        vec![record(&[("friendlyName", "Jo"), ("date_left", "2024-01-01")])],
    );
    assert!(matches!(
        report.outcomes[0],
        ApplyOutcome::Failed {
            action: WriteAction::Update,
            kind: ErrorKind::Unknown,
            ..
        }
    ));
    assert!(activity_calls(&dir).is_empty());
}

#[test]
fn failed_flip_keeps_attribute_write_and_other_workers() {
    let dir = InMemoryDirectory::new()
        .with_worker("Jo", "{}")
        .with_worker("Al", "{}");
    dir.fail_activity_update("Jo", DirectoryError::Transport("reset".into()));
    let report = confirmed(
        &dir,
        vec![
            record(&[("friendlyName", "Jo"), ("date_left", "2024-01-01")]),
            record(&[("friendlyName", "Al"), ("email", "al@acme.com")]),
        ],
    );
    let summary = report.summary();
    assert_eq!(summary.updated, 2);
    assert_eq!(summary.flip_failed, 1);
    assert_eq!(stored(&dir, "Jo")["date_left"], json!(2024));
    assert_eq!(stored(&dir, "Al")["email"], json!("al@acme.com"));
}

#[rstest]
#[case::conflict(
    DirectoryError::Conflict { code: 20001, message: "exists".into() },
    ErrorKind::Conflict
)]
#[case::rate_limited(
    DirectoryError::RateLimited { code: 20429, message: "Too Many Requests".into() },
    ErrorKind::RateLimited
)]
#[case::unknown(
    DirectoryError::Api { status: 500, code: None, message: "oops".into(), more_info: None },
    ErrorKind::Unknown
)]
fn create_failure_is_recorded_and_run_continues(
    #[case] error: DirectoryError,
    #[case] kind: ErrorKind,
) {
    let dir = InMemoryDirectory::new();
    dir.fail_create("Jo", error);
    let report = confirmed(
        &dir,
        vec![
            record(&[("friendlyName", "Jo")]),
            record(&[("friendlyName", "Al")]),
        ],
    );
    assert_eq!(report.failures_of(kind), 1);
    assert!(dir.worker("Al").is_some(), "later workers are still created");
    assert!(dir.worker("Jo").is_none());
}

#[test]
fn creates_are_issued_before_updates() {
    let dir = InMemoryDirectory::new().with_worker("Old", r#"{"email":"x@acme.com"}"#);
    confirmed(
        &dir,
        vec![
            record(&[("friendlyName", "Old"), ("email", "y@acme.com")]),
            record(&[("friendlyName", "New")]),
        ],
    );
    let writes = dir.write_calls();
    assert!(matches!(writes[0], DirectoryCall::Create { .. }));
    assert!(matches!(writes[1], DirectoryCall::Update { .. }));
}

#[test]
fn dry_run_writes_nothing() {
    let dir = InMemoryDirectory::new().with_worker("Jo", "{}");
    let report = run(
        &dir,
        settings(true),
        vec![
            record(&[("friendlyName", "Jo"), ("date_left", "2024-01-01")]),
            record(&[("friendlyName", "Al")]),
        ],
        SkillSource::None,
        |_| true,
    )
    .expect("run");
    assert!(report.dry_run);
    assert_eq!(report.summary().created, 1);
    assert_eq!(report.summary().updated, 1);
    assert!(dir.write_calls().is_empty());
}

#[test]
fn declined_confirmation_aborts_without_writes() {
    let dir = InMemoryDirectory::new();
    let report = run(
        &dir,
        settings(false),
        vec![record(&[("friendlyName", "Jo")])],
        SkillSource::None,
        |_| false,
    )
    .expect("run");
    assert!(report.aborted);
    assert_eq!(report.final_phase, RunPhase::Done);
    assert!(dir.write_calls().is_empty());
}

#[test]
fn delimited_skills_replace_remote_routing() {
    let dir = InMemoryDirectory::new().with_worker(
        "Jo",
        r#"{"routing":{"skills":["old"],"levels":{"old":5}}}"#,
    );
    let records = vec![record(&[("friendlyName", "Jo"), ("skills", "sales, support")])];
    let source = SkillSource::select(None, &records);
    run(&dir, settings(false), records, source, |_| true).expect("run");
    let routing = &stored(&dir, "Jo")["routing"];
    assert_eq!(routing["skills"], json!(["sales", "support"]));
    assert_eq!(routing["levels"], json!({"sales": 1, "support": 1}));
}

#[test]
fn skill_table_sets_matched_workers_and_clears_unmatched_ones() {
    let dir = InMemoryDirectory::new()
        .with_worker(
            "Jo",
            r#"{"email":"jo@acme.com","routing":{"skills":["old"],"levels":{"old":5}}}"#,
        )
        .with_worker(
            "Al",
            r#"{"email":"al@acme.com","routing":{"skills":["old"],"levels":{"old":5},"channel":"voice"}}"#,
        );
    let mut jo = SkillAssignment::default();
    assert!(jo.insert_cell("sales", "x"));
    assert!(jo.insert_cell("support", "3"));
    let table = SkillTable {
        by_email: BTreeMap::from([("jo@acme.com".to_string(), jo)]),
    };
    let records = vec![
        record(&[("friendlyName", "Jo"), ("email", "jo@acme.com")]),
        record(&[("friendlyName", "Al"), ("email", "al@acme.com")]),
    ];
    let source = SkillSource::select(Some(table), &records);
    assert!(matches!(source, SkillSource::Table(_)));

    let report = run(&dir, settings(false), records, source, |_| true).expect("run");
    assert_eq!(report.summary().updated, 2);

    let jo_routing = &stored(&dir, "Jo")["routing"];
    assert_eq!(jo_routing["skills"], json!(["sales", "support"]));
    assert_eq!(jo_routing["levels"], json!({"support": 3}));

    let al_routing = &stored(&dir, "Al")["routing"];
    assert_eq!(al_routing["skills"], json!([]));
    assert_eq!(al_routing["levels"], json!({}));
    assert_eq!(al_routing["channel"], "voice");
}

#[test]
fn skill_table_matching_remote_routing_is_left_alone() {
    let dir = InMemoryDirectory::new().with_worker(
        "Jo",
        r#"{"email":"jo@acme.com","routing":{"skills":["support","sales"],"levels":{"support":3}}}"#,
    );
    let mut jo = SkillAssignment::default();
    jo.insert_cell("sales", "x");
    jo.insert_cell("support", "3.0");
    let table = SkillTable {
        by_email: BTreeMap::from([("jo@acme.com".to_string(), jo)]),
    };
    let records = vec![record(&[("friendlyName", "Jo"), ("email", "jo@acme.com")])];
    let source = SkillSource::select(Some(table), &records);

    let report = run(&dir, settings(false), records, source, |_| true).expect("run");
    assert_eq!(report.summary().unchanged, 1);
    assert!(dir.write_calls().is_empty());
}
