//! End-to-end pipeline tests over the in-memory history store
//!
//! These tests drive the coordinator through load → process → gate → commit
//! and check the persistence protocol's invariants without a live database.

mod common;

use chrono::Utc;
use common::MemoryHistoryStore;
use std::io::Write;
use std::sync::Arc;
use strata::adapters::store::HistoryStore;
use strata::core::gate::QualityGate;
use strata::core::ingest::{IngestCoordinator, IngestOptions};
use strata::domain::{FieldValue, ProcessedRecord, ResourceType, StrataError};
use tempfile::NamedTempFile;
use tokio::sync::watch;

fn claim_line_with_amount(id: &str, with_provider: bool, amount: f64) -> String {
    let provider = if with_provider {
        r#""provider": {"reference": "Organization/prov-1"},"#
    } else {
        ""
    };
    format!(
        r#"{{"resourceType": "Claim", "id": "{id}", "status": "active",
            "created": "2014-08-16T12:31:04Z", "contained": [],
            "patient": {{"reference": "Patient/pat-1"}}, {provider}
            "billablePeriod": {{"start": "2014-08-01", "end": "2014-08-15"}},
            "insurance": [{{"coverage": {{"identifier": {{"value": "INS-77"}}}}}}],
            "diagnosis": [{{"diagnosisCodeableConcept": {{
                "coding": [{{"code": "S06.0"}}],
                "type": [{{"coding": [{{"code": "admitting"}}]}}]}}}}],
            "total": {{"value": {amount}}}}}"#
    )
    .replace('\n', " ")
}

fn claim_line(id: &str, with_provider: bool) -> String {
    claim_line_with_amount(id, with_provider, 1250.75)
}

fn patient_line(id: &str) -> String {
    format!(
        r#"{{"resourceType": "Patient", "id": "{id}", "birthDate": "1961-03-08",
            "meta": {{"lastUpdated": "2020-05-01T10:00:00Z"}},
            "name": [{{"family": "Okafor", "given": ["Amara"]}}]}}"#
    )
    .replace('\n', " ")
}

fn ndjson_file(lines: &[String]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file
}

fn coordinator(
    store: Arc<MemoryHistoryStore>,
    warning_threshold: f64,
    overlap_threshold: f64,
) -> IngestCoordinator {
    IngestCoordinator::new(
        store,
        QualityGate::new(warning_threshold, overlap_threshold),
        IngestOptions::default(),
    )
}

fn patient_record(id: &str) -> ProcessedRecord {
    let mut record = ProcessedRecord::new(1);
    record.push("first_name", FieldValue::Text("Amara".into()));
    record.push("last_name", FieldValue::Text("Okafor".into()));
    record.push("patient_id", FieldValue::Text(id.into()));
    record
}

#[tokio::test]
async fn claim_ingest_lands_current_and_history_rows() {
    let store = Arc::new(MemoryHistoryStore::new());
    let file = ndjson_file(&[claim_line("c-1", true), claim_line("c-2", true)]);

    let summary = coordinator(store.clone(), 50.0, 20.0)
        .ingest_file(ResourceType::Claim, file.path(), Utc::now(), None)
        .await
        .unwrap();

    assert_eq!(summary.rows_processed, 2);
    assert_eq!(summary.warning_count, 0);
    assert_eq!(summary.records_written, 2);
    assert!(summary.gate.passed());

    assert_eq!(store.claims().len(), 2);
    assert_eq!(store.claims_history().len(), 2);
    let first = &store.claims()[0];
    assert_eq!(first.key, "c-1");
    assert_eq!(first.record.text("admitting_diagnosis"), Some("S06.0"));
}

#[tokio::test]
async fn claim_missing_provider_warns_and_lands_null() {
    let store = Arc::new(MemoryHistoryStore::new());
    let file = ndjson_file(&[
        claim_line("c-1", false),
        claim_line("c-2", true),
        claim_line("c-3", true),
    ]);

    // 2 warnings / 3 rows = 66.7%, below the 99% threshold
    let summary = coordinator(store.clone(), 99.0, 20.0)
        .ingest_file(ResourceType::Claim, file.path(), Utc::now(), None)
        .await
        .unwrap();

    // one warning for the required field, one for the mapped value
    assert_eq!(summary.warning_count, 2);
    assert!(summary.gate.passed());
    assert_eq!(summary.records_written, 3);
    assert!(store.claims()[0].record.get("provider").unwrap().is_null());
    assert_eq!(
        store.claims()[1].record.text("provider"),
        Some("Organization/prov-1")
    );
}

#[tokio::test]
async fn gate_rejection_writes_nothing() {
    let store = Arc::new(MemoryHistoryStore::new());
    let file = ndjson_file(&[claim_line("c-1", false)]);

    // 2 warnings / 1 row = 200%, far above a 5% threshold
    let summary = coordinator(store.clone(), 5.0, 20.0)
        .ingest_file(ResourceType::Claim, file.path(), Utc::now(), None)
        .await
        .unwrap();

    assert!(!summary.gate.passed());
    assert_eq!(summary.records_written, 0);
    assert!(store.claims().is_empty());
    assert!(store.claims_history().is_empty());
}

#[tokio::test]
async fn upserting_same_claim_twice_keeps_one_current_two_history() {
    let store = Arc::new(MemoryHistoryStore::new());
    let file = ndjson_file(&[claim_line("c-1", true)]);
    let coordinator = coordinator(store.clone(), 50.0, 20.0);

    coordinator
        .ingest_file(ResourceType::Claim, file.path(), Utc::now(), None)
        .await
        .unwrap();
    let first_insert_ts = store.claims()[0].insert_ts;

    coordinator
        .ingest_file(ResourceType::Claim, file.path(), Utc::now(), None)
        .await
        .unwrap();

    let claims = store.claims();
    let history = store.claims_history();
    assert_eq!(claims.len(), 1);
    assert_eq!(history.len(), 2);
    // the second history row documents when the superseded state was set
    assert_eq!(history[1].insert_ts, first_insert_ts);
    assert_eq!(history[0].insert_ts, first_insert_ts);
    assert!(claims[0].insert_ts >= first_insert_ts);
    assert!(history[1].change_ts >= history[0].change_ts);
}

#[tokio::test]
async fn patient_first_load_passes_with_empty_history() {
    let store = Arc::new(MemoryHistoryStore::new());
    let file = ndjson_file(&[patient_line("p-1"), patient_line("p-2")]);

    // overlap threshold 20% but history is empty: first-load exemption
    let summary = coordinator(store.clone(), 50.0, 20.0)
        .ingest_file(ResourceType::Patient, file.path(), Utc::now(), None)
        .await
        .unwrap();

    assert!(summary.gate.passed());
    assert_eq!(store.patients().len(), 2);
    assert_eq!(store.patients_history().len(), 2);
}

#[tokio::test]
async fn patient_zero_overlap_against_nonempty_history_rejects() {
    let store = Arc::new(MemoryHistoryStore::new());
    store.upsert_patient(&patient_record("p-old"), 0).await.unwrap();

    let file = ndjson_file(&[patient_line("p-new-1"), patient_line("p-new-2")]);
    let summary = coordinator(store.clone(), 50.0, 20.0)
        .ingest_file(ResourceType::Patient, file.path(), Utc::now(), None)
        .await
        .unwrap();

    assert!(!summary.gate.passed());
    // only the preloaded row remains
    assert_eq!(store.patients().len(), 1);
    assert_eq!(store.patients_history().len(), 1);
}

#[tokio::test]
async fn patient_sufficient_overlap_commits() {
    let store = Arc::new(MemoryHistoryStore::new());
    store.upsert_patient(&patient_record("p-1"), 0).await.unwrap();
    store.upsert_patient(&patient_record("p-2"), 1).await.unwrap();

    // 2 of 3 seen before: 66.7% > 20%
    let file = ndjson_file(&[patient_line("p-1"), patient_line("p-2"), patient_line("p-3")]);
    let summary = coordinator(store.clone(), 50.0, 20.0)
        .ingest_file(ResourceType::Patient, file.path(), Utc::now(), None)
        .await
        .unwrap();

    assert!(summary.gate.passed());
    assert_eq!(summary.records_written, 3);
    assert_eq!(store.patients().len(), 3);
    // two pre-seeded history rows plus three from this batch
    assert_eq!(store.patients_history().len(), 5);
}

#[tokio::test]
async fn dry_run_evaluates_gate_without_writing() {
    let store = Arc::new(MemoryHistoryStore::new());
    let file = ndjson_file(&[claim_line("c-1", true)]);

    let options = IngestOptions {
        dry_run: true,
        ..IngestOptions::default()
    };
    let coordinator = IngestCoordinator::new(store.clone(), QualityGate::new(50.0, 20.0), options);

    let summary = coordinator
        .ingest_file(ResourceType::Claim, file.path(), Utc::now(), None)
        .await
        .unwrap();

    assert!(summary.gate.passed());
    assert!(summary.dry_run);
    assert_eq!(summary.records_written, 0);
    assert!(store.claims().is_empty());
}

#[tokio::test]
async fn store_failure_propagates_as_error() {
    let store = Arc::new(MemoryHistoryStore::new());
    store.fail_writes();
    let file = ndjson_file(&[claim_line("c-1", true)]);

    let result = coordinator(store.clone(), 50.0, 20.0)
        .ingest_file(ResourceType::Claim, file.path(), Utc::now(), None)
        .await;

    assert!(matches!(result, Err(StrataError::Store(_))));
}

#[tokio::test]
async fn signaled_shutdown_stops_before_writing() {
    let store = Arc::new(MemoryHistoryStore::new());
    let file = ndjson_file(&[claim_line("c-1", true)]);

    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();

    let result = coordinator(store.clone(), 50.0, 20.0)
        .ingest_file(ResourceType::Claim, file.path(), Utc::now(), Some(rx))
        .await;

    assert!(matches!(result, Err(StrataError::Interrupted(_))));
    assert!(store.claims().is_empty());
}

#[tokio::test]
async fn duplicate_keys_in_one_file_write_in_input_order() {
    let store = Arc::new(MemoryHistoryStore::new());
    let file = ndjson_file(&[
        claim_line_with_amount("c-1", true, 100.0),
        claim_line_with_amount("c-1", true, 200.0),
    ]);

    let summary = coordinator(store.clone(), 50.0, 20.0)
        .ingest_file(ResourceType::Claim, file.path(), Utc::now(), None)
        .await
        .unwrap();

    assert_eq!(summary.records_written, 2);
    let claims = store.claims();
    assert_eq!(claims.len(), 1);
    // the later record in the file wins the current table
    assert_eq!(claims[0].record.number("amount"), Some(200.0));
    assert_eq!(store.claims_history().len(), 2);
}

#[tokio::test]
async fn csv_out_writes_processed_batch_even_on_rejection() {
    let store = Arc::new(MemoryHistoryStore::new());
    let csv_file = NamedTempFile::new().unwrap();
    let file = ndjson_file(&[claim_line("c-1", false)]);

    let options = IngestOptions {
        csv_out: Some(csv_file.path().to_path_buf()),
        ..IngestOptions::default()
    };
    let coordinator = IngestCoordinator::new(store.clone(), QualityGate::new(5.0, 20.0), options);

    let summary = coordinator
        .ingest_file(ResourceType::Claim, file.path(), Utc::now(), None)
        .await
        .unwrap();

    assert!(!summary.gate.passed());
    let contents = std::fs::read_to_string(csv_file.path()).unwrap();
    assert!(contents.starts_with("origin,claim_id,patient_id"));
    assert!(contents.contains("c-1"));
}
