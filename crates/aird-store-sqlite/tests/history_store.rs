// crates/aird-store-sqlite/tests/history_store.rs
// ============================================================================
// Module: History Store Tests
// Description: Append-only persistence, listing filters, and migrations.
// Purpose: Verify saved reports come back byte-equivalent and ordered.
// Dependencies: aird-store-sqlite, serde_json, tempfile
// ============================================================================

//! ## Overview
//! Covers the history store: save-and-fetch equivalence, newest-first
//! listing with fingerprint and product filters, limit handling, benchmark
//! group round-trips, audit appends, and the additive `data_product`
//! migration applied to a pre-existing file.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use aird_store_sqlite::AssessmentFilter;
use aird_store_sqlite::AuditQueryRecord;
use aird_store_sqlite::HistoryStore;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Builds a small report payload for one fingerprint.
fn sample_report(fingerprint: &str, created_at: &str) -> Value {
    json!({
        "created_at": created_at,
        "connection_fingerprint": fingerprint,
        "summary": {"total_tests": 2, "l1_pass": 1, "l2_pass": 1, "l3_pass": 0,
                     "l1_pct": 50.0, "l2_pct": 50.0, "l3_pct": 0.0},
        "results": [],
    })
}

// ============================================================================
// SECTION: Assessments
// ============================================================================

#[test]
fn saved_reports_fetch_back_equivalent() {
    let store = HistoryStore::open_in_memory().unwrap();
    let report = sample_report("sqlite:///a.db", "2026-07-01T10:00:00Z");
    let id = store.save_assessment(&report, None).unwrap();
    let fetched = store.get_report(&id).unwrap().unwrap();
    assert_eq!(fetched, report);
    // A second fetch is byte-equivalent to the first.
    assert_eq!(store.get_report(&id).unwrap().unwrap(), fetched);
}

#[test]
fn unknown_ids_fetch_none() {
    let store = HistoryStore::open_in_memory().unwrap();
    assert!(store.get_report("no-such-id").unwrap().is_none());
}

#[test]
fn listings_are_newest_first_with_limit() {
    let store = HistoryStore::open_in_memory().unwrap();
    let first = store
        .save_assessment(&sample_report("sqlite:///a.db", "2026-07-01T10:00:00Z"), None)
        .unwrap();
    let second = store
        .save_assessment(&sample_report("sqlite:///a.db", "2026-07-02T10:00:00Z"), None)
        .unwrap();
    let third = store
        .save_assessment(&sample_report("sqlite:///a.db", "2026-07-03T10:00:00Z"), None)
        .unwrap();
    let all = store.list_assessments(&AssessmentFilter::default()).unwrap();
    let ids: Vec<&str> = all.iter().map(|row| row.id.as_str()).collect();
    assert_eq!(ids, vec![third.as_str(), second.as_str(), first.as_str()]);
    let limited = store
        .list_assessments(&AssessmentFilter {
            limit: Some(2),
            ..AssessmentFilter::default()
        })
        .unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].id, third);
}

#[test]
fn listings_filter_by_fingerprint_and_product() {
    let store = HistoryStore::open_in_memory().unwrap();
    store
        .save_assessment(&sample_report("sqlite:///a.db", "2026-07-01T10:00:00Z"), None)
        .unwrap();
    let scoped = store
        .save_assessment(
            &sample_report("sqlite:///b.db", "2026-07-01T11:00:00Z"),
            Some("orders"),
        )
        .unwrap();
    let by_fingerprint = store
        .list_assessments(&AssessmentFilter {
            fingerprint: Some("sqlite:///b.db".to_string()),
            ..AssessmentFilter::default()
        })
        .unwrap();
    assert_eq!(by_fingerprint.len(), 1);
    assert_eq!(by_fingerprint[0].id, scoped);
    assert_eq!(by_fingerprint[0].data_product.as_deref(), Some("orders"));
    let by_product = store
        .list_assessments(&AssessmentFilter {
            data_product: Some("orders".to_string()),
            ..AssessmentFilter::default()
        })
        .unwrap();
    assert_eq!(by_product.len(), 1);
    assert_eq!(by_product[0].id, scoped);
}

#[test]
fn summaries_surface_without_loading_full_reports() {
    let store = HistoryStore::open_in_memory().unwrap();
    store
        .save_assessment(&sample_report("sqlite:///a.db", "2026-07-01T10:00:00Z"), None)
        .unwrap();
    let rows = store.list_assessments(&AssessmentFilter::default()).unwrap();
    assert_eq!(rows[0].summary["total_tests"], 2);
    assert_eq!(rows[0].summary["l1_pct"], 50.0);
}

// ============================================================================
// SECTION: Benchmarks
// ============================================================================

#[test]
fn benchmark_groups_round_trip() {
    let store = HistoryStore::open_in_memory().unwrap();
    let labels = vec!["prod".to_string(), "staging".to_string()];
    let connections = vec!["sqlite:///a.db".to_string(), "sqlite:///b.db".to_string()];
    let ids = vec!["id-a".to_string(), "id-b".to_string()];
    let benchmark_id = store.save_benchmark(&labels, &connections, &ids).unwrap();
    let listed = store.list_benchmarks(10).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, benchmark_id);
    assert_eq!(listed[0].labels, labels);
    assert_eq!(listed[0].connections, connections);
    assert_eq!(listed[0].assessment_ids, ids);
}

// ============================================================================
// SECTION: Audit
// ============================================================================

#[test]
fn audit_queries_append() {
    let store = HistoryStore::open_in_memory().unwrap();
    assert_eq!(store.audit_query_count().unwrap(), 0);
    store
        .write_audit_query(&AuditQueryRecord {
            query: "SELECT 1".to_string(),
            target: Some("platform".to_string()),
            factor: Some("clean".to_string()),
            requirement: Some("table_discovery".to_string()),
            ..AuditQueryRecord::default()
        })
        .unwrap();
    store
        .write_audit_conversation("discovery complete", Some("post_discover"), "agent", None, None)
        .unwrap();
    assert_eq!(store.audit_query_count().unwrap(), 1);
}

// ============================================================================
// SECTION: Migration
// ============================================================================

#[test]
fn reopening_adds_missing_additive_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("assessments.db");
    {
        // Simulate a pre-migration store without the data_product column.
        let connection = rusqlite::Connection::open(&path).unwrap();
        connection
            .execute_batch(
                "CREATE TABLE assessments (
                     id TEXT PRIMARY KEY,
                     created_at TEXT NOT NULL,
                     connection_fingerprint TEXT,
                     report_json TEXT NOT NULL
                 );
                 INSERT INTO assessments VALUES
                     ('old-id', '2026-01-01T00:00:00Z', 'sqlite:///old.db', '{\"summary\":{}}');",
            )
            .unwrap();
    }
    let store = HistoryStore::open(&path).unwrap();
    let rows = store.list_assessments(&AssessmentFilter::default()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, "old-id");
    assert_eq!(rows[0].data_product, None);
    // New saves can populate the migrated column.
    store
        .save_assessment(&sample_report("sqlite:///new.db", "2026-07-01T00:00:00Z"), Some("p"))
        .unwrap();
}
