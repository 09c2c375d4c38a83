// crates/aird-pipeline/tests/assess_e2e.rs
// ============================================================================
// Module: Assess Pipeline Tests
// Description: End-to-end assessment runs against seeded SQLite data.
// Purpose: Verify scoring, scoping, persistence, and diff stamping.
// Dependencies: aird-pipeline, aird-core, aird-store-sqlite, rusqlite
// ============================================================================

//! ## Overview
//! Full pipeline runs against a seeded products table with known nulls and
//! duplicates: report structure and the aggregation identity, the expected
//! clean-factor failures, threshold override embedding, context scoping
//! with target workload, dry-run previews, persistence with diff stamping,
//! and data-product roll-ups with the unknown-product error.

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
    clippy::float_cmp,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use aird_core::CancellationToken;
use aird_core::Report;
use aird_pipeline::AssessOutcome;
use aird_pipeline::Pipeline;
use aird_pipeline::PipelineError;
use aird_store_sqlite::AssessmentFilter;
use aird_store_sqlite::HistoryStore;

use crate::common::seed_dirty_products;
use crate::common::test_config;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Runs assess and unwraps the full report.
fn assess_report(pipeline: &Pipeline, config: &aird_pipeline::AssessConfig) -> Report {
    let outcome = pipeline.assess(config, None, &CancellationToken::new()).unwrap();
    match outcome {
        AssessOutcome::Report(report) => *report,
        AssessOutcome::DryRun(_) => panic!("expected a full report"),
    }
}

/// Finds one result row by test id.
fn result_by_id<'a>(report: &'a Report, test_id: &str) -> &'a aird_core::TestResult {
    report
        .results
        .iter()
        .find(|result| result.test_id == test_id)
        .unwrap_or_else(|| panic!("missing result {test_id}"))
}

// ============================================================================
// SECTION: Structure and Clean Failures
// ============================================================================

#[test]
fn dirty_products_fail_null_and_duplicate_probes() {
    let dir = tempfile::tempdir().unwrap();
    let connection = seed_dirty_products(dir.path());
    let pipeline = Pipeline::new().unwrap();
    let report = assess_report(&pipeline, &test_config(&connection, dir.path()));

    assert!(report.summary.total_tests >= 1);
    assert_eq!(report.connection_fingerprint, connection);
    assert!(report.inventory.is_some());

    let null_name = result_by_id(&report, "null_rate|main|products|name");
    let measured = null_name.measured_value.unwrap();
    assert!((measured - 2.0 / 6.0).abs() < 1e-9);
    assert_eq!(null_name.threshold.l1, 0.2);
    assert!(!null_name.l1_pass);
    assert!(!null_name.l2_pass);
    assert!(!null_name.l3_pass);

    let duplicates = result_by_id(&report, "duplicate_rate|main|products");
    let measured = duplicates.measured_value.unwrap();
    assert!((measured - 2.0 / 6.0).abs() < 1e-9);
    assert!(!duplicates.l1_pass);
    assert!(!duplicates.l3_pass);

    // Informational platform probe always passes.
    let discovery = result_by_id(&report, "clean_table_count");
    assert!(discovery.l1_pass && discovery.l2_pass && discovery.l3_pass);

    // Aggregation identity over the whole report.
    let passing = report.results.iter().filter(|result| result.l1_pass).count();
    assert_eq!(report.summary.l1_pass, passing);
    let factor_sum: usize = report.factor_summary.iter().map(|entry| entry.l1_pass).sum();
    assert_eq!(report.summary.l1_pass, factor_sum);
}

#[test]
fn results_retain_their_queries_for_rerun() {
    let dir = tempfile::tempdir().unwrap();
    let connection = seed_dirty_products(dir.path());
    let pipeline = Pipeline::new().unwrap();
    let report = assess_report(&pipeline, &test_config(&connection, dir.path()));
    assert!(report.results.iter().all(|result| result.query.is_some()));
}

// ============================================================================
// SECTION: Threshold Overrides
// ============================================================================

#[test]
fn override_file_tightens_null_rate_everywhere() {
    let dir = tempfile::tempdir().unwrap();
    let connection = seed_dirty_products(dir.path());
    let thresholds_path = dir.path().join("thresholds.json");
    std::fs::write(
        &thresholds_path,
        r#"{"null_rate": {"l1": 0.01, "l2": 0.01, "l3": 0.01}}"#,
    )
    .unwrap();
    let pipeline = Pipeline::new().unwrap();
    let config = aird_pipeline::AssessConfig {
        thresholds_path: Some(thresholds_path),
        ..test_config(&connection, dir.path())
    };
    let report = assess_report(&pipeline, &config);
    for result in report.results.iter().filter(|result| result.requirement == "null_rate") {
        assert_eq!(result.threshold.l1, 0.01);
        assert_eq!(result.threshold.l3, 0.01);
    }
    let null_name = result_by_id(&report, "null_rate|main|products|name");
    assert!(!null_name.l1_pass && !null_name.l2_pass && !null_name.l3_pass);
}

// ============================================================================
// SECTION: Context Scoping
// ============================================================================

#[test]
fn context_scopes_inventory_and_sets_target_workload() {
    let dir = tempfile::tempdir().unwrap();
    let connection = seed_dirty_products(dir.path());
    let context_path = dir.path().join("context.yaml");
    std::fs::write(&context_path, "schemas: [main]\ntarget_level: l2\n").unwrap();
    let pipeline = Pipeline::new().unwrap();
    let config = aird_pipeline::AssessConfig {
        context_path: Some(context_path),
        ..test_config(&connection, dir.path())
    };
    let report = assess_report(&pipeline, &config);
    assert_eq!(report.target_workload.as_deref(), Some("l2"));
    assert_eq!(report.user_context["schemas"][0], "main");
    let inventory = report.inventory.unwrap();
    assert!(inventory.tables.iter().all(|table| table.schema == "main"));
    assert!(!inventory.tables.is_empty());
}

#[test]
fn malformed_context_degrades_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let connection = seed_dirty_products(dir.path());
    let context_path = dir.path().join("context.yaml");
    std::fs::write(&context_path, "{{{{not yaml").unwrap();
    let pipeline = Pipeline::new().unwrap();
    let config = aird_pipeline::AssessConfig {
        context_path: Some(context_path),
        ..test_config(&connection, dir.path())
    };
    let report = assess_report(&pipeline, &config);
    assert!(report.summary.total_tests >= 1);
}

// ============================================================================
// SECTION: Dry Run
// ============================================================================

#[test]
fn dry_run_previews_without_executing_or_persisting() {
    let dir = tempfile::tempdir().unwrap();
    let connection = seed_dirty_products(dir.path());
    let pipeline = Pipeline::new().unwrap();
    let config = aird_pipeline::AssessConfig {
        dry_run: true,
        no_save: false,
        ..test_config(&connection, dir.path())
    };
    let outcome = pipeline.assess(&config, None, &CancellationToken::new()).unwrap();
    let AssessOutcome::DryRun(run) = outcome else {
        panic!("expected a dry-run outcome");
    };
    assert!(run.dry_run);
    assert!(run.results.is_empty());
    assert_eq!(run.preview.len(), run.test_count);
    assert!(run.preview.iter().any(|preview| preview.id.starts_with("null_rate|")));
    // Nothing persisted.
    let store = HistoryStore::open(&common::history_path(dir.path())).unwrap();
    assert!(store.list_assessments(&AssessmentFilter::default()).unwrap().is_empty());
}

// ============================================================================
// SECTION: Persistence and Diffing
// ============================================================================

#[test]
fn persisted_runs_stamp_ids_and_diff_previous() {
    let dir = tempfile::tempdir().unwrap();
    let connection = seed_dirty_products(dir.path());
    let pipeline = Pipeline::new().unwrap();
    let config = aird_pipeline::AssessConfig {
        no_save: false,
        ..test_config(&connection, dir.path())
    };
    let first = assess_report(&pipeline, &config);
    let first_id = first.assessment_id.clone().unwrap();
    assert!(first.diff_previous_id.is_none());

    let config = aird_pipeline::AssessConfig {
        compare: true,
        ..config
    };
    let second = assess_report(&pipeline, &config);
    assert!(second.assessment_id.is_some());
    assert_eq!(second.diff_previous_id.as_deref(), Some(first_id.as_str()));

    // History is append-only: the first report is still fetchable.
    let store = HistoryStore::open(&common::history_path(dir.path())).unwrap();
    let persisted = store.get_report(&first_id).unwrap().unwrap();
    assert_eq!(persisted["summary"]["total_tests"], first.summary.total_tests);
}

#[test]
fn progress_callback_observes_every_result_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let connection = seed_dirty_products(dir.path());
    let pipeline = Pipeline::new().unwrap();
    let mut seen: Vec<(usize, usize, String)> = Vec::new();
    let mut callback = |index: usize, total: usize, result: &aird_core::TestResult| {
        seen.push((index, total, result.test_id.clone()));
    };
    let config = test_config(&connection, dir.path());
    let outcome = pipeline
        .assess(&config, Some(&mut callback), &CancellationToken::new())
        .unwrap();
    let report = outcome.into_report().unwrap();
    assert_eq!(seen.len(), report.results.len());
    for (position, (index, total, test_id)) in seen.iter().enumerate() {
        assert_eq!(*index, position);
        assert_eq!(*total, report.results.len());
        assert_eq!(test_id, &report.results[position].test_id);
    }
}

#[test]
fn cancellation_stops_the_run_without_a_report() {
    let dir = tempfile::tempdir().unwrap();
    let connection = seed_dirty_products(dir.path());
    let pipeline = Pipeline::new().unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let config = aird_pipeline::AssessConfig {
        no_save: false,
        ..test_config(&connection, dir.path())
    };
    let err = pipeline.assess(&config, None, &cancel).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Connection(aird_core::ConnectionError::Cancelled)
    ));
    let store = HistoryStore::open(&common::history_path(dir.path())).unwrap();
    assert!(store.list_assessments(&AssessmentFilter::default()).unwrap().is_empty());
}

// ============================================================================
// SECTION: Data Products
// ============================================================================

#[test]
fn data_products_get_independent_rollups() {
    let dir = tempfile::tempdir().unwrap();
    let connection = seed_dirty_products(dir.path());
    let context_path = dir.path().join("context.yaml");
    std::fs::write(
        &context_path,
        "data_products:\n  - name: catalog\n    tables: [main.products]\n",
    )
    .unwrap();
    let pipeline = Pipeline::new().unwrap();
    let config = aird_pipeline::AssessConfig {
        context_path: Some(context_path),
        ..test_config(&connection, dir.path())
    };
    let report = assess_report(&pipeline, &config);
    let products = report.data_products.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "catalog");
    assert!(products[0].summary.total_tests >= 1);
    // The platform-scoped probe has no table scope and stays out of the
    // product view; the global summary keeps it.
    assert!(products[0].summary.total_tests < report.summary.total_tests);
}

#[test]
fn unknown_product_fails_listing_available_names() {
    let dir = tempfile::tempdir().unwrap();
    let connection = seed_dirty_products(dir.path());
    let context_path = dir.path().join("context.yaml");
    std::fs::write(
        &context_path,
        "data_products:\n  - name: catalog\n    tables: [main.products]\n",
    )
    .unwrap();
    let pipeline = Pipeline::new().unwrap();
    let config = aird_pipeline::AssessConfig {
        context_path: Some(context_path),
        product: Some("warehouse".to_string()),
        ..test_config(&connection, dir.path())
    };
    let err = pipeline.assess(&config, None, &CancellationToken::new()).unwrap_err();
    match err {
        PipelineError::UnknownDataProduct {
            name,
            available,
        } => {
            assert_eq!(name, "warehouse");
            assert!(available.contains("catalog"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

// ============================================================================
// SECTION: Usage Errors
// ============================================================================

#[test]
fn missing_connection_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new().unwrap();
    let config = aird_pipeline::AssessConfig {
        connection: None,
        ..test_config("sqlite://:memory:", dir.path())
    };
    let err = pipeline.assess(&config, None, &CancellationToken::new()).unwrap_err();
    assert!(err.is_usage());
}

#[test]
fn unknown_scheme_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new().unwrap();
    let config = test_config("postgres://host/db", dir.path());
    let err = pipeline.assess(&config, None, &CancellationToken::new()).unwrap_err();
    assert!(err.is_usage());
    assert!(err.to_string().contains("sqlite"));
}
