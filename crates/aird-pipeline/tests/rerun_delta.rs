// crates/aird-pipeline/tests/rerun_delta.rs
// ============================================================================
// Module: Rerun Delta Tests
// Description: Failed-probe re-execution with level transitions.
// Purpose: Verify STILL_FAIL before fixes and FIXED after them.
// Dependencies: aird-pipeline, aird-core, rusqlite
// ============================================================================

//! ## Overview
//! Runs an assessment against the dirty products table, persists it, and
//! reruns its failures. Without fixes the null-rate probe stays failing at
//! every level; after inserting enough non-null rows to push the ratio to
//! one percent, the same probe moves to FIXED at all three levels.

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

mod common;

use aird_core::CancellationToken;
use aird_pipeline::LevelTransition;
use aird_pipeline::Pipeline;
use aird_pipeline::PipelineError;
use aird_pipeline::rerun::run_rerun;

use crate::common::seed_dirty_products;
use crate::common::test_config;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Persists one assessment of the dirty table and returns its id.
fn assess_and_save(
    pipeline: &Pipeline,
    config: &aird_pipeline::AssessConfig,
) -> String {
    let outcome = pipeline.assess(config, None, &CancellationToken::new()).unwrap();
    outcome.into_report().unwrap().assessment_id.unwrap()
}

// ============================================================================
// SECTION: Transitions
// ============================================================================

#[test]
fn unfixed_failures_stay_still_fail() {
    let dir = tempfile::tempdir().unwrap();
    let connection = seed_dirty_products(dir.path());
    let pipeline = Pipeline::new().unwrap();
    let config = aird_pipeline::AssessConfig {
        no_save: false,
        ..test_config(&connection, dir.path())
    };
    assess_and_save(&pipeline, &config);

    let deltas = run_rerun(&pipeline, &config, None, &CancellationToken::new()).unwrap();
    let null_name = deltas
        .iter()
        .find(|delta| delta.test_id == "null_rate|main|products|name")
        .unwrap();
    assert_eq!(null_name.transition(0), LevelTransition::StillFail);
    assert_eq!(null_name.transition(1), LevelTransition::StillFail);
    assert_eq!(null_name.transition(2), LevelTransition::StillFail);
}

#[test]
fn fixed_failures_move_to_fixed_at_all_levels() {
    let dir = tempfile::tempdir().unwrap();
    let connection = seed_dirty_products(dir.path());
    let pipeline = Pipeline::new().unwrap();
    let config = aird_pipeline::AssessConfig {
        no_save: false,
        ..test_config(&connection, dir.path())
    };
    assess_and_save(&pipeline, &config);

    // Bring the null ratio down to 2/200 = 0.01 with distinct rows.
    let path = connection.trim_start_matches("sqlite://").to_string();
    let raw = rusqlite::Connection::open(path).unwrap();
    for id in 100 .. 294_i64 {
        raw.execute(
            "INSERT INTO products (id, name, amount) VALUES (?1, ?2, ?3)",
            rusqlite::params![id, format!("fill-{id}"), 10.0 + id as f64],
        )
        .unwrap();
    }
    drop(raw);

    let deltas = run_rerun(&pipeline, &config, None, &CancellationToken::new()).unwrap();
    let null_name = deltas
        .iter()
        .find(|delta| delta.test_id == "null_rate|main|products|name")
        .unwrap();
    assert_eq!(null_name.transition(0), LevelTransition::Fixed);
    assert_eq!(null_name.transition(1), LevelTransition::Fixed);
    assert_eq!(null_name.transition(2), LevelTransition::Fixed);
}

// ============================================================================
// SECTION: Edge Cases
// ============================================================================

#[test]
fn assessment_without_failures_yields_an_empty_delta() {
    let dir = tempfile::tempdir().unwrap();
    let connection = common::seed_clean_products(dir.path());
    let pipeline = Pipeline::new().unwrap();
    // The sqlite suite has no compliant-factor tests, so this filtered run
    // scores zero probes and records no failures to rerun.
    let config = aird_pipeline::AssessConfig {
        no_save: false,
        factor_filter: Some(aird_core::Factor::Compliant),
        ..test_config(&connection, dir.path())
    };
    let outcome = pipeline.assess(&config, None, &CancellationToken::new()).unwrap();
    let report = outcome.into_report().unwrap();
    assert_eq!(report.summary.total_tests, 0);
    let deltas = run_rerun(&pipeline, &config, None, &CancellationToken::new()).unwrap();
    assert!(deltas.is_empty());
}

#[test]
fn missing_history_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let connection = seed_dirty_products(dir.path());
    let pipeline = Pipeline::new().unwrap();
    let config = test_config(&connection, dir.path());
    let err = run_rerun(&pipeline, &config, None, &CancellationToken::new()).unwrap_err();
    assert!(matches!(err, PipelineError::Invalid(_)));
}

#[test]
fn explicit_unknown_id_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let connection = seed_dirty_products(dir.path());
    let pipeline = Pipeline::new().unwrap();
    let config = aird_pipeline::AssessConfig {
        no_save: false,
        ..test_config(&connection, dir.path())
    };
    assess_and_save(&pipeline, &config);
    let err = run_rerun(&pipeline, &config, Some("missing-id"), &CancellationToken::new())
        .unwrap_err();
    assert!(matches!(err, PipelineError::AssessmentNotFound(_)));
}
