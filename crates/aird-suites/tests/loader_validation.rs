// crates/aird-suites/tests/loader_validation.rs
// ============================================================================
// Module: Suite Loader Tests
// Description: Document validation and atomic-registration checks.
// Purpose: Verify one invalid test rejects its whole document.
// Dependencies: aird-suites, aird-core, tempfile
// ============================================================================

//! ## Overview
//! Covers the YAML suite loader: field validation with aggregated messages,
//! the exactly-one-query rule, atomic per-document registration, additive
//! registration in file-name sorted order, and the built-in suites.

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

use aird_core::QuerySource;
use aird_suites::SuiteError;
use aird_suites::SuiteRegistry;
use aird_suites::loader::load_suite_dir;
use aird_suites::loader::parse_document;

// ============================================================================
// SECTION: Parsing and Validation
// ============================================================================

#[test]
fn parses_a_minimal_document() {
    let text = r"
suite_name: probe_suite
platform: sqlite
tests:
  - id: null_rate
    factor: clean
    requirement: null_rate
    target_type: column
    query_template: SELECT 1 FROM {schema_q}.{table_q}
";
    let document = parse_document(text, "probe_suite.yaml").unwrap();
    assert_eq!(document.suite_name, "probe_suite");
    assert_eq!(document.tests.len(), 1);
    assert!(matches!(document.tests[0].source, QuerySource::Template(_)));
}

#[test]
fn rejects_missing_suite_name() {
    let text = r"
tests:
  - id: a
    factor: clean
    requirement: null_rate
    target_type: column
    query: SELECT 1
";
    let err = parse_document(text, "broken.yaml").unwrap_err();
    assert!(err.to_string().contains("suite_name"));
}

#[test]
fn rejects_both_query_forms_on_one_test() {
    let text = r"
suite_name: s
tests:
  - id: a
    factor: clean
    requirement: null_rate
    target_type: column
    query: SELECT 1
    query_template: SELECT 2
";
    let err = parse_document(text, "both.yaml").unwrap_err();
    assert!(err.to_string().contains("cannot have both"));
}

#[test]
fn rejects_neither_query_form() {
    let text = r"
suite_name: s
tests:
  - id: a
    factor: clean
    requirement: null_rate
    target_type: column
";
    let err = parse_document(text, "neither.yaml").unwrap_err();
    assert!(err.to_string().contains("must have 'query' or 'query_template'"));
}

#[test]
fn rejects_invalid_target_type_and_reports_every_error() {
    let text = r"
suite_name: s
tests:
  - id: a
    factor: clean
    requirement: null_rate
    target_type: galaxy
    query: SELECT 1
  - id: b
    factor: clean
    requirement: null_rate
    target_type: column
";
    let err = parse_document(text, "multi.yaml").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("test[0]"));
    assert!(message.contains("galaxy"));
    assert!(message.contains("test[1]"));
}

#[test]
fn rejects_empty_document_without_extends() {
    let err = parse_document("suite_name: s\ntests: []\n", "empty.yaml").unwrap_err();
    assert!(matches!(err, SuiteError::Invalid { .. }));
}

#[test]
fn accepts_extends_only_documents() {
    let document = parse_document("suite_name: s\nextends: [common]\n", "ext.yaml").unwrap();
    assert_eq!(document.extends, vec!["common".to_string()]);
    assert!(document.tests.is_empty());
}

// ============================================================================
// SECTION: Registration
// ============================================================================

#[test]
fn invalid_document_registers_nothing() {
    let registry = SuiteRegistry::new();
    let text = r"
suite_name: s
tests:
  - id: good
    factor: clean
    requirement: null_rate
    target_type: column
    query: SELECT 1
  - id: bad
    factor: clean
    requirement: null_rate
    target_type: column
";
    assert!(parse_document(text, "partial.yaml").is_err());
    assert!(registry.resolve("s").is_empty());
    assert!(!registry.is_registered("s"));
}

#[test]
fn directory_loading_appends_in_sorted_order() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("b_second.yaml"),
        "suite_name: merged\ntests:\n  - {id: two, factor: clean, requirement: null_rate, \
         target_type: platform, query: SELECT 2}\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("a_first.yaml"),
        "suite_name: merged\ntests:\n  - {id: one, factor: clean, requirement: null_rate, \
         target_type: platform, query: SELECT 1}\n",
    )
    .unwrap();
    let mut registry = SuiteRegistry::new();
    let loaded = load_suite_dir(&mut registry, dir.path());
    assert_eq!(loaded, 2);
    let ids: Vec<String> =
        registry.resolve("merged").iter().map(|test| test.id.clone()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["one", "two"]);
}

#[test]
fn bad_file_is_skipped_and_the_rest_load() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a_bad.yaml"), "suite_name: [\n").unwrap();
    std::fs::write(
        dir.path().join("b_good.yaml"),
        "suite_name: ok\ntests:\n  - {id: one, factor: clean, requirement: null_rate, \
         target_type: platform, query: SELECT 1}\n",
    )
    .unwrap();
    let mut registry = SuiteRegistry::new();
    let loaded = load_suite_dir(&mut registry, dir.path());
    assert_eq!(loaded, 1);
    assert_eq!(registry.resolve("ok").len(), 1);
}

// ============================================================================
// SECTION: Built-in Suites
// ============================================================================

#[test]
fn builtin_suites_register_cleanly() {
    let registry = SuiteRegistry::with_builtin_suites().unwrap();
    let names = registry.suite_names();
    assert!(names.contains(&"common".to_string()));
    assert!(names.contains(&"common_sqlite".to_string()));
    assert!(names.contains(&"common_snowflake".to_string()));
    assert_eq!(registry.resolve("common_sqlite").len(), 6);
    // Clean tests precede the contextual append.
    let snowflake = registry.resolve("common_snowflake");
    assert_eq!(snowflake.len(), 7);
    assert_eq!(snowflake[0].id, "clean_table_count");
    assert_eq!(snowflake[3].id, "primary_key_defined");
}
