// crates/aird-core/tests/report_aggregation.rs
// ============================================================================
// Module: Report Aggregation Tests
// Description: Summary identity, rounding, and data-product roll-ups.
// Purpose: Verify the aggregation invariant holds for every report.
// Dependencies: aird-core, proptest
// ============================================================================

//! ## Overview
//! For each workload level, the global pass count must equal both the sum of
//! the factor roll-ups and the count of passing result rows. Also covers the
//! one-decimal percentage rounding, the zero-total case, and product-scoped
//! views.

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

use aird_core::DataProduct;
use aird_core::Direction;
use aird_core::Factor;
use aird_core::LevelTargets;
use aird_core::Report;
use aird_core::ReportInputs;
use aird_core::TargetType;
use aird_core::TestResult;
use aird_core::build_report;
use proptest::prelude::proptest;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Builds one scored result row.
fn result(test_id: &str, factor: Factor, verdicts: [bool; 3]) -> TestResult {
    TestResult {
        test_id: test_id.to_string(),
        factor,
        requirement: "null_rate".to_string(),
        target_type: TargetType::Column,
        measured_value: Some(0.1),
        threshold: LevelTargets::new(0.2, 0.05, 0.01),
        direction: Direction::Lte,
        l1_pass: verdicts[0],
        l2_pass: verdicts[1],
        l3_pass: verdicts[2],
        error: None,
        query: None,
    }
}

/// Checks the aggregation identity on one report.
fn assert_aggregation_identity(report: &Report) {
    let per_level = |select: &dyn Fn(&TestResult) -> bool| {
        report.results.iter().filter(|row| select(row)).count()
    };
    assert_eq!(report.summary.l1_pass, per_level(&|row| row.l1_pass));
    assert_eq!(report.summary.l2_pass, per_level(&|row| row.l2_pass));
    assert_eq!(report.summary.l3_pass, per_level(&|row| row.l3_pass));
    let sums = report.factor_summary.iter().fold((0, 0, 0), |acc, entry| {
        (acc.0 + entry.l1_pass, acc.1 + entry.l2_pass, acc.2 + entry.l3_pass)
    });
    assert_eq!(report.summary.l1_pass, sums.0);
    assert_eq!(report.summary.l2_pass, sums.1);
    assert_eq!(report.summary.l3_pass, sums.2);
}

// ============================================================================
// SECTION: Aggregation
// ============================================================================

#[test]
fn summary_matches_factor_rollups_and_row_counts() {
    let results = vec![
        result("a|main|t|c1", Factor::Clean, [true, true, false]),
        result("b|main|t|c2", Factor::Clean, [true, false, false]),
        result("c", Factor::Contextual, [false, false, false]),
        result("d", Factor::Compliant, [true, true, true]),
    ];
    let report = build_report(results, ReportInputs::default());
    assert_eq!(report.summary.total_tests, 4);
    assert_eq!(report.summary.l1_pass, 3);
    assert_eq!(report.summary.l2_pass, 2);
    assert_eq!(report.summary.l3_pass, 1);
    assert_aggregation_identity(&report);
}

#[test]
fn factor_summary_is_sorted_by_factor_name() {
    let results = vec![
        result("a", Factor::Current, [true, true, true]),
        result("b", Factor::Clean, [true, true, true]),
        result("c", Factor::Compliant, [true, true, true]),
    ];
    let report = build_report(results, ReportInputs::default());
    let order: Vec<&str> =
        report.factor_summary.iter().map(|entry| entry.factor.as_str()).collect();
    assert_eq!(order, vec!["clean", "compliant", "current"]);
}

#[test]
fn percentages_round_to_one_decimal() {
    let results = vec![
        result("a", Factor::Clean, [true, true, true]),
        result("b", Factor::Clean, [true, false, false]),
        result("c", Factor::Clean, [false, false, false]),
    ];
    let report = build_report(results, ReportInputs::default());
    assert_eq!(report.summary.l1_pct, 66.7);
    assert_eq!(report.summary.l2_pct, 33.3);
    assert_eq!(report.summary.l3_pct, 0.0);
}

#[test]
fn empty_results_report_zero_percent() {
    let report = build_report(Vec::new(), ReportInputs::default());
    assert_eq!(report.summary.total_tests, 0);
    assert_eq!(report.summary.l1_pct, 0.0);
    assert!(report.factor_summary.is_empty());
    assert!(report.data_products.is_none());
}

// ============================================================================
// SECTION: Data Products
// ============================================================================

#[test]
fn product_views_restrict_by_table_and_schema() {
    let results = vec![
        result("null_rate|sales|orders|id", Factor::Clean, [true, true, true]),
        result("null_rate|ops|events|id", Factor::Clean, [false, false, false]),
    ];
    let inputs = ReportInputs {
        data_products: vec![
            DataProduct {
                name: "orders".to_string(),
                schemas: Vec::new(),
                tables: vec!["sales.orders".to_string()],
            },
            DataProduct {
                name: "ops".to_string(),
                schemas: vec!["ops".to_string()],
                tables: Vec::new(),
            },
        ],
        ..ReportInputs::default()
    };
    let report = build_report(results, inputs);
    let products = report.data_products.as_deref().unwrap_or_default();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].name, "orders");
    assert_eq!(products[0].summary.total_tests, 1);
    assert_eq!(products[0].summary.l1_pass, 1);
    assert_eq!(products[1].summary.total_tests, 1);
    assert_eq!(products[1].summary.l1_pass, 0);
    // The top-level summary stays the global aggregate.
    assert_eq!(report.summary.total_tests, 2);
}

// ============================================================================
// SECTION: Property Tests
// ============================================================================

proptest! {
    #[test]
    fn aggregation_identity_holds_for_arbitrary_verdicts(rows in proptest::collection::vec((0u8..6, proptest::bool::ANY, proptest::bool::ANY, proptest::bool::ANY), 0..40)) {
        let results: Vec<TestResult> = rows
            .into_iter()
            .enumerate()
            .map(|(index, (factor_index, l1, l2, l3))| {
                let factor = Factor::ALL[usize::from(factor_index)];
                result(&format!("t{index}"), factor, [l1, l2, l3])
            })
            .collect();
        let report = build_report(results, ReportInputs::default());
        assert_aggregation_identity(&report);
    }
}
