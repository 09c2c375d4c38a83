// crates/aird-pipeline/src/runner.rs
// ============================================================================
// Module: Test Runner
// Description: Sequential probe execution with tri-level scoring.
// Purpose: Turn expanded tests into scored results without aborting.
// Dependencies: aird-core, aird-platform
// ============================================================================

//! ## Overview
//! The runner expands the resolved suite against the inventory and executes
//! each probe in expansion order on the shared connection. The measured
//! value is the first column of the first row, projected to a float; each
//! result records the threshold triple, direction, and all three level
//! verdicts. Executor failures become failing results carrying the error
//! string and never abort the run; only cancellation stops it. The progress
//! callback fires synchronously after each probe, observing the same order
//! as the results. The runner does not retry failed probes; that is the
//! `rerun` variant's job.

// ============================================================================
// SECTION: Imports
// ============================================================================

use aird_core::AuditSink;
use aird_core::CancellationToken;
use aird_core::Connection;
use aird_core::ConnectionError;
use aird_core::Factor;
use aird_core::Inventory;
use aird_core::RunOutcome;
use aird_core::TestDefinition;
use aird_core::TestPreview;
use aird_core::TestResult;
use aird_core::Thresholds;
use aird_core::expand_tests;
use aird_platform::execute_readonly;

// ============================================================================
// SECTION: Options
// ============================================================================

/// Progress callback invoked after each probe with `(index, total, result)`.
pub type ProgressFn<'a> = dyn FnMut(usize, usize, &TestResult) + 'a;

/// Runner options beyond the data inputs.
#[derive(Default)]
pub struct RunOptions<'a> {
    /// Preview expansion without executing when true.
    pub dry_run: bool,
    /// Optional single-factor filter applied before expansion.
    pub factor_filter: Option<Factor>,
    /// Optional audit sink receiving executed SQL.
    pub audit: Option<&'a dyn AuditSink>,
    /// Cancellation token observed before every probe.
    pub cancel: CancellationToken,
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Executes a resolved suite against an inventory and scores each probe.
///
/// An empty suite yields an empty outcome. With `dry_run` the outcome
/// carries previews only and nothing executes.
///
/// # Errors
///
/// Returns [`ConnectionError::Cancelled`] when the run is cancelled;
/// per-probe failures are recorded in the results instead of returned.
pub fn run_tests(
    connection: &dyn Connection,
    tests: &[TestDefinition],
    inventory: &Inventory,
    thresholds: &Thresholds,
    options: &RunOptions<'_>,
    mut progress: Option<&mut ProgressFn<'_>>,
) -> Result<RunOutcome, ConnectionError> {
    if tests.is_empty() {
        return Ok(RunOutcome {
            dry_run: options.dry_run,
            ..RunOutcome::default()
        });
    }
    let expanded = expand_tests(tests, inventory, connection, options.factor_filter);
    let total = expanded.len();
    if options.dry_run {
        return Ok(RunOutcome {
            results: Vec::new(),
            dry_run: true,
            test_count: total,
            preview: expanded
                .iter()
                .map(|test| TestPreview {
                    id: test.id.clone(),
                    factor: test.factor,
                    requirement: test.requirement.clone(),
                    target_type: test.target_type,
                })
                .collect(),
        });
    }
    let mut results = Vec::with_capacity(total);
    for (index, test) in expanded.iter().enumerate() {
        options.cancel.check()?;
        let result = match execute_readonly(connection, &test.query, &[]) {
            Ok(rows) => {
                if let Some(sink) = options.audit {
                    sink.log_query(&test.query, test.target_type, test.factor, &test.requirement);
                }
                let measured = rows
                    .first()
                    .and_then(|row| row.first())
                    .and_then(aird_core::ScalarValue::as_f64);
                let verdicts = thresholds.verdicts(&test.requirement, measured);
                TestResult {
                    test_id: test.id.clone(),
                    factor: test.factor,
                    requirement: test.requirement.clone(),
                    target_type: test.target_type,
                    measured_value: measured,
                    threshold: thresholds.targets_for(&test.requirement),
                    direction: thresholds.direction(&test.requirement),
                    l1_pass: verdicts[0],
                    l2_pass: verdicts[1],
                    l3_pass: verdicts[2],
                    error: None,
                    query: Some(test.query.clone()),
                }
            }
            Err(ConnectionError::Cancelled) => return Err(ConnectionError::Cancelled),
            Err(err) => TestResult {
                test_id: test.id.clone(),
                factor: test.factor,
                requirement: test.requirement.clone(),
                target_type: test.target_type,
                measured_value: None,
                threshold: thresholds.targets_for(&test.requirement),
                direction: thresholds.direction(&test.requirement),
                l1_pass: false,
                l2_pass: false,
                l3_pass: false,
                error: Some(err.to_string()),
                query: Some(test.query.clone()),
            },
        };
        if let Some(callback) = progress.as_deref_mut() {
            callback(index, total, &result);
        }
        results.push(result);
    }
    Ok(RunOutcome {
        test_count: results.len(),
        results,
        dry_run: false,
        preview: Vec::new(),
    })
}
