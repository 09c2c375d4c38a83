// crates/aird-pipeline/src/rerun.rs
// ============================================================================
// Module: Rerun Variant
// Description: Re-execution of previously failed probes with deltas.
// Purpose: Show level-by-level transitions after remediation work.
// Dependencies: aird-core, aird-platform, aird-store-sqlite
// ============================================================================

//! ## Overview
//! Rerun loads the most recent (or an explicit) persisted assessment,
//! collects every result that failed at any level, and re-executes the
//! stored SQL against a fresh connection. Results without a stored query
//! cannot re-execute and stay failing. The delta is keyed by test id and
//! shows one transition per level: `FIXED` (was failing, now passes),
//! `STILL_FAIL` (was failing, still fails), or `OK` (was already passing).

// ============================================================================
// SECTION: Imports
// ============================================================================

use aird_core::CancellationToken;
use aird_core::Factor;
use aird_core::ScalarValue;
use aird_core::TestResult;
use aird_core::Thresholds;
use aird_platform::execute_readonly;
use aird_store_sqlite::AssessmentFilter;
use aird_store_sqlite::HistoryStore;

use crate::Pipeline;
use crate::PipelineError;
use crate::config::AssessConfig;

// ============================================================================
// SECTION: Delta Model
// ============================================================================

/// Per-level transition in a rerun delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelTransition {
    /// Was failing, now passes.
    Fixed,
    /// Was failing, still fails.
    StillFail,
    /// Was already passing.
    Ok,
}

impl LevelTransition {
    /// Returns the rendering label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fixed => "FIXED",
            Self::StillFail => "STILL_FAIL",
            Self::Ok => "OK",
        }
    }
}

/// One rerun delta row.
#[derive(Debug, Clone, PartialEq)]
pub struct RerunDelta {
    /// Scope-encoded probe identifier.
    pub test_id: String,
    /// Owning factor.
    pub factor: Factor,
    /// Verdicts recorded by the original assessment (L1, L2, L3).
    pub was: [bool; 3],
    /// Verdicts after re-execution (L1, L2, L3).
    pub now: [bool; 3],
    /// Re-execution error, when the probe could not run.
    pub error: Option<String>,
}

impl RerunDelta {
    /// Returns the transition for one level index (0 = L1).
    #[must_use]
    pub fn transition(&self, level: usize) -> LevelTransition {
        let was = self.was.get(level).copied().unwrap_or(false);
        let now = self.now.get(level).copied().unwrap_or(false);
        match (was, now) {
            (false, true) => LevelTransition::Fixed,
            (false, false) => LevelTransition::StillFail,
            (true, _) => LevelTransition::Ok,
        }
    }
}

// ============================================================================
// SECTION: Rerun
// ============================================================================

/// Runs the rerun variant and returns the delta rows.
///
/// With no explicit id, the most recent persisted assessment for the store
/// is used. An empty delta means the source assessment had no failures.
///
/// # Errors
///
/// Returns [`PipelineError`] when no assessment exists, the referenced one
/// is missing, or connecting fails.
pub fn run_rerun(
    pipeline: &Pipeline,
    config: &AssessConfig,
    rerun_id: Option<&str>,
    cancel: &CancellationToken,
) -> Result<Vec<RerunDelta>, PipelineError> {
    let connection_string =
        config.connection.as_deref().ok_or(PipelineError::MissingConnection)?;

    let store = HistoryStore::open(&config.db_path)?;
    let report = load_source_report(&store, rerun_id)?;
    let failed: Vec<TestResult> = report
        .get("results")
        .and_then(serde_json::Value::as_array)
        .map(|rows| {
            rows.iter()
                .filter_map(|row| serde_json::from_value::<TestResult>(row.clone()).ok())
                .filter(TestResult::failed_any_level)
                .collect()
        })
        .unwrap_or_default();
    if failed.is_empty() {
        return Ok(Vec::new());
    }

    let thresholds = pipeline.thresholds_for(config);
    let connection = pipeline.platforms().connect(connection_string)?;

    let mut deltas = Vec::with_capacity(failed.len());
    for original in &failed {
        cancel.check()?;
        let was = [original.l1_pass, original.l2_pass, original.l3_pass];
        let delta = match &original.query {
            None => RerunDelta {
                test_id: original.test_id.clone(),
                factor: original.factor,
                was,
                now: [false, false, false],
                error: Some("no query stored".to_string()),
            },
            Some(query) => match execute_readonly(connection.as_ref(), query, &[]) {
                Ok(rows) => {
                    let measured =
                        rows.first().and_then(|row| row.first()).and_then(ScalarValue::as_f64);
                    let now = score(&thresholds, &original.requirement, measured);
                    RerunDelta {
                        test_id: original.test_id.clone(),
                        factor: original.factor,
                        was,
                        now,
                        error: None,
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        test_id = %original.test_id,
                        error = %err,
                        "re-run failed for probe"
                    );
                    RerunDelta {
                        test_id: original.test_id.clone(),
                        factor: original.factor,
                        was,
                        now: [false, false, false],
                        error: Some(err.to_string()),
                    }
                }
            },
        };
        deltas.push(delta);
    }
    Ok(deltas)
}

/// Loads the source assessment (explicit id or most recent).
fn load_source_report(
    store: &HistoryStore,
    rerun_id: Option<&str>,
) -> Result<serde_json::Value, PipelineError> {
    match rerun_id {
        Some(id) => store
            .get_report(id)?
            .ok_or_else(|| PipelineError::AssessmentNotFound(id.to_string())),
        None => {
            let latest = store.list_assessments(&AssessmentFilter {
                limit: Some(1),
                ..AssessmentFilter::default()
            })?;
            let Some(summary) = latest.into_iter().next() else {
                return Err(PipelineError::Invalid(
                    "no saved assessments found; run `aird assess` first".to_string(),
                ));
            };
            store
                .get_report(&summary.id)?
                .ok_or_else(|| PipelineError::AssessmentNotFound(summary.id))
        }
    }
}

/// Scores a measured value at all three levels.
fn score(thresholds: &Thresholds, requirement: &str, measured: Option<f64>) -> [bool; 3] {
    thresholds.verdicts(requirement, measured)
}
