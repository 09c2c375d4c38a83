// crates/aird-pipeline/src/compare.rs
// ============================================================================
// Module: Compare Variant
// Description: Two-table side-by-side assessment comparison.
// Purpose: Run the pipeline per table and pair the factor roll-ups.
// Dependencies: aird-core
// ============================================================================

//! ## Overview
//! Compare splits the table argument into names, runs the full pipeline
//! with each table as the sole scope, and pairs the per-factor roll-ups.
//! Each cell carries an outcome relative to the other table: better when
//! strictly higher, worse when strictly lower, equal otherwise. Comparison
//! is pairwise over the first two tables.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use aird_core::CancellationToken;
use aird_core::Factor;
use aird_core::Report;

use crate::Pipeline;
use crate::PipelineError;
use crate::config::AssessConfig;

// ============================================================================
// SECTION: Comparison Model
// ============================================================================

/// Relative standing of one cell against its counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelOutcome {
    /// Strictly better than the other table.
    Better,
    /// Strictly worse than the other table.
    Worse,
    /// Equal to the other table.
    Equal,
}

impl LevelOutcome {
    /// Compares one percentage against the counterpart.
    #[must_use]
    fn of(own: f64, other: f64) -> Self {
        if own > other {
            Self::Better
        } else if own < other {
            Self::Worse
        } else {
            Self::Equal
        }
    }
}

/// Per-factor comparison row across the two tables.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareRow {
    /// Factor the row covers.
    pub factor: Factor,
    /// Left table L1/L2/L3 percentages.
    pub left_pct: [f64; 3],
    /// Right table L1/L2/L3 percentages.
    pub right_pct: [f64; 3],
    /// Left outcomes per level.
    pub left_outcome: [LevelOutcome; 3],
    /// Right outcomes per level.
    pub right_outcome: [LevelOutcome; 3],
}

/// Output of the compare variant.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareOutcome {
    /// Compared table names (left, right first).
    pub table_names: Vec<String>,
    /// Paired per-factor rows.
    pub rows: Vec<CompareRow>,
    /// Full per-table reports keyed by table name.
    pub reports: BTreeMap<String, Report>,
}

// ============================================================================
// SECTION: Compare
// ============================================================================

/// Splits a comma-separated table argument into trimmed names.
#[must_use]
pub fn parse_table_names(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|name| !name.is_empty()).map(String::from).collect()
}

/// Runs the compare variant over at least two table names.
///
/// # Errors
///
/// Returns [`PipelineError`] when fewer than two names are given or a
/// per-table pipeline fails.
pub fn run_compare(
    pipeline: &Pipeline,
    config: &AssessConfig,
    table_names: &[String],
    cancel: &CancellationToken,
) -> Result<CompareOutcome, PipelineError> {
    if table_names.len() < 2 {
        return Err(PipelineError::Invalid(
            "--tables requires at least two comma-separated table names (e.g. --tables t1,t2)"
                .to_string(),
        ));
    }
    let mut reports = BTreeMap::new();
    for table in table_names {
        let scoped = AssessConfig {
            tables: vec![table.clone()],
            schemas: Vec::new(),
            no_save: true,
            compare: false,
            dry_run: false,
            survey: false,
            product: None,
            ..config.clone()
        };
        let outcome = pipeline.assess(&scoped, None, cancel)?;
        if let Some(report) = outcome.into_report() {
            reports.insert(table.clone(), report);
        }
    }
    let rows = pair_rows(&reports, &table_names[0], &table_names[1]);
    Ok(CompareOutcome {
        table_names: table_names.to_vec(),
        rows,
        reports,
    })
}

/// Pairs the factor roll-ups of the first two tables.
fn pair_rows(
    reports: &BTreeMap<String, Report>,
    left: &str,
    right: &str,
) -> Vec<CompareRow> {
    let percentages = |name: &str| -> BTreeMap<Factor, [f64; 3]> {
        reports.get(name).map_or_else(BTreeMap::new, |report| {
            report
                .factor_summary
                .iter()
                .map(|entry| (entry.factor, [entry.l1_pct, entry.l2_pct, entry.l3_pct]))
                .collect()
        })
    };
    let left_stats = percentages(left);
    let right_stats = percentages(right);
    let mut factors: Vec<Factor> = Factor::ALL
        .into_iter()
        .filter(|factor| left_stats.contains_key(factor) || right_stats.contains_key(factor))
        .collect();
    factors.sort();
    factors
        .into_iter()
        .map(|factor| {
            let left_pct = left_stats.get(&factor).copied().unwrap_or_default();
            let right_pct = right_stats.get(&factor).copied().unwrap_or_default();
            let left_outcome = [
                LevelOutcome::of(left_pct[0], right_pct[0]),
                LevelOutcome::of(left_pct[1], right_pct[1]),
                LevelOutcome::of(left_pct[2], right_pct[2]),
            ];
            let right_outcome = [
                LevelOutcome::of(right_pct[0], left_pct[0]),
                LevelOutcome::of(right_pct[1], left_pct[1]),
                LevelOutcome::of(right_pct[2], left_pct[2]),
            ];
            CompareRow {
                factor,
                left_pct,
                right_pct,
                left_outcome,
                right_outcome,
            }
        })
        .collect()
}
