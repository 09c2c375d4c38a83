// crates/aird-pipeline/src/benchmark.rs
// ============================================================================
// Module: Benchmark Variant
// Description: Independent assessment per connection with a rank matrix.
// Purpose: Compare multiple data sources under shared thresholds.
// Dependencies: aird-core, aird-store-sqlite
// ============================================================================

//! ## Overview
//! Benchmark runs one independent pipeline per connection, on one worker
//! thread each (bounded by the connection count). Labels come from the
//! comma-split `--label` values, padded with basename-derived defaults and
//! truncated to the connection count. A per-pipeline connection failure is
//! captured in its entry without aborting the benchmark. The rank matrix
//! marks the best, worst, and middle L1 percentages per factor; values tied
//! for best rank as neutral. With `save`, each report persists individually
//! and a benchmark group record binds them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use aird_core::CancellationToken;
use aird_core::Factor;
use aird_core::Report;
use aird_core::fingerprint;
use aird_store_sqlite::HistoryStore;

use crate::Pipeline;
use crate::PipelineError;
use crate::config::AssessConfig;

// ============================================================================
// SECTION: Options and Outcome
// ============================================================================

/// Benchmark inputs.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkOptions {
    /// Connection strings (at least two).
    pub connections: Vec<String>,
    /// Raw label values (comma-separated entries allowed).
    pub labels: Vec<String>,
    /// Persist individual reports and a benchmark group when true.
    pub save: bool,
}

/// One benchmarked connection.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkEntry {
    /// Human label for the dataset.
    pub label: String,
    /// Credential-elided connection identity.
    pub connection_fingerprint: String,
    /// The dataset's report, when its pipeline succeeded.
    pub report: Option<Report>,
    /// Pipeline failure, when it did not.
    pub error: Option<String>,
}

/// Rank of one cell within its factor row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankCell {
    /// Strictly best value in the row.
    Best,
    /// Tied for best (neutral rendering).
    TiedBest,
    /// Strictly worst value in the row.
    Worst,
    /// Neither best nor worst.
    Middle,
}

/// One factor row of the rank matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorRankRow {
    /// Factor the row covers.
    pub factor: Factor,
    /// L1 percentage per dataset, in entry order.
    pub l1_pct: Vec<f64>,
    /// Rank per dataset, in entry order.
    pub ranks: Vec<RankCell>,
}

/// Output of the benchmark variant.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkOutcome {
    /// Per-dataset entries in label order.
    pub entries: Vec<BenchmarkEntry>,
    /// Rank matrix rows for factors present in any report.
    pub factor_matrix: Vec<FactorRankRow>,
    /// `(label, overall L1 pct)` sorted best-first.
    pub rankings: Vec<(String, f64)>,
    /// Persisted benchmark group id, when `save` was set.
    pub benchmark_id: Option<String>,
}

// ============================================================================
// SECTION: Labels
// ============================================================================

/// Derives a short label from a connection string basename.
#[must_use]
pub fn label_from_connection(connection: &str) -> String {
    let rest = connection.split_once("://").map_or(connection, |(_, rest)| rest);
    let trimmed = rest.trim_end_matches('/');
    let basename = trimmed.rsplit('/').next().unwrap_or(trimmed);
    let stem = basename.rsplit_once('.').map_or(basename, |(stem, _ext)| stem);
    if stem.is_empty() {
        connection.to_string()
    } else {
        stem.to_string()
    }
}

/// Expands comma-separated labels, padding and truncating to the
/// connection count.
#[must_use]
pub fn resolve_labels(raw: &[String], connections: &[String]) -> Vec<String> {
    let mut expanded: Vec<String> = raw
        .iter()
        .flat_map(|item| item.split(','))
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(String::from)
        .collect();
    for connection in connections.iter().skip(expanded.len()) {
        expanded.push(label_from_connection(connection));
    }
    expanded.truncate(connections.len());
    expanded
}

// ============================================================================
// SECTION: Benchmark
// ============================================================================

/// Runs the benchmark variant across at least two connections.
///
/// # Errors
///
/// Returns [`PipelineError`] when fewer than two connections are given or
/// persistence fails; per-connection pipeline failures are captured in
/// their entries instead.
pub fn run_benchmark(
    pipeline: &Pipeline,
    config: &AssessConfig,
    options: &BenchmarkOptions,
    cancel: &CancellationToken,
) -> Result<BenchmarkOutcome, PipelineError> {
    if options.connections.len() < 2 {
        return Err(PipelineError::Invalid(
            "benchmark requires at least 2 connections (use repeatable -c, e.g. aird benchmark \
             -c conn1 -c conn2)"
                .to_string(),
        ));
    }
    let labels = resolve_labels(&options.labels, &options.connections);

    // One worker per connection; each pipeline owns its own connection.
    let mut entries: Vec<BenchmarkEntry> = std::thread::scope(|scope| {
        let handles: Vec<_> = options
            .connections
            .iter()
            .zip(&labels)
            .map(|(connection, label)| {
                let scoped = AssessConfig {
                    connection: Some(connection.clone()),
                    no_save: true,
                    compare: false,
                    dry_run: false,
                    survey: false,
                    product: None,
                    ..config.clone()
                };
                let label = label.clone();
                let connection = connection.clone();
                scope.spawn(move || {
                    let outcome = pipeline.assess(&scoped, None, cancel);
                    match outcome {
                        Ok(outcome) => BenchmarkEntry {
                            label,
                            connection_fingerprint: fingerprint(&connection),
                            report: outcome.into_report(),
                            error: None,
                        },
                        Err(err) => BenchmarkEntry {
                            label,
                            connection_fingerprint: fingerprint(&connection),
                            report: None,
                            error: Some(err.to_string()),
                        },
                    }
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle.join().unwrap_or_else(|_| BenchmarkEntry {
                    label: String::new(),
                    connection_fingerprint: String::new(),
                    report: None,
                    error: Some("benchmark worker panicked".to_string()),
                })
            })
            .collect()
    });
    // Final rendering sorts by label.
    entries.sort_by(|a, b| a.label.cmp(&b.label));

    let factor_matrix = rank_matrix(&entries);
    let mut rankings: Vec<(String, f64)> = entries
        .iter()
        .map(|entry| (entry.label.clone(), overall_l1(entry)))
        .collect();
    rankings.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let benchmark_id = if options.save {
        Some(persist(&entries, config)?)
    } else {
        None
    };

    Ok(BenchmarkOutcome {
        entries,
        factor_matrix,
        rankings,
        benchmark_id,
    })
}

/// Persists individual reports plus the benchmark group record.
fn persist(entries: &[BenchmarkEntry], config: &AssessConfig) -> Result<String, PipelineError> {
    let store = HistoryStore::open(&config.db_path)?;
    let mut assessment_ids = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(report) = &entry.report else {
            continue;
        };
        let payload = serde_json::to_value(report)
            .map_err(|err| PipelineError::Invalid(err.to_string()))?;
        assessment_ids.push(store.save_assessment(&payload, None)?);
    }
    let labels: Vec<String> = entries.iter().map(|entry| entry.label.clone()).collect();
    let connections: Vec<String> =
        entries.iter().map(|entry| entry.connection_fingerprint.clone()).collect();
    Ok(store.save_benchmark(&labels, &connections, &assessment_ids)?)
}

// ============================================================================
// SECTION: Ranking
// ============================================================================

/// Average L1 percentage across a report's factor roll-ups.
fn overall_l1(entry: &BenchmarkEntry) -> f64 {
    let Some(report) = &entry.report else {
        return 0.0;
    };
    let summaries = &report.factor_summary;
    if summaries.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss, reason = "Factor counts are tiny.")]
    let count = summaries.len() as f64;
    let total: f64 = summaries.iter().map(|entry| entry.l1_pct).sum();
    (total / count * 10.0).round() / 10.0
}

/// Builds the per-factor rank matrix over the entries.
fn rank_matrix(entries: &[BenchmarkEntry]) -> Vec<FactorRankRow> {
    let mut rows = Vec::new();
    for factor in Factor::ALL {
        let mut present = false;
        let l1_pct: Vec<f64> = entries
            .iter()
            .map(|entry| {
                entry.report.as_ref().map_or(0.0, |report| {
                    report
                        .factor_summary
                        .iter()
                        .find(|summary| summary.factor == factor)
                        .map_or(0.0, |summary| {
                            present = true;
                            summary.l1_pct
                        })
                })
            })
            .collect();
        if !present {
            continue;
        }
        rows.push(FactorRankRow {
            ranks: rank_cells(&l1_pct),
            factor,
            l1_pct,
        });
    }
    rows
}

/// Ranks one row of percentages: best, tied-best, worst, or middle.
fn rank_cells(values: &[f64]) -> Vec<RankCell> {
    let best = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let worst = values.iter().copied().fold(f64::INFINITY, f64::min);
    let best_count = values.iter().filter(|value| (**value - best).abs() < f64::EPSILON).count();
    values
        .iter()
        .map(|value| {
            if (best - worst).abs() < f64::EPSILON {
                RankCell::TiedBest
            } else if (*value - best).abs() < f64::EPSILON {
                if best_count > 1 {
                    RankCell::TiedBest
                } else {
                    RankCell::Best
                }
            } else if (*value - worst).abs() < f64::EPSILON {
                RankCell::Worst
            } else {
                RankCell::Middle
            }
        })
        .collect()
}
