// crates/aird-cli/src/render.rs
// ============================================================================
// Module: Plain Rendering
// Description: Markdown and tab-separated renderings of engine artifacts.
// Purpose: Human-readable output without a terminal UI dependency.
// Dependencies: aird-core, aird-pipeline, aird-store-sqlite
// ============================================================================

//! ## Overview
//! Plain renderers for the report, dry-run preview, history, diff, rerun
//! delta, compare rows, benchmark matrix, and remediation suggestions. The
//! machine-readable JSON path bypasses these entirely; everything here is
//! for human eyes and stays free of terminal control sequences.

// ============================================================================
// SECTION: Imports
// ============================================================================

use aird_core::Report;
use aird_core::RunOutcome;
use aird_pipeline::BenchmarkOutcome;
use aird_pipeline::CompareOutcome;
use aird_pipeline::FixSuggestion;
use aird_pipeline::LevelOutcome;
use aird_pipeline::RankCell;
use aird_pipeline::RerunDelta;
use aird_store_sqlite::AssessmentSummary;
use aird_store_sqlite::BenchmarkRecord;

// ============================================================================
// SECTION: Report
// ============================================================================

/// Renders a report as markdown.
#[must_use]
pub fn report_to_markdown(report: &Report) -> String {
    let summary = &report.summary;
    let mut lines = vec![
        "# AI-Ready Data Assessment Report".to_string(),
        String::new(),
        format!("**Created:** {}", report.created_at),
        format!("**Connection:** {}", report.connection_fingerprint),
    ];
    if let Some(workload) = &report.target_workload {
        lines.push(format!("**Target workload:** {workload}"));
    }
    lines.extend([
        String::new(),
        "## Summary".to_string(),
        format!("- Total tests: {}", summary.total_tests),
        format!("- L1 pass: {} ({}%)", summary.l1_pass, summary.l1_pct),
        format!("- L2 pass: {} ({}%)", summary.l2_pass, summary.l2_pct),
        format!("- L3 pass: {} ({}%)", summary.l3_pass, summary.l3_pct),
        String::new(),
        "## Factors".to_string(),
        "| Factor | Tests | L1% | L2% | L3% |".to_string(),
        "|---|---|---|---|---|".to_string(),
    ]);
    for factor in &report.factor_summary {
        lines.push(format!(
            "| {} | {} | {}% | {}% | {}% |",
            factor.factor, factor.total, factor.l1_pct, factor.l2_pct, factor.l3_pct
        ));
    }
    if let Some(products) = &report.data_products {
        lines.push(String::new());
        lines.push("## Data Products".to_string());
        for product in products {
            lines.push(format!(
                "- **{}**: {} tests, L1 {}%, L2 {}%, L3 {}%",
                product.name,
                product.summary.total_tests,
                product.summary.l1_pct,
                product.summary.l2_pct,
                product.summary.l3_pct
            ));
        }
    }
    if let Some(questions) = &report.question_results {
        lines.push(String::new());
        lines.push("## Survey".to_string());
        for question in questions {
            let status = if question.l1_pass { "PASS" } else { "FAIL" };
            lines.push(format!(
                "- {} / {}: {} [{}]",
                question.factor, question.requirement, question.answer, status
            ));
        }
    }
    lines.push(String::new());
    lines.push("## Results".to_string());
    lines.push(String::new());
    for result in &report.results {
        let status = if result.l1_pass { "PASS" } else { "FAIL" };
        lines.push(format!(
            "- **{}** ({}/{}): {}",
            result.test_id, result.factor, result.requirement, status
        ));
    }
    lines.join("\n")
}

// ============================================================================
// SECTION: Dry Run
// ============================================================================

/// Sample size shown at the bottom of a dry-run preview.
const PREVIEW_SAMPLE: usize = 5;

/// Renders a dry-run preview as plain text.
#[must_use]
pub fn dry_run_preview(connection: &str, outcome: &RunOutcome) -> String {
    let mut lines = vec![
        format!("Dry-run preview for: {connection}"),
        format!("Planned probes: {}", outcome.test_count),
        String::new(),
    ];
    for preview in outcome.preview.iter().take(PREVIEW_SAMPLE) {
        lines.push(format!(
            "  - {} ({}/{}) [{}]",
            preview.id, preview.factor, preview.requirement, preview.target_type
        ));
    }
    if outcome.preview.len() > PREVIEW_SAMPLE {
        lines.push(format!("  ... and {} more", outcome.preview.len() - PREVIEW_SAMPLE));
    }
    lines.push(String::new());
    lines.push("No queries will be executed. Run without --dry-run to assess.".to_string());
    lines.join("\n")
}

// ============================================================================
// SECTION: History and Diff
// ============================================================================

/// Renders one history listing line.
#[must_use]
pub fn history_line(summary: &AssessmentSummary) -> String {
    let pct = |key: &str| {
        summary
            .summary
            .get(key)
            .and_then(serde_json::Value::as_f64)
            .unwrap_or_default()
    };
    let product_suffix = summary
        .data_product
        .as_deref()
        .map_or_else(String::new, |product| format!("\t{product}"));
    format!(
        "{}\t{}\tL1:{}%\tL2:{}%\tL3:{}%\t{}{}",
        summary.id,
        summary.created_at,
        pct("l1_pct"),
        pct("l2_pct"),
        pct("l3_pct"),
        summary.connection_fingerprint,
        product_suffix
    )
}

/// Renders the two-line diff summary.
#[must_use]
pub fn diff_lines(left: &serde_json::Value, right: &serde_json::Value) -> Vec<String> {
    let pct = |report: &serde_json::Value, key: &str| {
        report["summary"][key].as_f64().unwrap_or_default()
    };
    vec![
        format!(
            "Left:  L1={}% L2={}% L3={}%",
            pct(left, "l1_pct"),
            pct(left, "l2_pct"),
            pct(left, "l3_pct")
        ),
        format!(
            "Right: L1={}% L2={}% L3={}%",
            pct(right, "l1_pct"),
            pct(right, "l2_pct"),
            pct(right, "l3_pct")
        ),
    ]
}

// ============================================================================
// SECTION: Rerun Delta
// ============================================================================

/// Renders rerun delta rows as tab-separated lines.
#[must_use]
pub fn rerun_lines(deltas: &[RerunDelta]) -> Vec<String> {
    let mut lines = Vec::with_capacity(deltas.len() + 1);
    for delta in deltas {
        let status: Vec<String> = (0 .. 3)
            .map(|level| format!("L{}:{}", level + 1, delta.transition(level).as_str()))
            .collect();
        lines.push(format!("{}\t{}\t{}", delta.test_id, delta.factor, status.join(" ")));
    }
    let fixed = deltas
        .iter()
        .filter(|delta| {
            (0 .. 3).all(|level| {
                delta.transition(level) != aird_pipeline::LevelTransition::StillFail
            })
        })
        .count();
    lines.push(format!(
        "Fixed: {fixed}  Still failing: {}  Total re-run: {}",
        deltas.len() - fixed,
        deltas.len()
    ));
    lines
}

// ============================================================================
// SECTION: Compare
// ============================================================================

/// Renders compare rows as tab-separated lines with cell markers.
#[must_use]
pub fn compare_lines(outcome: &CompareOutcome) -> Vec<String> {
    let marker = |cell: LevelOutcome| match cell {
        LevelOutcome::Better => "+",
        LevelOutcome::Worse => "-",
        LevelOutcome::Equal => "=",
    };
    let mut lines = vec![format!(
        "Factor\t{} L1%\t{} L1%",
        outcome.table_names.first().map_or("left", String::as_str),
        outcome.table_names.get(1).map_or("right", String::as_str),
    )];
    for row in &outcome.rows {
        lines.push(format!(
            "{}\t{}% ({})\t{}% ({})",
            row.factor,
            row.left_pct[0],
            marker(row.left_outcome[0]),
            row.right_pct[0],
            marker(row.right_outcome[0]),
        ));
    }
    lines
}

// ============================================================================
// SECTION: Benchmark
// ============================================================================

/// Renders the benchmark matrix and summary as plain lines.
#[must_use]
pub fn benchmark_lines(outcome: &BenchmarkOutcome) -> Vec<String> {
    let marker = |cell: RankCell| match cell {
        RankCell::Best => "best",
        RankCell::TiedBest => "tied",
        RankCell::Worst => "worst",
        RankCell::Middle => "mid",
    };
    let mut lines = Vec::new();
    let mut header = vec!["Factor".to_string()];
    for entry in &outcome.entries {
        header.push(format!("{} L1%", entry.label));
    }
    lines.push(header.join("\t"));
    for row in &outcome.factor_matrix {
        let mut cells = vec![row.factor.to_string()];
        for (value, rank) in row.l1_pct.iter().zip(&row.ranks) {
            cells.push(format!("{value}% ({})", marker(*rank)));
        }
        lines.push(cells.join("\t"));
    }
    lines.push(String::new());
    lines.push("Ranking (by overall L1%):".to_string());
    for (position, (label, pct)) in outcome.rankings.iter().enumerate() {
        lines.push(format!("  {}. {label}: {pct}%", position + 1));
    }
    for entry in &outcome.entries {
        if let Some(error) = &entry.error {
            lines.push(format!("  {} failed: {error}", entry.label));
        }
    }
    lines
}

/// Renders one saved benchmark listing line.
#[must_use]
pub fn benchmark_history_line(record: &BenchmarkRecord) -> String {
    format!(
        "{}\t{}\t{}\t{}",
        record.id,
        record.created_at,
        record.labels.join(","),
        record.labels.len()
    )
}

// ============================================================================
// SECTION: Remediation
// ============================================================================

/// Renders remediation suggestions as plain text.
#[must_use]
pub fn suggestion_lines(suggestions: &[FixSuggestion]) -> Vec<String> {
    let mut lines = Vec::new();
    for (position, suggestion) in suggestions.iter().enumerate() {
        let target = suggestion.column.as_deref().map_or_else(
            || format!("{}.{}", suggestion.schema, suggestion.table),
            |column| format!("{}.{}.{column}", suggestion.schema, suggestion.table),
        );
        lines.push(format!(
            "--- {}. {}/{} ---",
            position + 1,
            suggestion.factor,
            suggestion.requirement
        ));
        lines.push(format!("Target: {target}"));
        lines.push(suggestion.description.clone());
        lines.push(String::new());
        lines.push(suggestion.sql.clone());
        lines.push(String::new());
    }
    lines
}
