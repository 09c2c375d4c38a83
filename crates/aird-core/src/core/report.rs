// crates/aird-core/src/core/report.rs
// ============================================================================
// Module: Report Builder
// Description: Aggregation of probe results into the persistable report.
// Purpose: Produce summary, factor roll-ups, and data-product views.
// Dependencies: serde, serde_json, time, crate::core
// ============================================================================

//! ## Overview
//! Report building is pure aggregation over a flat result list. The summary
//! counts passes per workload level; the factor summary groups the same
//! counts by factor, sorted by factor name; data-product views restrict the
//! result rows to a product's tables or schemas and aggregate the subset.
//! For every level, `summary.pass` equals the sum of the factor roll-ups and
//! the count of passing results. Percentages are
//! `round(100 * pass / max(total, 1), 1)`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::core::factor::Factor;
use crate::core::inventory::Inventory;
use crate::core::result::TestResult;
use crate::core::suite::ScopedId;

// ============================================================================
// SECTION: Summary
// ============================================================================

/// Per-level pass counts and percentages over one result set.
///
/// # Invariants
/// - `lN_pct = round(100 * lN_pass / max(total_tests, 1), 1)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of scored results.
    pub total_tests: usize,
    /// L1 pass count.
    pub l1_pass: usize,
    /// L2 pass count.
    pub l2_pass: usize,
    /// L3 pass count.
    pub l3_pass: usize,
    /// L1 pass percentage.
    pub l1_pct: f64,
    /// L2 pass percentage.
    pub l2_pct: f64,
    /// L3 pass percentage.
    pub l3_pct: f64,
}

impl Summary {
    /// Aggregates a result slice into a summary.
    #[must_use]
    pub fn from_results(results: &[TestResult]) -> Self {
        let total = results.len();
        let l1_pass = results.iter().filter(|result| result.l1_pass).count();
        let l2_pass = results.iter().filter(|result| result.l2_pass).count();
        let l3_pass = results.iter().filter(|result| result.l3_pass).count();
        Self {
            total_tests: total,
            l1_pass,
            l2_pass,
            l3_pass,
            l1_pct: percentage(l1_pass, total),
            l2_pct: percentage(l2_pass, total),
            l3_pct: percentage(l3_pass, total),
        }
    }
}

/// Per-factor roll-up of the same counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorSummary {
    /// Factor the roll-up covers.
    pub factor: Factor,
    /// Number of scored results within the factor.
    pub total: usize,
    /// L1 pass count.
    pub l1_pass: usize,
    /// L2 pass count.
    pub l2_pass: usize,
    /// L3 pass count.
    pub l3_pass: usize,
    /// L1 pass percentage.
    pub l1_pct: f64,
    /// L2 pass percentage.
    pub l2_pct: f64,
    /// L3 pass percentage.
    pub l3_pct: f64,
}

/// Rounds `100 * pass / max(total, 1)` to one decimal place.
#[must_use]
fn percentage(pass: usize, total: usize) -> f64 {
    #[allow(clippy::cast_precision_loss, reason = "Counts are far below 2^52.")]
    let ratio = 100.0 * pass as f64 / (total.max(1)) as f64;
    (ratio * 10.0).round() / 10.0
}

/// Groups results by factor and aggregates each group, sorted by factor name.
#[must_use]
fn factor_summaries(results: &[TestResult]) -> Vec<FactorSummary> {
    let mut groups: BTreeMap<&'static str, Vec<&TestResult>> = BTreeMap::new();
    for result in results {
        groups.entry(result.factor.as_str()).or_default().push(result);
    }
    groups
        .into_iter()
        .filter_map(|(key, group)| {
            let factor = Factor::from_key(key)?;
            let total = group.len();
            let l1_pass = group.iter().filter(|result| result.l1_pass).count();
            let l2_pass = group.iter().filter(|result| result.l2_pass).count();
            let l3_pass = group.iter().filter(|result| result.l3_pass).count();
            Some(FactorSummary {
                factor,
                total,
                l1_pass,
                l2_pass,
                l3_pass,
                l1_pct: percentage(l1_pass, total),
                l2_pct: percentage(l2_pass, total),
                l3_pct: percentage(l3_pass, total),
            })
        })
        .collect()
}

// ============================================================================
// SECTION: Data Products
// ============================================================================

/// Named inventory subset declared in the user context.
///
/// # Invariants
/// - A result belongs to the product when its decoded `schema.table` is in
///   `tables`, or its schema is in `schemas`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataProduct {
    /// Product name.
    pub name: String,
    /// Schema wildcard membership.
    #[serde(default)]
    pub schemas: Vec<String>,
    /// Qualified `schema.table` membership.
    #[serde(default)]
    pub tables: Vec<String>,
}

impl DataProduct {
    /// Returns true when the decoded result scope belongs to this product.
    #[must_use]
    fn contains(&self, scope: &ScopedId) -> bool {
        if let Some(qualified) = scope.qualified_table()
            && self.tables.iter().any(|table| table.eq_ignore_ascii_case(&qualified))
        {
            return true;
        }
        scope
            .schema
            .as_ref()
            .is_some_and(|schema| self.schemas.iter().any(|name| name.eq_ignore_ascii_case(schema)))
    }
}

/// Independent roll-up computed for one data product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductReport {
    /// Product name.
    pub name: String,
    /// Summary over the product's result subset.
    pub summary: Summary,
    /// Factor roll-ups over the product's result subset.
    pub factor_summary: Vec<FactorSummary>,
}

// ============================================================================
// SECTION: Question Results
// ============================================================================

/// One survey answer scored against its rubric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionResult {
    /// Owning factor.
    pub factor: Factor,
    /// Requirement key the question covers.
    pub requirement: String,
    /// Question text shown to the user.
    pub question_text: String,
    /// Recorded answer (em dash when unanswered).
    pub answer: String,
    /// L1 verdict.
    pub l1_pass: bool,
    /// L2 verdict.
    pub l2_pass: bool,
    /// L3 verdict.
    pub l3_pass: bool,
}

// ============================================================================
// SECTION: Report
// ============================================================================

/// The persistable assessment report.
///
/// # Invariants
/// - Always well-formed: every section present even when every probe failed.
/// - Immutable once persisted; `assessment_id` is stamped by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// RFC3339 creation timestamp.
    pub created_at: String,
    /// Credential-elided connection identity.
    pub connection_fingerprint: String,
    /// Target workload short key (`l1`..`l3`), when one was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_workload: Option<String>,
    /// Global summary.
    pub summary: Summary,
    /// Per-factor roll-ups sorted by factor name.
    pub factor_summary: Vec<FactorSummary>,
    /// Scored results in expansion order.
    pub results: Vec<TestResult>,
    /// Per-product roll-ups, when products were declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_products: Option<Vec<ProductReport>>,
    /// Survey outcomes, when the survey collaborator ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_results: Option<Vec<QuestionResult>>,
    /// Inventory the run expanded against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory: Option<Inventory>,
    /// User-supplied context document.
    #[serde(default)]
    pub user_context: Value,
    /// Environment metadata.
    #[serde(default)]
    pub environment: Value,
    /// Persisted assessment id, stamped after saving.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment_id: Option<String>,
    /// Immediately preceding assessment id for the same fingerprint.
    #[serde(
        rename = "_diff_previous_id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub diff_previous_id: Option<String>,
}

/// Optional inputs attached to a report beyond the result list.
#[derive(Debug, Clone, Default)]
pub struct ReportInputs {
    /// Inventory the run expanded against.
    pub inventory: Option<Inventory>,
    /// Credential-elided connection identity.
    pub connection_fingerprint: String,
    /// Target workload short key.
    pub target_workload: Option<String>,
    /// Data products to compute independent roll-ups for.
    pub data_products: Vec<DataProduct>,
    /// Survey outcomes to attach.
    pub question_results: Option<Vec<QuestionResult>>,
    /// User context document to embed.
    pub user_context: Option<Value>,
}

/// Builds a report from scored results and optional inputs.
///
/// The top-level summary always aggregates the full result list; product
/// views aggregate their subsets independently.
#[must_use]
pub fn build_report(results: Vec<TestResult>, inputs: ReportInputs) -> Report {
    let created_at = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"));
    let summary = Summary::from_results(&results);
    let factor_summary = factor_summaries(&results);
    let data_products = if inputs.data_products.is_empty() {
        None
    } else {
        Some(
            inputs
                .data_products
                .iter()
                .map(|product| product_report(product, &results))
                .collect(),
        )
    };
    Report {
        created_at,
        connection_fingerprint: inputs.connection_fingerprint,
        target_workload: inputs.target_workload,
        summary,
        factor_summary,
        results,
        data_products,
        question_results: inputs.question_results,
        inventory: inputs.inventory,
        user_context: inputs.user_context.unwrap_or_else(|| Value::Object(serde_json::Map::new())),
        environment: Value::Object(serde_json::Map::new()),
        assessment_id: None,
        diff_previous_id: None,
    }
}

/// Computes the independent roll-up for one data product.
#[must_use]
fn product_report(product: &DataProduct, results: &[TestResult]) -> ProductReport {
    let subset: Vec<TestResult> = results
        .iter()
        .filter(|result| product.contains(&ScopedId::parse(&result.test_id)))
        .cloned()
        .collect();
    ProductReport {
        name: product.name.clone(),
        summary: Summary::from_results(&subset),
        factor_summary: factor_summaries(&subset),
    }
}
