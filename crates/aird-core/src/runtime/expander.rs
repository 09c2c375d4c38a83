// crates/aird-core/src/runtime/expander.rs
// ============================================================================
// Module: Suite Expander
// Description: Materialises suite templates against a discovered inventory.
// Purpose: Turn declarative tests into concrete per-table/per-column probes.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Expansion walks the suite's test definitions in order. Fixed queries pass
//! through unchanged. Templates produce one probe per inventory table or per
//! matching inventory column, with `{schema_q}`, `{table_q}`, `{column_q}`
//! substituted by adapter-quoted identifiers. Expanded ids encode scope as
//! `base|schema|table[|column]`. Expansion order is the inventory's order,
//! so the probe sequence is deterministic for a given suite and inventory.
//!
//! Scope predicates are conservative and metadata-driven: the engine has no
//! profiler, so numeric-only and date-like requirements are narrowed by the
//! column's declared type and name.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::factor::Factor;
use crate::core::factor::TargetType;
use crate::core::inventory::ColumnEntry;
use crate::core::inventory::Inventory;
use crate::core::suite::ExpandedTest;
use crate::core::suite::QuerySource;
use crate::core::suite::TestDefinition;
use crate::interfaces::IdentifierQuoting;

// ============================================================================
// SECTION: Scope Predicates
// ============================================================================

/// Type fragments that mark a column as numeric.
const NUMERIC_TYPE_MARKERS: [&str; 9] = [
    "INT", "BIGINT", "SMALLINT", "TINYINT", "DOUBLE", "FLOAT", "REAL", "NUMERIC", "DECIMAL",
];

/// Type fragments that mark a column as string-typed.
const STRING_TYPE_MARKERS: [&str; 3] = ["CHAR", "TEXT", "STRING"];

/// Name fragments that mark a string column as date-like.
const DATEISH_NAME_MARKERS: [&str; 5] = ["date", "time", "created", "updated", "_at"];

/// Returns true when the column's declared type looks numeric.
#[must_use]
fn is_numeric_column(column: &ColumnEntry) -> bool {
    let data_type = column.data_type.to_uppercase();
    NUMERIC_TYPE_MARKERS.iter().any(|marker| data_type.contains(marker))
}

/// Returns true when the column is string-typed with a date-like name.
#[must_use]
fn is_dateish_string_column(column: &ColumnEntry) -> bool {
    let data_type = column.data_type.to_uppercase();
    if !STRING_TYPE_MARKERS.iter().any(|marker| data_type.contains(marker)) {
        return false;
    }
    let name = column.column.to_lowercase();
    DATEISH_NAME_MARKERS.iter().any(|marker| name.contains(marker))
}

/// Scope predicate for a column-targeted requirement.
#[must_use]
fn column_in_scope(requirement: &str, column: &ColumnEntry) -> bool {
    match requirement {
        "zero_negative_rate" | "type_inconsistency_rate" => is_numeric_column(column),
        "format_inconsistency_rate" => is_dateish_string_column(column),
        _ => true,
    }
}

// ============================================================================
// SECTION: Expansion
// ============================================================================

/// Expands suite tests against an inventory into executable probes.
///
/// Templates with `platform` scope have nothing to expand against and are
/// skipped. The optional factor filter drops non-matching tests before
/// expansion.
#[must_use]
pub fn expand_tests(
    tests: &[TestDefinition],
    inventory: &Inventory,
    quoting: &dyn IdentifierQuoting,
    factor_filter: Option<Factor>,
) -> Vec<ExpandedTest> {
    let mut expanded = Vec::new();
    for test in tests {
        if let Some(factor) = factor_filter
            && test.factor != factor
        {
            continue;
        }
        match &test.source {
            QuerySource::Fixed(sql) => expanded.push(ExpandedTest {
                id: test.id.clone(),
                factor: test.factor,
                requirement: test.requirement.clone(),
                target_type: test.target_type,
                query: sql.clone(),
            }),
            QuerySource::Template(template) => {
                expand_template(test, template, inventory, quoting, &mut expanded);
            }
        }
    }
    expanded
}

/// Expands one template according to its target type.
fn expand_template(
    test: &TestDefinition,
    template: &str,
    inventory: &Inventory,
    quoting: &dyn IdentifierQuoting,
    expanded: &mut Vec<ExpandedTest>,
) {
    match test.target_type {
        // A template without a scope has nothing to expand against.
        TargetType::Platform => {}
        TargetType::Table => {
            for entry in &inventory.tables {
                let query = template
                    .replace("{schema_q}", &quoting.quote_identifier(&entry.schema))
                    .replace("{table_q}", &quoting.quote_identifier(&entry.table));
                expanded.push(ExpandedTest {
                    id: format!("{}|{}|{}", test.id, entry.schema, entry.table),
                    factor: test.factor,
                    requirement: test.requirement.clone(),
                    target_type: test.target_type,
                    query,
                });
            }
        }
        TargetType::Column => {
            for column in &inventory.columns {
                if !column_in_scope(&test.requirement, column) {
                    continue;
                }
                let query = template
                    .replace("{schema_q}", &quoting.quote_identifier(&column.schema))
                    .replace("{table_q}", &quoting.quote_identifier(&column.table))
                    .replace("{column_q}", &quoting.quote_identifier(&column.column));
                expanded.push(ExpandedTest {
                    id: format!(
                        "{}|{}|{}|{}",
                        test.id, column.schema, column.table, column.column
                    ),
                    factor: test.factor,
                    requirement: test.requirement.clone(),
                    target_type: test.target_type,
                    query,
                });
            }
        }
    }
}
