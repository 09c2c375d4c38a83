// crates/aird-pipeline/src/remediation.rs
// ============================================================================
// Module: Remediation Generator
// Description: Lookup-table SQL suggestions for failed requirements.
// Purpose: Turn failed results into actionable remediation scripts.
// Dependencies: aird-core
// ============================================================================

//! ## Overview
//! The remediation generator is a pure lookup table: each requirement key
//! maps to a description and a SQL template with `{schema}`, `{table}`,
//! `{column}` placeholders filled from the failed result's decoded test id.
//! Requirements without a template get a generic suggestion. Nothing here
//! executes SQL; the output is advisory text.

// ============================================================================
// SECTION: Imports
// ============================================================================

use aird_core::Factor;
use aird_core::LevelTargets;
use aird_core::Report;
use aird_core::ScopedId;
use aird_core::TestResult;

// ============================================================================
// SECTION: Templates
// ============================================================================

/// Returns the remediation template for a requirement key.
#[must_use]
fn template_for(requirement: &str) -> Option<(&'static str, &'static str)> {
    match requirement {
        "null_rate" => Some((
            "High null rate in column. Consider backfilling or setting a default.",
            "-- Option 1: Backfill existing nulls with a default\n\
             UPDATE {schema}.{table} SET {column} = 'Unknown' WHERE {column} IS NULL;\n\n\
             -- Option 2: Add a default for future inserts\n\
             -- ALTER TABLE {schema}.{table} ALTER COLUMN {column} SET DEFAULT 'default_value';",
        )),
        "duplicate_rate" => Some((
            "Duplicate rows detected. Consider deduplication or a unique constraint.",
            "-- Investigate duplicates first (list all columns in GROUP BY)\n\
             -- SELECT col1, col2, COUNT(*) FROM {schema}.{table} GROUP BY col1, col2 HAVING \
             COUNT(*) > 1;\n\n\
             -- Option: add a unique constraint to prevent future duplicates\n\
             -- ALTER TABLE {schema}.{table} ADD CONSTRAINT uq_{table} UNIQUE (column_list);",
        )),
        "zero_negative_rate" => Some((
            "Zero or negative values in a numeric column expected to be positive.",
            "-- Inspect offending rows\n\
             SELECT * FROM {schema}.{table} WHERE {column} <= 0;\n\n\
             -- Option: constrain future inserts\n\
             -- ALTER TABLE {schema}.{table} ADD CONSTRAINT ck_{table}_{column} CHECK ({column} \
             > 0);",
        )),
        "format_inconsistency_rate" => Some((
            "Date-like strings failing to parse. Normalise the column format.",
            "-- Inspect unparseable values\n\
             SELECT {column} FROM {schema}.{table} WHERE {column} IS NOT NULL;\n\n\
             -- Option: migrate the column to a typed date\n\
             -- ALTER TABLE {schema}.{table} ALTER COLUMN {column} TYPE DATE;",
        )),
        "type_inconsistency_rate" => Some((
            "Values failing numeric casts in a numeric column.",
            "-- Inspect uncastable values\n\
             SELECT {column} FROM {schema}.{table} WHERE {column} IS NOT NULL;",
        )),
        "primary_key_defined" => Some((
            "Table has no primary key. Add a PK for reliable joins and traceability.",
            "-- Option 1: Add a primary key on an existing column\n\
             ALTER TABLE {schema}.{table} ADD CONSTRAINT pk_{table} PRIMARY KEY (id);\n\n\
             -- Option 2: Add a surrogate key if no natural key exists\n\
             -- ALTER TABLE {schema}.{table} ADD COLUMN id SERIAL PRIMARY KEY;",
        )),
        "foreign_key_coverage" => Some((
            "Table has no foreign key constraints. Add FKs to declare relationships.",
            "-- Add a foreign key (adjust referenced table/column)\n\
             ALTER TABLE {schema}.{table}\n\
             ADD CONSTRAINT fk_{table}_ref\n\
             FOREIGN KEY (ref_column) REFERENCES other_schema.other_table(id);",
        )),
        "temporal_scope_present" => Some((
            "Table lacks temporal columns. Add them for freshness tracking.",
            "-- Add temporal columns\n\
             ALTER TABLE {schema}.{table} ADD COLUMN created_at TIMESTAMP DEFAULT \
             CURRENT_TIMESTAMP;\n\
             ALTER TABLE {schema}.{table} ADD COLUMN updated_at TIMESTAMP DEFAULT \
             CURRENT_TIMESTAMP;",
        )),
        "semantic_model_coverage" => Some((
            "Table not represented in a semantic model. Add it to the semantic layer.",
            "-- Create a view or add the table to your semantic model\n\
             -- SELECT * FROM {schema}.{table}",
        )),
        "column_comment_coverage" => Some((
            "Column lacks documentation. Add column comments.",
            "-- Add a column comment (syntax varies by platform)\n\
             COMMENT ON COLUMN {schema}.{table}.{column} IS 'Description of this column';",
        )),
        _ => None,
    }
}

// ============================================================================
// SECTION: Suggestions
// ============================================================================

/// One remediation suggestion for a failed probe.
#[derive(Debug, Clone, PartialEq)]
pub struct FixSuggestion {
    /// Scope-encoded probe identifier.
    pub test_id: String,
    /// Owning factor.
    pub factor: Factor,
    /// Failed requirement key.
    pub requirement: String,
    /// Decoded schema component.
    pub schema: String,
    /// Decoded table component.
    pub table: String,
    /// Decoded column component, when column-scoped.
    pub column: Option<String>,
    /// Human description of the failure and remedy.
    pub description: String,
    /// Suggested SQL (advisory, never executed).
    pub sql: String,
    /// Measured value from the failed result.
    pub measured_value: Option<f64>,
    /// Threshold triple from the failed result.
    pub threshold: LevelTargets,
}

/// Substitutes scope placeholders into a template.
fn substitute(template: &str, scope: &ScopedId) -> String {
    template
        .replace("{schema}", scope.schema.as_deref().unwrap_or("schema"))
        .replace("{table}", scope.table.as_deref().unwrap_or("table"))
        .replace("{column}", scope.column.as_deref().unwrap_or("column"))
}

/// Generates remediation suggestions for every failed result in a report.
#[must_use]
pub fn generate_fix_suggestions(report: &Report) -> Vec<FixSuggestion> {
    report
        .results
        .iter()
        .filter(|result| result.failed_any_level())
        .map(suggestion_for)
        .collect()
}

/// Builds one suggestion from a failed result.
fn suggestion_for(result: &TestResult) -> FixSuggestion {
    let scope = ScopedId::parse(&result.test_id);
    let (description, sql) = template_for(&result.requirement).map_or_else(
        || {
            (
                format!(
                    "Requirement '{}' failed. See factor documentation for guidance.",
                    result.requirement
                ),
                "-- No template available. Check factor documentation.".to_string(),
            )
        },
        |(description, template)| (description.to_string(), substitute(template, &scope)),
    );
    FixSuggestion {
        test_id: result.test_id.clone(),
        factor: result.factor,
        requirement: result.requirement.clone(),
        schema: scope.schema.clone().unwrap_or_default(),
        table: scope.table.clone().unwrap_or_default(),
        column: scope.column.clone(),
        description,
        sql,
        measured_value: result.measured_value,
        threshold: result.threshold,
    }
}
