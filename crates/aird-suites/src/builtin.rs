// crates/aird-suites/src/builtin.rs
// ============================================================================
// Module: Built-in Suites
// Description: Embedded dialect suite documents.
// Purpose: Register the default suites every build ships with.
// Dependencies: crate::loader
// ============================================================================

//! ## Overview
//! Built-in suite documents are embedded YAML assets, one per dialect
//! concern: clean probes for SQLite, DuckDB, and Snowflake, plus contextual
//! coverage probes for Snowflake. Registration order is the asset name sort
//! order, matching directory loading, so the contextual document appends to
//! `common_snowflake` after the clean document.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::SuiteError;
use crate::SuiteRegistry;
use crate::loader::parse_document;

// ============================================================================
// SECTION: Assets
// ============================================================================

/// Embedded suite documents in name-sorted load order.
const BUILTIN_SUITE_FILES: [(&str, &str); 4] = [
    ("clean_duckdb.yaml", include_str!("../assets/clean_duckdb.yaml")),
    ("clean_snowflake.yaml", include_str!("../assets/clean_snowflake.yaml")),
    ("clean_sqlite.yaml", include_str!("../assets/clean_sqlite.yaml")),
    ("contextual_snowflake.yaml", include_str!("../assets/contextual_snowflake.yaml")),
];

// ============================================================================
// SECTION: Registration
// ============================================================================

/// Registers every built-in suite document.
///
/// # Errors
///
/// Returns [`SuiteError`] when an embedded document fails to parse or
/// register, which indicates a packaging defect rather than user input.
pub fn register_builtin_suites(registry: &mut SuiteRegistry) -> Result<(), SuiteError> {
    for (origin, text) in BUILTIN_SUITE_FILES {
        let document = parse_document(text, origin)?;
        registry.register_document(document)?;
    }
    Ok(())
}
