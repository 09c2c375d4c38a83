// crates/aird-platform/src/executor.rs
// ============================================================================
// Module: Read-only Executor
// Description: Statement validation and parameterised execution.
// Purpose: Refuse anything but read statements before touching a backend.
// Dependencies: aird-core
// ============================================================================

//! ## Overview
//! The executor accepts a SQL string and optional positional parameters. The
//! first non-whitespace token, compared case-insensitively, must be one of
//! `SELECT`, `WITH`, `DESCRIBE`, `SHOW`, `EXPLAIN`; anything else fails with
//! a fixed error before the query is sent to the backend. There is no
//! comment stripping or deeper lexical analysis; defence in depth relies on
//! read-only authentication where the backend offers it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use aird_core::Connection;
use aird_core::ConnectionError;
use aird_core::ScalarValue;

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Leading keywords accepted by the read-only gate.
const ALLOWED_LEADING_KEYWORDS: [&str; 5] = ["SELECT", "WITH", "DESCRIBE", "SHOW", "EXPLAIN"];

/// Validates that a statement starts with a read-only keyword.
///
/// # Errors
///
/// Returns [`ConnectionError::ReadOnlyViolation`] for any other statement.
pub fn validate_readonly(sql: &str) -> Result<(), ConnectionError> {
    let token: String = sql
        .trim_start()
        .chars()
        .take_while(char::is_ascii_alphabetic)
        .collect::<String>()
        .to_uppercase();
    if ALLOWED_LEADING_KEYWORDS.contains(&token.as_str()) {
        return Ok(());
    }
    Err(ConnectionError::ReadOnlyViolation)
}

// ============================================================================
// SECTION: Execution
// ============================================================================

/// Validates and executes a statement with optional positional parameters.
///
/// # Errors
///
/// Returns [`ConnectionError`] when validation or execution fails.
pub fn execute_readonly(
    connection: &dyn Connection,
    sql: &str,
    params: &[ScalarValue],
) -> Result<Vec<Vec<ScalarValue>>, ConnectionError> {
    validate_readonly(sql)?;
    connection.execute(sql, params)
}

/// Escapes a literal for inline use in catalog queries: single quotes are
/// doubled. Catalog views are not uniformly parameterisable across backends,
/// so discovery substitutes escaped literals instead of binding.
#[must_use]
pub fn escape_literal(raw: &str) -> String {
    raw.replace('\'', "''")
}
