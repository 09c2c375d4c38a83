// crates/aird-platform/tests/readonly_gate.rs
// ============================================================================
// Module: Read-only Gate Tests
// Description: Statement validation checks for the executor.
// Purpose: Prove write statements are refused before reaching a backend.
// Dependencies: aird-platform, aird-core
// ============================================================================

//! ## Overview
//! Covers the read-only executor: every accepted leading keyword, refusal of
//! anything else with the fixed error, and the guarantee that a refused
//! statement never reaches the connection.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use aird_core::Connection;
use aird_core::ConnectionError;
use aird_core::IdentifierQuoting;
use aird_core::ScalarValue;
use aird_platform::execute_readonly;
use aird_platform::validate_readonly;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Connection double that counts execute calls.
struct CountingConnection {
    /// Number of statements that reached the backend.
    calls: AtomicUsize,
}

impl IdentifierQuoting for CountingConnection {}

impl Connection for CountingConnection {
    fn execute(
        &self,
        _sql: &str,
        _params: &[ScalarValue],
    ) -> Result<Vec<Vec<ScalarValue>>, ConnectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![vec![ScalarValue::Int(1)]])
    }
}

// ============================================================================
// SECTION: Validation
// ============================================================================

#[test]
fn accepts_every_readonly_keyword() {
    for sql in [
        "SELECT 1",
        "  select * from t",
        "WITH x AS (SELECT 1) SELECT * FROM x",
        "describe table t",
        "SHOW TABLES",
        "EXPLAIN SELECT 1",
    ] {
        assert!(validate_readonly(sql).is_ok(), "should accept: {sql}");
    }
}

#[test]
fn refuses_non_readonly_statements() {
    for sql in [
        "INSERT INTO t VALUES (1)",
        "UPDATE t SET a = 1",
        "DELETE FROM t",
        "DROP TABLE t",
        "CREATE TABLE t (a INT)",
        "PRAGMA table_info(t)",
        "",
        "   ",
        "1 SELECT",
    ] {
        assert_eq!(
            validate_readonly(sql),
            Err(ConnectionError::ReadOnlyViolation),
            "should refuse: {sql}"
        );
    }
}

#[test]
fn keyword_must_be_a_whole_token() {
    assert_eq!(validate_readonly("SELECTION 1"), Err(ConnectionError::ReadOnlyViolation));
}

#[test]
fn refused_statements_never_touch_the_connection() {
    let connection = CountingConnection {
        calls: AtomicUsize::new(0),
    };
    let result = execute_readonly(&connection, "DELETE FROM t", &[]);
    assert_eq!(result, Err(ConnectionError::ReadOnlyViolation));
    assert_eq!(connection.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn accepted_statements_reach_the_connection() {
    let connection = CountingConnection {
        calls: AtomicUsize::new(0),
    };
    let rows = execute_readonly(&connection, "SELECT 1", &[]).unwrap();
    assert_eq!(rows, vec![vec![ScalarValue::Int(1)]]);
    assert_eq!(connection.calls.load(Ordering::SeqCst), 1);
}
