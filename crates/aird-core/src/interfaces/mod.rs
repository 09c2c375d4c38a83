// crates/aird-core/src/interfaces/mod.rs
// ============================================================================
// Module: AIRD Interfaces
// Description: Backend-agnostic interfaces for connections and audit.
// Purpose: Define the contract surfaces used by the assessment pipeline.
// Dependencies: thiserror, crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how the pipeline talks to platform backends and audit
//! storage without embedding backend details. Implementations must be
//! deterministic with respect to their inputs and fail closed on missing or
//! invalid data.
//!
//! Security posture: SQL text and connection parameters are untrusted; the
//! read-only gate is enforced before any statement reaches a backend.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use thiserror::Error;

use crate::core::factor::Factor;
use crate::core::factor::TargetType;
use crate::core::value::ScalarValue;

// ============================================================================
// SECTION: Identifier Quoting
// ============================================================================

/// Quotes an identifier with double quotes, doubling embedded quotes.
#[must_use]
pub fn quote_double(raw: &str) -> String {
    format!("\"{}\"", raw.replace('"', "\"\""))
}

/// Identifier quoting in the backend's escape dialect.
pub trait IdentifierQuoting {
    /// Quotes one identifier for safe inline use.
    fn quote_identifier(&self, raw: &str) -> String {
        quote_double(raw)
    }
}

// ============================================================================
// SECTION: Connection
// ============================================================================

/// Connection-level errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Messages never embed credentials.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// Connection could not be opened.
    #[error("connection failed: {0}")]
    Connect(String),
    /// Statement refused by the read-only gate.
    #[error("only read-only statements are allowed: SELECT, WITH, DESCRIBE, SHOW, EXPLAIN")]
    ReadOnlyViolation,
    /// Statement execution failed.
    #[error("query failed: {0}")]
    Execute(String),
    /// Backend capability is not compiled into this build.
    #[error("unsupported platform: {0}")]
    Unsupported(String),
    /// Run was cancelled before the statement was issued.
    #[error("cancelled")]
    Cancelled,
}

/// Minimal capability set exposed by a platform connection.
///
/// # Invariants
/// - `execute` issues exactly one statement and returns every row.
/// - The canonical parameter placeholder is `?`; adapters translate when the
///   backend differs.
pub trait Connection: IdentifierQuoting {
    /// Executes one statement with optional positional parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError`] when execution fails.
    fn execute(
        &self,
        sql: &str,
        params: &[ScalarValue],
    ) -> Result<Vec<Vec<ScalarValue>>, ConnectionError>;
}

// ============================================================================
// SECTION: Cancellation
// ============================================================================

/// Cooperative cancellation token observed before every executor call.
///
/// # Invariants
/// - Cancellation is sticky: once cancelled, a token never resets.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    /// Shared cancellation flag.
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a fresh, non-cancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true when cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fails with [`ConnectionError::Cancelled`] when cancellation was
    /// requested.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Cancelled`] after [`Self::cancel`].
    pub fn check(&self) -> Result<(), ConnectionError> {
        if self.is_cancelled() {
            return Err(ConnectionError::Cancelled);
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Audit Sink
// ============================================================================

/// Append-only audit event consumer.
///
/// Implementations decide whether events are persisted; a disabled sink
/// silently drops them.
pub trait AuditSink {
    /// Records one executed probe query.
    fn log_query(
        &self,
        query: &str,
        target: TargetType,
        factor: Factor,
        requirement: &str,
    );

    /// Records one conversational event.
    fn log_conversation(&self, content: &str, phase: Option<&str>, role: &str);
}
