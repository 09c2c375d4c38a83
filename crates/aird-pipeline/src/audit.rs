// crates/aird-pipeline/src/audit.rs
// ============================================================================
// Module: Audit Sink
// Description: Append-only audit event writer over the history store.
// Purpose: Record executed SQL and conversation events when enabled.
// Dependencies: aird-core, aird-store-sqlite, tracing, uuid
// ============================================================================

//! ## Overview
//! The store-backed audit sink appends query and conversation events to the
//! same file as the history store. A disabled sink drops events silently.
//! Write failures are logged and swallowed: auditing must never take down
//! an assessment run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use aird_core::AuditSink;
use aird_core::Factor;
use aird_core::TargetType;
use aird_store_sqlite::AuditQueryRecord;
use aird_store_sqlite::HistoryStore;

// ============================================================================
// SECTION: Store Audit Sink
// ============================================================================

/// Audit sink writing through the history store.
///
/// # Invariants
/// - Events are append-only; the sink never reads audit streams back.
/// - Failures degrade to warnings.
pub struct StoreAuditSink {
    /// Backing store shared with history persistence.
    store: HistoryStore,
    /// Session correlation id attached to every event.
    session_id: String,
}

impl StoreAuditSink {
    /// Creates a sink over an opened store with a fresh session id.
    #[must_use]
    pub fn new(store: HistoryStore) -> Self {
        Self {
            store,
            session_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

impl AuditSink for StoreAuditSink {
    fn log_query(&self, query: &str, target: TargetType, factor: Factor, requirement: &str) {
        let record = AuditQueryRecord {
            assessment_id: None,
            session_id: Some(self.session_id.clone()),
            query: query.to_string(),
            target: Some(target.as_str().to_string()),
            factor: Some(factor.as_str().to_string()),
            requirement: Some(requirement.to_string()),
        };
        if let Err(err) = self.store.write_audit_query(&record) {
            tracing::warn!(error = %err, "failed to append audit query event");
        }
    }

    fn log_conversation(&self, content: &str, phase: Option<&str>, role: &str) {
        if let Err(err) = self.store.write_audit_conversation(
            content,
            phase,
            role,
            None,
            Some(&self.session_id),
        ) {
            tracing::warn!(error = %err, "failed to append audit conversation event");
        }
    }
}
