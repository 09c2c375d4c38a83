// crates/aird-store-sqlite/src/lib.rs
// ============================================================================
// Module: AIRD SQLite Store
// Description: Durable local history store backed by SQLite.
// Purpose: Persist assessments, benchmarks, and audit streams in one file.
// Dependencies: rusqlite, serde_json, thiserror, time, uuid
// ============================================================================

//! ## Overview
//! This crate implements the append-only history store: assessment reports,
//! benchmark group records, and optional audit streams share a single SQLite
//! file. Opening the store creates missing tables and applies additive
//! column migrations; saved reports are immutable and fetched back byte-for
//! byte equivalent.
//!
//! Security posture: stored fingerprints are already credential-elided;
//! the store never receives raw connection secrets.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::AssessmentFilter;
pub use store::AssessmentSummary;
pub use store::AuditQueryRecord;
pub use store::BenchmarkRecord;
pub use store::HistoryStore;
pub use store::StoreError;
