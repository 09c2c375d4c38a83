// crates/aird-core/src/lib.rs
// ============================================================================
// Module: AIRD Core
// Description: Data model and scoring engine for AI-readiness assessments.
// Purpose: Define the assessment vocabulary shared by every AIRD crate.
// Dependencies: serde, serde_json, thiserror, bigdecimal, time
// ============================================================================

//! ## Overview
//! This crate defines the assessment data model (factors, workload levels,
//! requirements, suites, inventories, results, reports), the threshold
//! resolver with its tri-level scoring predicate, the suite expansion engine,
//! and the backend-agnostic interfaces used by platform adapters. Everything
//! here is deterministic: the same suite and inventory always expand to the
//! same probe sequence, and the same results always aggregate to the same
//! report.
//!
//! Security posture: suite files, inventories, and measured values are
//! untrusted inputs; scoring fails closed on missing or unparseable values.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::factor::Direction;
pub use core::factor::Factor;
pub use core::factor::TargetType;
pub use core::factor::WorkloadLevel;
pub use core::fingerprint::fingerprint;
pub use core::inventory::ColumnEntry;
pub use core::inventory::Inventory;
pub use core::inventory::InventoryFilter;
pub use core::inventory::TableEntry;
pub use core::report::DataProduct;
pub use core::report::FactorSummary;
pub use core::report::ProductReport;
pub use core::report::QuestionResult;
pub use core::report::Report;
pub use core::report::ReportInputs;
pub use core::report::Summary;
pub use core::report::build_report;
pub use core::requirement::LevelTargets;
pub use core::requirement::Requirement;
pub use core::requirement::RequirementRegistry;
pub use core::result::RunOutcome;
pub use core::result::TestPreview;
pub use core::result::TestResult;
pub use core::suite::ExpandedTest;
pub use core::suite::QuerySource;
pub use core::suite::ScopedId;
pub use core::suite::SuiteDefinition;
pub use core::suite::SuiteValidationError;
pub use core::suite::TestDefinition;
pub use core::value::ScalarValue;
pub use interfaces::AuditSink;
pub use interfaces::CancellationToken;
pub use interfaces::Connection;
pub use interfaces::ConnectionError;
pub use interfaces::IdentifierQuoting;
pub use interfaces::quote_double;
pub use runtime::expander::expand_tests;
pub use runtime::thresholds::ThresholdOverride;
pub use runtime::thresholds::ThresholdOverrides;
pub use runtime::thresholds::Thresholds;
