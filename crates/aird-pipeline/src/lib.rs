// crates/aird-pipeline/src/lib.rs
// ============================================================================
// Module: AIRD Pipeline
// Description: Assessment orchestration from discovery to persisted report.
// Purpose: Wire discover, expand, run, score, aggregate, and persist.
// Dependencies: aird-core, aird-platform, aird-suites, aird-store-sqlite
// ============================================================================

//! ## Overview
//! The pipeline crate owns the full assessment flow: catalog discovery,
//! suite resolution and expansion, sequential probe execution with scoring,
//! report building, and history persistence. The `compare`, `rerun`, and
//! `benchmark` variants reuse the same flow with different inputs and
//! aggregators. Collaborators with narrow contracts (survey, remediation,
//! audit) live here too.
//!
//! Security posture: context files, threshold overrides, and survey answers
//! are untrusted; malformed configuration degrades to defaults with a
//! warning rather than failing the run.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod benchmark;
pub mod compare;
pub mod config;
pub mod discovery;
pub mod pipeline;
pub mod remediation;
pub mod rerun;
pub mod runner;
pub mod survey;

// ============================================================================
// SECTION: Imports
// ============================================================================

use aird_core::ConnectionError;
use aird_platform::PlatformError;
use aird_store_sqlite::StoreError;
use aird_suites::SuiteError;
use thiserror::Error;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::StoreAuditSink;
pub use benchmark::BenchmarkEntry;
pub use benchmark::BenchmarkOptions;
pub use benchmark::BenchmarkOutcome;
pub use benchmark::FactorRankRow;
pub use benchmark::RankCell;
pub use compare::CompareOutcome;
pub use compare::CompareRow;
pub use compare::LevelOutcome;
pub use config::AssessConfig;
pub use config::UserContext;
pub use config::load_context;
pub use config::load_threshold_overrides;
pub use discovery::discover;
pub use pipeline::AssessOutcome;
pub use pipeline::Pipeline;
pub use remediation::FixSuggestion;
pub use remediation::generate_fix_suggestions;
pub use rerun::LevelTransition;
pub use rerun::RerunDelta;
pub use runner::RunOptions;
pub use runner::run_tests;
pub use survey::Question;
pub use survey::load_answers;
pub use survey::run_survey;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Pipeline errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling; the CLI maps usage
///   variants to exit code 2 and runtime variants to exit code 1.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No connection was supplied.
    #[error("connection required (use -c/--connection or AIRD_CONNECTION_STRING)")]
    MissingConnection,
    /// Platform resolution or connect failure.
    #[error(transparent)]
    Platform(#[from] PlatformError),
    /// Probe or catalog execution failure.
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    /// History store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Suite loading failure.
    #[error(transparent)]
    Suite(#[from] SuiteError),
    /// Requested data product is not declared in the context.
    #[error("data product {name:?} not found in context. Available: {available}")]
    UnknownDataProduct {
        /// Requested product name.
        name: String,
        /// Comma-separated declared product names.
        available: String,
    },
    /// Referenced assessment does not exist.
    #[error("assessment not found: {0}")]
    AssessmentNotFound(String),
    /// Invalid variant input (wrong counts, malformed payloads).
    #[error("{0}")]
    Invalid(String),
}

impl PipelineError {
    /// Returns true when the error is a usage error (CLI exit code 2).
    #[must_use]
    pub const fn is_usage(&self) -> bool {
        matches!(
            self,
            Self::MissingConnection
                | Self::Platform(
                    PlatformError::MissingScheme(_) | PlatformError::UnknownScheme { .. }
                )
        )
    }
}
