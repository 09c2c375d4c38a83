// crates/aird-core/src/core/result.rs
// ============================================================================
// Module: Probe Results
// Description: Scored outcomes of executed probes and runner artifacts.
// Purpose: Record per-probe verdicts at all three workload levels.
// Dependencies: serde, crate::core::factor, crate::core::requirement
// ============================================================================

//! ## Overview
//! Every executed probe yields one [`TestResult`] carrying the measured
//! value, the resolved threshold triple, the comparison direction, and an
//! independent verdict per workload level. Executor failures become failing
//! results with the error string attached; they never abort a run. The
//! runner's whole output is a [`RunOutcome`], which is also the shape of a
//! dry-run preview.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::factor::Direction;
use crate::core::factor::Factor;
use crate::core::factor::TargetType;
use crate::core::factor::WorkloadLevel;
use crate::core::requirement::LevelTargets;

// ============================================================================
// SECTION: Test Result
// ============================================================================

/// Scored outcome of one executed probe.
///
/// # Invariants
/// - All three level verdicts are recorded regardless of the target
///   workload; the target only affects rendering.
/// - A failed execution has `measured_value = None`, all verdicts false,
///   and `error` set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Scope-encoded probe identifier.
    pub test_id: String,
    /// Owning factor.
    pub factor: Factor,
    /// Requirement key scored against.
    pub requirement: String,
    /// Probe scope.
    pub target_type: TargetType,
    /// Measured value projected to `f64`, when one exists.
    pub measured_value: Option<f64>,
    /// Resolved threshold triple for the requirement.
    pub threshold: LevelTargets,
    /// Comparison direction applied.
    pub direction: Direction,
    /// L1 (analytics) verdict.
    pub l1_pass: bool,
    /// L2 (RAG) verdict.
    pub l2_pass: bool,
    /// L3 (training) verdict.
    pub l3_pass: bool,
    /// Executor error string, when the probe failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Executed SQL, retained for rerun.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl TestResult {
    /// Returns the verdict for one workload level.
    #[must_use]
    pub const fn passes(&self, level: WorkloadLevel) -> bool {
        match level {
            WorkloadLevel::Analytics => self.l1_pass,
            WorkloadLevel::Rag => self.l2_pass,
            WorkloadLevel::Training => self.l3_pass,
        }
    }

    /// Returns true when the probe failed at any workload level.
    #[must_use]
    pub const fn failed_any_level(&self) -> bool {
        !self.l1_pass || !self.l2_pass || !self.l3_pass
    }
}

// ============================================================================
// SECTION: Preview
// ============================================================================

/// One dry-run preview row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestPreview {
    /// Scope-encoded probe identifier.
    pub id: String,
    /// Owning factor.
    pub factor: Factor,
    /// Requirement key.
    pub requirement: String,
    /// Probe scope.
    pub target_type: TargetType,
}

// ============================================================================
// SECTION: Run Outcome
// ============================================================================

/// Output of one runner invocation.
///
/// # Invariants
/// - `dry_run` outcomes carry previews and an empty result list.
/// - `results` ordering matches expansion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Scored results in expansion order (empty for dry runs).
    pub results: Vec<TestResult>,
    /// True when no probe was executed.
    pub dry_run: bool,
    /// Number of expanded probes.
    pub test_count: usize,
    /// Preview rows (dry runs only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preview: Vec<TestPreview>,
}
