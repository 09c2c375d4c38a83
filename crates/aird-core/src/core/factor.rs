// crates/aird-core/src/core/factor.rs
// ============================================================================
// Module: Factors and Workload Levels
// Description: Canonical quality dimensions, workload tiers, and test scopes.
// Purpose: Give every assessment artifact a closed, stable vocabulary.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The six assessment factors, the three workload levels (L1 analytics, L2
//! RAG, L3 training), the test target scopes, and the threshold comparison
//! direction. All of these serialize as lowercase snake_case strings so the
//! report artifact stays stable across releases.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Factor
// ============================================================================

/// Canonical assessment quality dimensions.
///
/// # Invariants
/// - The set is closed; suite files naming any other factor are rejected at
///   load time.
/// - Serialized form is the lowercase factor name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    /// Data hygiene: nulls, duplicates, malformed values.
    Clean,
    /// Semantic context: keys, relationships, models.
    Contextual,
    /// Serving and documentation readiness.
    Consumable,
    /// Freshness and temporal validity.
    Current,
    /// Lineage and cross-entity traceability.
    Correlated,
    /// Access control and policy posture.
    Compliant,
}

impl Factor {
    /// All factors in canonical declaration order.
    pub const ALL: [Self; 6] = [
        Self::Clean,
        Self::Contextual,
        Self::Consumable,
        Self::Current,
        Self::Correlated,
        Self::Compliant,
    ];

    /// Returns the lowercase factor key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Contextual => "contextual",
            Self::Consumable => "consumable",
            Self::Current => "current",
            Self::Correlated => "correlated",
            Self::Compliant => "compliant",
        }
    }

    /// Parses a lowercase factor key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|factor| factor.as_str() == key)
    }
}

impl std::fmt::Display for Factor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Workload Level
// ============================================================================

/// Target workload levels with successively stricter thresholds.
///
/// # Invariants
/// - Short keys (`l1`, `l2`, `l3`) are the forms embedded in results and
///   reports; the long names are accepted on input only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkloadLevel {
    /// L1: analytics workloads.
    Analytics,
    /// L2: retrieval-augmented generation workloads.
    Rag,
    /// L3: model training workloads.
    Training,
}

impl WorkloadLevel {
    /// All levels in ascending strictness order.
    pub const ALL: [Self; 3] = [Self::Analytics, Self::Rag, Self::Training];

    /// Returns the short level key (`l1`, `l2`, `l3`).
    #[must_use]
    pub const fn short(self) -> &'static str {
        match self {
            Self::Analytics => "l1",
            Self::Rag => "l2",
            Self::Training => "l3",
        }
    }

    /// Returns the human-readable display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Analytics => "L1 (Analytics)",
            Self::Rag => "L2 (RAG)",
            Self::Training => "L3 (Training)",
        }
    }

    /// Parses either the long name or the short key, case-insensitively.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "analytics" | "l1" => Some(Self::Analytics),
            "rag" | "l2" => Some(Self::Rag),
            "training" | "l3" => Some(Self::Training),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION: Target Type
// ============================================================================

/// Granularity at which a test definition operates.
///
/// # Invariants
/// - `Platform` tests must carry a fixed query; templates require a table or
///   column scope to expand against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    /// One probe per data source.
    Platform,
    /// One probe per inventory table.
    Table,
    /// One probe per matching inventory column.
    Column,
}

impl TargetType {
    /// Returns the lowercase target type key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Platform => "platform",
            Self::Table => "table",
            Self::Column => "column",
        }
    }
}

impl std::fmt::Display for TargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Direction
// ============================================================================

/// Comparison direction for a requirement's pass predicate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Pass when the measured value is at or below the threshold
    /// (rate-of-bad metrics).
    #[default]
    Lte,
    /// Pass when the measured value is at or above the threshold
    /// (coverage metrics).
    Gte,
}

impl Direction {
    /// Returns the lowercase direction key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lte => "lte",
            Self::Gte => "gte",
        }
    }
}
