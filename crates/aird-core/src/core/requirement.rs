// crates/aird-core/src/core/requirement.rs
// ============================================================================
// Module: Requirement Registry
// Description: Canonical requirement keys with tiered default thresholds.
// Purpose: Anchor scoring to a stable, built-in requirement catalog.
// Dependencies: serde, crate::core::factor
// ============================================================================

//! ## Overview
//! A requirement is a named, measurable property within a factor: a key, a
//! comparison direction, and default L1/L2/L3 targets. The registry holds the
//! built-in catalog; it is populated once at construction and read-only after
//! that. `table_discovery` is informational and always passes regardless of
//! the measured value.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::core::factor::Direction;
use crate::core::factor::Factor;
use crate::core::factor::WorkloadLevel;

// ============================================================================
// SECTION: Level Targets
// ============================================================================

/// Numeric targets for the three workload levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelTargets {
    /// L1 (analytics) target.
    pub l1: f64,
    /// L2 (RAG) target.
    pub l2: f64,
    /// L3 (training) target.
    pub l3: f64,
}

impl LevelTargets {
    /// Creates targets from the three level values.
    #[must_use]
    pub const fn new(l1: f64, l2: f64, l3: f64) -> Self {
        Self {
            l1,
            l2,
            l3,
        }
    }

    /// Returns the target for one workload level.
    #[must_use]
    pub const fn for_level(&self, level: WorkloadLevel) -> f64 {
        match level {
            WorkloadLevel::Analytics => self.l1,
            WorkloadLevel::Rag => self.l2,
            WorkloadLevel::Training => self.l3,
        }
    }
}

// ============================================================================
// SECTION: Requirement
// ============================================================================

/// One catalog entry: a measurable property within a factor.
///
/// # Invariants
/// - `key` is unique within the registry.
/// - Informational requirements pass regardless of the measured value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    /// Canonical requirement key (e.g. `null_rate`).
    pub key: String,
    /// Owning factor.
    pub factor: Factor,
    /// Threshold comparison direction.
    pub direction: Direction,
    /// Default tiered targets.
    pub default_thresholds: LevelTargets,
    /// True when the requirement is informational (always passes).
    pub informational: bool,
}

impl Requirement {
    /// Creates a non-informational requirement.
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        factor: Factor,
        direction: Direction,
        default_thresholds: LevelTargets,
    ) -> Self {
        Self {
            key: key.into(),
            factor,
            direction,
            default_thresholds,
            informational: false,
        }
    }

    /// Marks the requirement as informational.
    #[must_use]
    pub const fn informational(mut self) -> Self {
        self.informational = true;
        self
    }
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Read-only catalog of requirements, keyed by requirement key.
///
/// # Invariants
/// - Populated once at construction; lookups never block or mutate.
#[derive(Debug, Clone)]
pub struct RequirementRegistry {
    /// Requirement entries keyed by canonical key.
    entries: BTreeMap<String, Requirement>,
}

impl RequirementRegistry {
    /// Creates the built-in requirement catalog.
    #[must_use]
    pub fn builtin() -> Self {
        let mut entries = BTreeMap::new();
        let catalog = [
            Requirement::new(
                "table_discovery",
                Factor::Clean,
                Direction::Lte,
                LevelTargets::new(1.0, 1.0, 1.0),
            )
            .informational(),
            Requirement::new(
                "null_rate",
                Factor::Clean,
                Direction::Lte,
                LevelTargets::new(0.2, 0.05, 0.01),
            ),
            Requirement::new(
                "duplicate_rate",
                Factor::Clean,
                Direction::Lte,
                LevelTargets::new(0.1, 0.02, 0.01),
            ),
            Requirement::new(
                "format_inconsistency_rate",
                Factor::Clean,
                Direction::Lte,
                LevelTargets::new(0.1, 0.05, 0.01),
            ),
            Requirement::new(
                "type_inconsistency_rate",
                Factor::Clean,
                Direction::Lte,
                LevelTargets::new(0.05, 0.02, 0.01),
            ),
            Requirement::new(
                "zero_negative_rate",
                Factor::Clean,
                Direction::Lte,
                LevelTargets::new(0.05, 0.02, 0.01),
            ),
            Requirement::new(
                "primary_key_defined",
                Factor::Contextual,
                Direction::Gte,
                LevelTargets::new(0.5, 0.8, 0.9),
            ),
            Requirement::new(
                "foreign_key_coverage",
                Factor::Contextual,
                Direction::Gte,
                LevelTargets::new(0.3, 0.5, 0.7),
            ),
            Requirement::new(
                "temporal_scope_present",
                Factor::Contextual,
                Direction::Gte,
                LevelTargets::new(0.5, 0.7, 0.9),
            ),
            Requirement::new(
                "semantic_model_coverage",
                Factor::Contextual,
                Direction::Gte,
                LevelTargets::new(0.1, 0.3, 0.5),
            ),
            Requirement::new(
                "column_comment_coverage",
                Factor::Consumable,
                Direction::Gte,
                LevelTargets::new(0.0, 0.0, 0.0),
            ),
            Requirement::new(
                "serving_capability",
                Factor::Consumable,
                Direction::Gte,
                LevelTargets::new(0.0, 0.0, 0.0),
            ),
            Requirement::new(
                "freshness_metadata",
                Factor::Current,
                Direction::Gte,
                LevelTargets::new(0.0, 0.0, 0.0),
            ),
            Requirement::new(
                "lineage_metadata",
                Factor::Correlated,
                Direction::Gte,
                LevelTargets::new(0.0, 0.0, 0.0),
            ),
            Requirement::new(
                "access_control_metadata",
                Factor::Compliant,
                Direction::Gte,
                LevelTargets::new(0.0, 0.0, 0.0),
            ),
        ];
        for requirement in catalog {
            entries.insert(requirement.key.clone(), requirement);
        }
        Self {
            entries,
        }
    }

    /// Looks up a requirement by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Requirement> {
        self.entries.get(key)
    }

    /// Returns true when the requirement is informational.
    #[must_use]
    pub fn is_informational(&self, key: &str) -> bool {
        self.entries.get(key).is_some_and(|entry| entry.informational)
    }

    /// Iterates requirements in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Requirement> {
        self.entries.values()
    }

    /// Returns the number of registered requirements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for RequirementRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
