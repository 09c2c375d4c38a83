// crates/aird-core/src/runtime/thresholds.rs
// ============================================================================
// Module: Threshold Resolver
// Description: Merge of built-in defaults with user overrides plus scoring.
// Purpose: Decide pass or fail per requirement and workload level.
// Dependencies: serde, crate::core
// ============================================================================

//! ## Overview
//! A [`Thresholds`] value is the immutable merge of the built-in requirement
//! defaults with optional per-requirement user overrides. Overrides may
//! replace any level target and may flip the comparison direction. Unknown
//! requirements resolve to zero targets with the `lte` direction and fail.
//! Scoring fails closed: a missing measured value fails every level unless
//! the requirement is informational.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;

use crate::core::factor::Direction;
use crate::core::factor::WorkloadLevel;
use crate::core::requirement::LevelTargets;
use crate::core::requirement::RequirementRegistry;

// ============================================================================
// SECTION: Overrides
// ============================================================================

/// User override for one requirement.
///
/// # Invariants
/// - Absent fields keep the registry default for that level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct ThresholdOverride {
    /// L1 target replacement.
    #[serde(default)]
    pub l1: Option<f64>,
    /// L2 target replacement.
    #[serde(default)]
    pub l2: Option<f64>,
    /// L3 target replacement.
    #[serde(default)]
    pub l3: Option<f64>,
    /// Direction replacement.
    #[serde(default)]
    pub direction: Option<Direction>,
}

/// Override document keyed by requirement.
pub type ThresholdOverrides = BTreeMap<String, ThresholdOverride>;

// ============================================================================
// SECTION: Thresholds
// ============================================================================

/// Resolved per-requirement targets and directions.
///
/// # Invariants
/// - Immutable after construction.
/// - Unknown requirements resolve to `{0, 0, 0}` with direction `lte`.
#[derive(Debug, Clone)]
pub struct Thresholds {
    /// Level targets keyed by requirement.
    targets: BTreeMap<String, LevelTargets>,
    /// Comparison direction keyed by requirement.
    directions: BTreeMap<String, Direction>,
    /// Requirements that pass unconditionally.
    informational: BTreeSet<String>,
}

impl Thresholds {
    /// Resolves thresholds from the registry defaults alone.
    #[must_use]
    pub fn builtin(registry: &RequirementRegistry) -> Self {
        Self::with_overrides(registry, &ThresholdOverrides::new())
    }

    /// Resolves thresholds from the registry defaults plus user overrides.
    ///
    /// Overridden levels win; unlisted requirements keep their defaults.
    /// Overrides for unknown requirements introduce new entries.
    #[must_use]
    pub fn with_overrides(
        registry: &RequirementRegistry,
        overrides: &ThresholdOverrides,
    ) -> Self {
        let mut targets = BTreeMap::new();
        let mut directions = BTreeMap::new();
        let mut informational = BTreeSet::new();
        for requirement in registry.iter() {
            targets.insert(requirement.key.clone(), requirement.default_thresholds);
            directions.insert(requirement.key.clone(), requirement.direction);
            if requirement.informational {
                informational.insert(requirement.key.clone());
            }
        }
        for (key, patch) in overrides {
            let base = targets.get(key).copied().unwrap_or_default();
            targets.insert(
                key.clone(),
                LevelTargets::new(
                    patch.l1.unwrap_or(base.l1),
                    patch.l2.unwrap_or(base.l2),
                    patch.l3.unwrap_or(base.l3),
                ),
            );
            if let Some(direction) = patch.direction {
                directions.insert(key.clone(), direction);
            }
        }
        Self {
            targets,
            directions,
            informational,
        }
    }

    /// Returns the resolved target triple for a requirement.
    #[must_use]
    pub fn targets_for(&self, requirement: &str) -> LevelTargets {
        self.targets.get(requirement).copied().unwrap_or_default()
    }

    /// Returns the resolved target for a requirement at one level.
    #[must_use]
    pub fn target(&self, requirement: &str, level: WorkloadLevel) -> f64 {
        self.targets_for(requirement).for_level(level)
    }

    /// Returns the resolved comparison direction for a requirement.
    #[must_use]
    pub fn direction(&self, requirement: &str) -> Direction {
        self.directions.get(requirement).copied().unwrap_or_default()
    }

    /// Returns true when the requirement passes unconditionally.
    #[must_use]
    pub fn is_informational(&self, requirement: &str) -> bool {
        self.informational.contains(requirement)
    }

    /// Scoring predicate for one requirement, measured value, and level.
    ///
    /// Informational requirements always pass; a missing value fails;
    /// otherwise the resolved direction compares the value to the target.
    #[must_use]
    pub fn passes(
        &self,
        requirement: &str,
        measured: Option<f64>,
        level: WorkloadLevel,
    ) -> bool {
        if self.is_informational(requirement) {
            return true;
        }
        let Some(value) = measured else {
            return false;
        };
        let target = self.target(requirement, level);
        match self.direction(requirement) {
            Direction::Gte => value >= target,
            Direction::Lte => value <= target,
        }
    }

    /// Scores all three levels at once, in L1, L2, L3 order.
    #[must_use]
    pub fn verdicts(&self, requirement: &str, measured: Option<f64>) -> [bool; 3] {
        [
            self.passes(requirement, measured, WorkloadLevel::Analytics),
            self.passes(requirement, measured, WorkloadLevel::Rag),
            self.passes(requirement, measured, WorkloadLevel::Training),
        ]
    }
}
