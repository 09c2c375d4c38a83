// crates/aird-suites/src/lib.rs
// ============================================================================
// Module: AIRD Suites
// Description: Suite registry with additive registration and extension.
// Purpose: Hold declarative test suites and resolve extension chains.
// Dependencies: aird-core, serde_yaml, thiserror, tracing
// ============================================================================

//! ## Overview
//! The suite registry maps suite names to test definition lists. Multiple
//! documents may contribute to the same suite name; later documents append
//! in load order, and directory loading sorts file names so registration is
//! deterministic. A document's `extends` parents must already be registered;
//! resolution concatenates parents' resolved test lists depth-first before
//! the suite's own tests and rejects cycles by path at load time.
//!
//! Security posture: suite documents are untrusted input; one invalid test
//! invalidates its whole document before anything registers.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod builtin;
pub mod loader;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use aird_core::SuiteDefinition;
use aird_core::TestDefinition;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Suite registry and loader errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SuiteError {
    /// Document could not be parsed as YAML.
    #[error("suite file {origin}: {message}")]
    Parse {
        /// Document origin (file name or label).
        origin: String,
        /// Parser failure description.
        message: String,
    },
    /// Document failed validation.
    #[error("suite file {origin}: validation errors: {message}")]
    Invalid {
        /// Document origin (file name or label).
        origin: String,
        /// Joined validation failure descriptions.
        message: String,
    },
    /// An `extends` parent is not registered yet.
    #[error("suite '{suite}' extends unknown suite '{parent}'")]
    UnknownParent {
        /// Extending suite name.
        suite: String,
        /// Missing parent name.
        parent: String,
    },
    /// Extension chain loops back on itself.
    #[error("suite extension cycle: {path}")]
    ExtendsCycle {
        /// Arrow-joined cycle path.
        path: String,
    },
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Registry of declarative suites and their extension edges.
///
/// # Invariants
/// - Registration is additive per suite name and atomic per document.
/// - Extension parents exist at registration time; cycles never register.
#[derive(Debug, Default)]
pub struct SuiteRegistry {
    /// Raw registered tests per suite name.
    suites: BTreeMap<String, Vec<TestDefinition>>,
    /// Extension parents per suite name, in registration order.
    extends: BTreeMap<String, Vec<String>>,
}

impl SuiteRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-loaded with the built-in dialect suites.
    ///
    /// # Errors
    ///
    /// Returns [`SuiteError`] when a built-in document fails to load, which
    /// indicates a packaging defect.
    pub fn with_builtin_suites() -> Result<Self, SuiteError> {
        let mut registry = Self::new();
        builtin::register_builtin_suites(&mut registry)?;
        Ok(registry)
    }

    /// Registers one validated suite document.
    ///
    /// Tests append to any existing registration under the same name. The
    /// document's parents must already be registered, and the resulting
    /// extension graph must stay acyclic; a violating document does not
    /// register at all.
    ///
    /// # Errors
    ///
    /// Returns [`SuiteError`] for unknown parents or extension cycles.
    pub fn register_document(&mut self, document: SuiteDefinition) -> Result<(), SuiteError> {
        for parent in &document.extends {
            if !self.is_registered(parent) {
                return Err(SuiteError::UnknownParent {
                    suite: document.suite_name.clone(),
                    parent: parent.clone(),
                });
            }
        }
        let previous_extends = self.extends.get(&document.suite_name).cloned();
        if !document.extends.is_empty() {
            self.extends
                .entry(document.suite_name.clone())
                .or_default()
                .extend(document.extends.iter().cloned());
        }
        if let Err(err) = self.check_acyclic(&document.suite_name) {
            // Atomic registration: roll the extension edges back.
            match previous_extends {
                Some(edges) => {
                    self.extends.insert(document.suite_name.clone(), edges);
                }
                None => {
                    self.extends.remove(&document.suite_name);
                }
            }
            return Err(err);
        }
        self.suites
            .entry(document.suite_name.clone())
            .or_default()
            .extend(document.tests);
        tracing::debug!(suite = %document.suite_name, "registered suite document");
        Ok(())
    }

    /// Returns true when the suite name has any registration.
    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.suites.contains_key(name) || self.extends.contains_key(name)
    }

    /// Resolves a suite into its full test list, parents first.
    ///
    /// Unknown suites resolve to an empty list; the runner treats an empty
    /// suite as an empty result set.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Vec<TestDefinition> {
        let mut out = Vec::new();
        let mut path = Vec::new();
        self.resolve_into(name, &mut path, &mut out);
        out
    }

    /// Depth-first resolution helper with a visited path.
    fn resolve_into(&self, name: &str, path: &mut Vec<String>, out: &mut Vec<TestDefinition>) {
        if path.iter().any(|seen| seen == name) {
            // Cycles are rejected at registration; a repeat here can only
            // come from diamond-shaped extension, which is benign to skip.
            return;
        }
        path.push(name.to_string());
        if let Some(parents) = self.extends.get(name) {
            for parent in parents {
                self.resolve_into(parent, path, out);
            }
        }
        if let Some(tests) = self.suites.get(name) {
            out.extend(tests.iter().cloned());
        }
        path.pop();
    }

    /// Rejects extension cycles reachable from one suite.
    fn check_acyclic(&self, name: &str) -> Result<(), SuiteError> {
        let mut path = Vec::new();
        self.walk_extends(name, &mut path)
    }

    /// Depth-first cycle walk recording the visiting path.
    fn walk_extends(&self, name: &str, path: &mut Vec<String>) -> Result<(), SuiteError> {
        if path.iter().any(|seen| seen == name) {
            let mut cycle = path.clone();
            cycle.push(name.to_string());
            return Err(SuiteError::ExtendsCycle {
                path: cycle.join(" -> "),
            });
        }
        path.push(name.to_string());
        if let Some(parents) = self.extends.get(name) {
            for parent in parents {
                self.walk_extends(parent, path)?;
            }
        }
        path.pop();
        Ok(())
    }

    /// Lists suite names in sorted order.
    #[must_use]
    pub fn suite_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.suites.keys().cloned().collect();
        for name in self.extends.keys() {
            if !self.suites.contains_key(name) {
                names.push(name.clone());
            }
        }
        names.sort();
        names
    }

    /// Returns the extension parents of a suite.
    #[must_use]
    pub fn extends_of(&self, name: &str) -> &[String] {
        self.extends.get(name).map_or(&[], Vec::as_slice)
    }
}
