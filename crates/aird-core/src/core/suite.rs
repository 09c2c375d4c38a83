// crates/aird-core/src/core/suite.rs
// ============================================================================
// Module: Suite Definitions
// Description: Declarative test definitions and their expanded probe form.
// Purpose: Model suite documents before and after inventory expansion.
// Dependencies: serde, thiserror, crate::core::factor
// ============================================================================

//! ## Overview
//! A suite is a named collection of test definitions. Each definition carries
//! exactly one of a fixed query or a query template with `{schema_q}`,
//! `{table_q}`, `{column_q}` placeholders for adapter-quoted identifiers.
//! Validation happens before registration and is atomic per document: one
//! invalid test rejects the whole document.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::factor::Factor;
use crate::core::factor::TargetType;

// ============================================================================
// SECTION: Query Source
// ============================================================================

/// SQL carried by a test definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuerySource {
    /// Fixed SQL executed as-is.
    Fixed(String),
    /// SQL template expanded per inventory entry.
    Template(String),
}

impl QuerySource {
    /// Returns the raw SQL text regardless of variant.
    #[must_use]
    pub fn sql(&self) -> &str {
        match self {
            Self::Fixed(sql) | Self::Template(sql) => sql,
        }
    }
}

// ============================================================================
// SECTION: Test Definition
// ============================================================================

/// One declarative test from a suite document.
///
/// # Invariants
/// - Exactly one query source (enforced at load time by construction).
/// - `id` is stable; expanded probe ids are derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDefinition {
    /// Base test identifier.
    pub id: String,
    /// Owning factor.
    pub factor: Factor,
    /// Requirement key scored against.
    pub requirement: String,
    /// Expansion scope.
    pub target_type: TargetType,
    /// Fixed query or template.
    pub source: QuerySource,
}

// ============================================================================
// SECTION: Suite Definition
// ============================================================================

/// One declarative suite document.
///
/// # Invariants
/// - `suite_name` is non-empty.
/// - Either `tests` or `extends` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteDefinition {
    /// Suite name the document registers into.
    pub suite_name: String,
    /// Informational platform label (e.g. `sqlite`).
    pub platform: Option<String>,
    /// Parent suites whose tests precede this document's tests.
    pub extends: Vec<String>,
    /// Test definitions contributed by this document.
    pub tests: Vec<TestDefinition>,
}

impl SuiteDefinition {
    /// Validates the structural rules that do not depend on the registry.
    ///
    /// # Errors
    ///
    /// Returns [`SuiteValidationError`] when the name is empty or the
    /// document carries neither tests nor parents.
    pub fn validate(&self) -> Result<(), SuiteValidationError> {
        if self.suite_name.trim().is_empty() {
            return Err(SuiteValidationError::EmptyName);
        }
        if self.tests.is_empty() && self.extends.is_empty() {
            return Err(SuiteValidationError::EmptyDocument {
                suite_name: self.suite_name.clone(),
            });
        }
        Ok(())
    }
}

/// Structural suite validation failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SuiteValidationError {
    /// Suite name missing or blank.
    #[error("suite document has an empty suite_name")]
    EmptyName,
    /// Document contributes neither tests nor parents.
    #[error("suite '{suite_name}' must declare tests or extends")]
    EmptyDocument {
        /// Offending suite name.
        suite_name: String,
    },
}

// ============================================================================
// SECTION: Expanded Test
// ============================================================================

/// Scope components decoded from an expanded probe id.
///
/// # Invariants
/// - `column` is only present when `schema` and `table` are present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopedId {
    /// Base test identifier.
    pub base: String,
    /// Schema component, when the probe is table- or column-scoped.
    pub schema: Option<String>,
    /// Table component, when the probe is table- or column-scoped.
    pub table: Option<String>,
    /// Column component, when the probe is column-scoped.
    pub column: Option<String>,
}

impl ScopedId {
    /// Decodes a `base|schema|table[|column]` probe id.
    #[must_use]
    pub fn parse(test_id: &str) -> Self {
        let mut parts = test_id.split('|');
        let base = parts.next().unwrap_or_default().to_string();
        let schema = parts.next().map(str::to_string);
        let table = parts.next().map(str::to_string);
        let column = parts.next().map(str::to_string);
        Self {
            base,
            schema,
            table,
            column,
        }
    }

    /// Returns the `schema.table` pair when both components are present.
    #[must_use]
    pub fn qualified_table(&self) -> Option<String> {
        match (&self.schema, &self.table) {
            (Some(schema), Some(table)) => Some(format!("{schema}.{table}")),
            _ => None,
        }
    }
}

/// One concrete executable probe produced by expansion.
///
/// # Invariants
/// - `id` encodes scope as `base_id|schema|table[|column]` for scoped
///   probes and equals the base id for fixed-query probes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandedTest {
    /// Scope-encoded probe identifier.
    pub id: String,
    /// Owning factor.
    pub factor: Factor,
    /// Requirement key scored against.
    pub requirement: String,
    /// Scope the probe was expanded for.
    pub target_type: TargetType,
    /// Concrete SQL to execute.
    pub query: String,
}
