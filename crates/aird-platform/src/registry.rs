// crates/aird-platform/src/registry.rs
// ============================================================================
// Module: Platform Registry
// Description: Scheme-to-adapter map with default-suite binding.
// Purpose: Route connection URIs to backends by scheme.
// Dependencies: aird-core, thiserror
// ============================================================================

//! ## Overview
//! The platform registry resolves connection strings by scheme. Registration
//! happens once at initialisation; lookups after that never block or mutate.
//! Resolving an unknown scheme fails with a message listing the supported
//! schemes. Each entry binds an adapter name, a connect function, and the
//! adapter's default suite name.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use aird_core::Connection;
use aird_core::ConnectionError;
use thiserror::Error;

use crate::duckdb;
use crate::snowflake;
use crate::sqlite;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Platform resolution errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling; unknown-scheme and
///   missing-scheme are usage errors, connection errors are runtime errors.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Connection string lacks a `scheme://` prefix.
    #[error("invalid connection string: {0:?} (expected scheme://...)")]
    MissingScheme(String),
    /// Scheme has no registered adapter.
    #[error("unknown connection scheme: {scheme}. Supported: {supported}")]
    UnknownScheme {
        /// The unrecognised scheme.
        scheme: String,
        /// Comma-separated supported schemes.
        supported: String,
    },
    /// Adapter already registered for the scheme.
    #[error("adapter already registered for scheme: {0}")]
    DuplicateScheme(String),
    /// Adapter-level connection failure.
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

// ============================================================================
// SECTION: Adapter Entry
// ============================================================================

/// Connect function opening a backend connection from a connection string.
pub type ConnectFn = fn(&str) -> Result<Box<dyn Connection>, ConnectionError>;

/// One registered adapter.
///
/// # Invariants
/// - `default_suite` names a suite the suite registry is expected to carry.
#[derive(Clone, Debug)]
pub struct AdapterEntry {
    /// Adapter name (e.g. `sqlite`).
    pub name: &'static str,
    /// Default suite bound to the adapter's SQL dialect.
    pub default_suite: &'static str,
    /// Connect function for the adapter.
    pub connect: ConnectFn,
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Scheme-to-adapter registry.
///
/// # Invariants
/// - Adapter schemes are unique within the registry.
/// - Built once at initialisation; read-only afterwards.
pub struct PlatformRegistry {
    /// Adapter entries keyed by lowercase scheme.
    adapters: BTreeMap<String, AdapterEntry>,
}

impl PlatformRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            adapters: BTreeMap::new(),
        }
    }

    /// Creates a registry with the built-in adapters registered.
    #[must_use]
    pub fn with_builtin_adapters() -> Self {
        let mut registry = Self::new();
        // Built-in registration cannot collide; ignore the duplicate guard.
        let _ = registry.register_adapter("sqlite", sqlite::adapter_entry());
        let _ = registry.register_adapter("duckdb", duckdb::adapter_entry());
        let _ = registry.register_adapter("snowflake", snowflake::adapter_entry());
        registry
    }

    /// Registers an adapter under the given scheme.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::DuplicateScheme`] when the scheme is taken.
    pub fn register_adapter(
        &mut self,
        scheme: impl Into<String>,
        entry: AdapterEntry,
    ) -> Result<(), PlatformError> {
        let scheme = scheme.into().to_lowercase();
        if self.adapters.contains_key(&scheme) {
            return Err(PlatformError::DuplicateScheme(scheme));
        }
        self.adapters.insert(scheme, entry);
        Ok(())
    }

    /// Resolves the adapter entry for a connection string.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when the scheme is missing or unknown.
    pub fn resolve(&self, connection: &str) -> Result<&AdapterEntry, PlatformError> {
        let Some((scheme, _rest)) = connection.split_once("://") else {
            return Err(PlatformError::MissingScheme(connection.to_string()));
        };
        let scheme = scheme.to_lowercase();
        self.adapters.get(&scheme).ok_or_else(|| PlatformError::UnknownScheme {
            scheme,
            supported: self.supported_schemes().join(", "),
        })
    }

    /// Returns the default suite name bound to the connection's adapter.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when the scheme cannot be resolved.
    pub fn default_suite(&self, connection: &str) -> Result<&'static str, PlatformError> {
        Ok(self.resolve(connection)?.default_suite)
    }

    /// Opens a connection via the resolved adapter.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when resolution or connecting fails.
    pub fn connect(&self, connection: &str) -> Result<Box<dyn Connection>, PlatformError> {
        let entry = self.resolve(connection)?;
        Ok((entry.connect)(connection)?)
    }

    /// Lists supported schemes in sorted order.
    #[must_use]
    pub fn supported_schemes(&self) -> Vec<String> {
        self.adapters.keys().cloned().collect()
    }
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::with_builtin_adapters()
    }
}
