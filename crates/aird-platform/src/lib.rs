// crates/aird-platform/src/lib.rs
// ============================================================================
// Module: AIRD Platform
// Description: Platform registry, read-only executor, backend adapters.
// Purpose: Map connection URIs to backends while enforcing read-only access.
// Dependencies: aird-core, rusqlite, url, toml, percent-encoding
// ============================================================================

//! ## Overview
//! This crate ships the scheme-to-adapter registry, the read-only statement
//! gate, and the built-in adapters: SQLite (always available), DuckDB
//! (feature `duckdb`), and Snowflake (credential resolution always available;
//! REST execution behind feature `snowflake`). Adapters whose backend is not
//! compiled in stay registered so scheme resolution and default-suite
//! binding keep working, and fail with a clean capability error at connect
//! time.
//!
//! Security posture: connection strings and SQL are untrusted; every
//! statement passes the read-only gate before reaching a backend, and error
//! messages never embed credentials.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod duckdb;
pub mod executor;
pub mod registry;
pub mod snowflake;
pub mod sqlite;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use executor::escape_literal;
pub use executor::execute_readonly;
pub use executor::validate_readonly;
pub use registry::AdapterEntry;
pub use registry::PlatformError;
pub use registry::PlatformRegistry;
pub use snowflake::SnowflakeConnectionConfig;
pub use sqlite::SqliteConnection;
