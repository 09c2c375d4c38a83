// crates/aird-pipeline/tests/common/mod.rs
// ============================================================================
// Module: Pipeline Test Fixtures
// Description: Seeded SQLite databases and config builders.
// Purpose: Share end-to-end fixtures across pipeline test suites.
// Dependencies: aird-pipeline, rusqlite, tempfile
// ============================================================================

//! ## Overview
//! Shared fixtures: a seeded `products` table with known nulls and
//! duplicates, a clean twin of it, and a config builder pinned to a temp
//! history store so tests never touch the user's home directory.

#![allow(
    dead_code,
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Shared test fixtures; not every suite uses every helper."
)]

use std::path::Path;
use std::path::PathBuf;

use aird_pipeline::AssessConfig;

/// Seed rows for the dirty products table: two nulls and two duplicates.
pub const PRODUCTS_ROWS: [(i64, Option<&str>, f64); 6] = [
    (1, Some("apple"), 1.5),
    (1, Some("apple"), 1.5),
    (2, None, 2.0),
    (2, None, 2.0),
    (3, Some("cherry"), 3.0),
    (4, Some("date"), 4.0),
];

/// Creates a SQLite database seeded with the dirty products table and
/// returns its connection string.
pub fn seed_dirty_products(dir: &Path) -> String {
    let path = dir.join("dirty.db");
    let connection = rusqlite::Connection::open(&path).unwrap();
    create_products(&connection);
    for (id, name, amount) in PRODUCTS_ROWS {
        connection
            .execute(
                "INSERT INTO products (id, name, amount) VALUES (?1, ?2, ?3)",
                rusqlite::params![id, name, amount],
            )
            .unwrap();
    }
    format!("sqlite://{}", path.display())
}

/// Creates a SQLite database whose products table has no nulls or
/// duplicates and returns its connection string.
pub fn seed_clean_products(dir: &Path) -> String {
    let path = dir.join("clean.db");
    let connection = rusqlite::Connection::open(&path).unwrap();
    create_products(&connection);
    for id in 1 ..= 6_i64 {
        connection
            .execute(
                "INSERT INTO products (id, name, amount) VALUES (?1, ?2, ?3)",
                rusqlite::params![id, format!("item-{id}"), 1.5 + id as f64],
            )
            .unwrap();
    }
    format!("sqlite://{}", path.display())
}

/// Creates the products table.
fn create_products(connection: &rusqlite::Connection) {
    connection
        .execute_batch(
            "CREATE TABLE products (
                 id INTEGER,
                 name VARCHAR,
                 amount DOUBLE
             );",
        )
        .unwrap();
}

/// Builds an assess config for one connection with its history store kept
/// inside the test's temp directory.
pub fn test_config(connection: &str, dir: &Path) -> AssessConfig {
    AssessConfig {
        connection: Some(connection.to_string()),
        schemas: Vec::new(),
        tables: Vec::new(),
        context_path: None,
        suite: "auto".to_string(),
        thresholds_path: None,
        no_save: true,
        compare: false,
        dry_run: false,
        audit: false,
        survey: false,
        survey_answers_path: None,
        target_workload: None,
        factor_filter: None,
        product: None,
        db_path: history_path(dir),
    }
}

/// Path of the test history store inside a temp directory.
pub fn history_path(dir: &Path) -> PathBuf {
    dir.join("assessments.db")
}
