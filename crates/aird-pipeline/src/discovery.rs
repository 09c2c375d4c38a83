// crates/aird-pipeline/src/discovery.rs
// ============================================================================
// Module: Discovery Service
// Description: Platform-agnostic catalog introspection with filters.
// Purpose: Turn a live connection into a deterministic inventory.
// Dependencies: aird-core, aird-platform, tracing
// ============================================================================

//! ## Overview
//! Discovery selects a strategy by adapter identity. Most adapters use the
//! information-schema path: list tables excluding system schemas, retrying
//! without the exclusion for older backends, then list columns per table
//! ordered by ordinal position. SQLite uses its native catalog
//! (`sqlite_master` plus `PRAGMA table_info`). Per-table column failures
//! degrade to an empty column list with a warning; the table entry stays.
//! Identifier literals are inlined with doubled-quote escaping because
//! catalog views are not uniformly parameterisable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use aird_core::ColumnEntry;
use aird_core::Connection;
use aird_core::ConnectionError;
use aird_core::Inventory;
use aird_core::InventoryFilter;
use aird_core::TableEntry;
use aird_platform::escape_literal;
use aird_platform::execute_readonly;

// ============================================================================
// SECTION: Discovery
// ============================================================================

/// Discovers the inventory for a connection, applying scope filters.
///
/// # Errors
///
/// Returns [`ConnectionError`] when table listing fails on every strategy.
pub fn discover(
    connection: &dyn Connection,
    adapter_name: &str,
    filter: &InventoryFilter,
) -> Result<Inventory, ConnectionError> {
    let inventory = if adapter_name == "sqlite" {
        discover_sqlite(connection)?
    } else {
        discover_information_schema(connection)?
    };
    Ok(inventory.filtered(filter))
}

// ============================================================================
// SECTION: Information Schema Path
// ============================================================================

/// Table listing with system schemas excluded.
const TABLES_QUERY: &str = "SELECT table_schema, table_name FROM information_schema.tables \
     WHERE table_schema NOT IN ('information_schema', 'pg_catalog') \
     ORDER BY table_schema, table_name";

/// Permissive table listing for backends that reject the exclusion.
const TABLES_QUERY_PERMISSIVE: &str =
    "SELECT table_schema, table_name FROM information_schema.tables \
     ORDER BY table_schema, table_name";

/// Discovers via `information_schema`, retrying permissively on failure.
fn discover_information_schema(
    connection: &dyn Connection,
) -> Result<Inventory, ConnectionError> {
    let table_rows = match execute_readonly(connection, TABLES_QUERY, &[]) {
        Ok(rows) => rows,
        Err(err) => {
            tracing::debug!(
                error = %err,
                "information_schema query with schema exclusion failed, retrying without"
            );
            execute_readonly(connection, TABLES_QUERY_PERMISSIVE, &[])?
        }
    };
    let mut tables = Vec::new();
    for row in &table_rows {
        let (Some(schema), Some(table)) = (cell_text(row, 0), cell_text(row, 1)) else {
            continue;
        };
        tables.push(TableEntry::new(schema, table));
    }
    let mut columns = Vec::new();
    for entry in &tables {
        columns.extend(discover_columns(connection, entry));
    }
    Ok(Inventory::from_entries(tables, columns))
}

/// Lists one table's columns, degrading to empty on failure.
fn discover_columns(connection: &dyn Connection, entry: &TableEntry) -> Vec<ColumnEntry> {
    let query = format!(
        "SELECT column_name, data_type FROM information_schema.columns WHERE table_schema = \
         '{}' AND table_name = '{}' ORDER BY ordinal_position",
        escape_literal(&entry.schema),
        escape_literal(&entry.table),
    );
    match execute_readonly(connection, &query, &[]) {
        Ok(rows) => rows
            .iter()
            .filter_map(|row| {
                let column = cell_text(row, 0)?;
                let data_type = cell_text(row, 1).unwrap_or_default();
                Some(ColumnEntry {
                    schema: entry.schema.clone(),
                    table: entry.table.clone(),
                    column,
                    data_type,
                })
            })
            .collect(),
        Err(err) => {
            tracing::warn!(
                table = %entry.full_name,
                error = %err,
                "could not discover columns; continuing with an empty column list"
            );
            Vec::new()
        }
    }
}

// ============================================================================
// SECTION: Native SQLite Path
// ============================================================================

/// SQLite's fixed schema name for the primary database.
const SQLITE_SCHEMA: &str = "main";

/// Discovers via `sqlite_master` and `PRAGMA table_info`.
fn discover_sqlite(connection: &dyn Connection) -> Result<Inventory, ConnectionError> {
    let table_rows = execute_readonly(
        connection,
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
         ORDER BY name",
        &[],
    )?;
    let mut tables = Vec::new();
    for row in &table_rows {
        let Some(table) = cell_text(row, 0) else {
            continue;
        };
        tables.push(TableEntry::new(SQLITE_SCHEMA, table));
    }
    let mut columns = Vec::new();
    for entry in &tables {
        // PRAGMA is read-only but not SELECT-shaped, so it bypasses the
        // executor gate and goes straight to the connection.
        let pragma = format!("PRAGMA table_info(\"{}\")", entry.table.replace('"', "\"\""));
        match connection.execute(&pragma, &[]) {
            Ok(rows) => {
                // Row shape: (cid, name, type, notnull, dflt_value, pk).
                for row in &rows {
                    let Some(column) = cell_text(row, 1) else {
                        continue;
                    };
                    let data_type = cell_text(row, 2).unwrap_or_default();
                    columns.push(ColumnEntry {
                        schema: entry.schema.clone(),
                        table: entry.table.clone(),
                        column,
                        data_type,
                    });
                }
            }
            Err(err) => {
                tracing::warn!(
                    table = %entry.full_name,
                    error = %err,
                    "could not discover columns; continuing with an empty column list"
                );
            }
        }
    }
    Ok(Inventory::from_entries(tables, columns))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads one row cell as text.
fn cell_text(row: &[aird_core::ScalarValue], index: usize) -> Option<String> {
    match row.get(index)? {
        aird_core::ScalarValue::Text(text) => Some(text.clone()),
        aird_core::ScalarValue::Int(value) => Some(value.to_string()),
        _ => None,
    }
}
