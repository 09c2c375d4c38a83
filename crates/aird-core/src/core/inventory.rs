// crates/aird-core/src/core/inventory.rs
// ============================================================================
// Module: Catalog Inventory
// Description: Schemas, tables, and columns discovered from one data source.
// Purpose: Provide the deterministic substrate for suite expansion.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! An [`Inventory`] is the ordered product of catalog discovery: schema names,
//! table entries with precomputed full names, and column entries with raw
//! backend data types. Filters narrow an inventory by schema whitelist and by
//! table names accepted in both `table` and `schema.table` forms,
//! case-insensitively. Column entries for excluded tables are dropped with
//! their table.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Entries
// ============================================================================

/// One discovered table.
///
/// # Invariants
/// - `full_name` is always `schema + "." + table`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntry {
    /// Owning schema name.
    pub schema: String,
    /// Bare table name.
    pub table: String,
    /// Qualified `schema.table` name.
    pub full_name: String,
}

impl TableEntry {
    /// Creates a table entry, deriving the qualified name.
    #[must_use]
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        let schema = schema.into();
        let table = table.into();
        let full_name = format!("{schema}.{table}");
        Self {
            schema,
            table,
            full_name,
        }
    }
}

/// One discovered column.
///
/// # Invariants
/// - `(schema, table)` always matches an entry in the owning inventory's
///   table list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnEntry {
    /// Owning schema name.
    pub schema: String,
    /// Owning table name.
    pub table: String,
    /// Column name.
    pub column: String,
    /// Raw backend data type label.
    pub data_type: String,
}

// ============================================================================
// SECTION: Inventory
// ============================================================================

/// Catalog inventory for one pipeline run.
///
/// # Invariants
/// - Ordering is deterministic: discovery emits schema, then table, then
///   ordinal column position; filters preserve relative order.
/// - Every column's `(schema, table)` pair has a matching table entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    /// Ordered distinct schema names.
    pub schemas: Vec<String>,
    /// Ordered table entries.
    pub tables: Vec<TableEntry>,
    /// Ordered column entries.
    pub columns: Vec<ColumnEntry>,
}

impl Inventory {
    /// Builds an inventory from table and column entries, deriving the
    /// schema list from the surviving tables.
    #[must_use]
    pub fn from_entries(tables: Vec<TableEntry>, columns: Vec<ColumnEntry>) -> Self {
        let schemas: BTreeSet<String> =
            tables.iter().map(|entry| entry.schema.clone()).collect();
        Self {
            schemas: schemas.into_iter().collect(),
            tables,
            columns,
        }
    }

    /// Returns a filtered copy of the inventory.
    ///
    /// Schema filters are exact-match whitelists. Table filters accept both
    /// `table` and `schema.table` forms, case-insensitively. Columns of
    /// excluded tables are dropped.
    #[must_use]
    pub fn filtered(&self, filter: &InventoryFilter) -> Self {
        if filter.is_empty() {
            return self.clone();
        }
        let tables_upper: BTreeSet<String> =
            filter.tables.iter().map(|name| name.to_uppercase()).collect();
        let tables: Vec<TableEntry> = self
            .tables
            .iter()
            .filter(|entry| {
                if !filter.schemas.is_empty() && !filter.schemas.contains(&entry.schema) {
                    return false;
                }
                if tables_upper.is_empty() {
                    return true;
                }
                tables_upper.contains(&entry.full_name.to_uppercase())
                    || tables_upper.contains(&entry.table.to_uppercase())
            })
            .cloned()
            .collect();
        let columns: Vec<ColumnEntry> = self
            .columns
            .iter()
            .filter(|column| {
                tables
                    .iter()
                    .any(|entry| entry.schema == column.schema && entry.table == column.table)
            })
            .cloned()
            .collect();
        Self::from_entries(tables, columns)
    }

    /// Returns true when the inventory contains no tables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

// ============================================================================
// SECTION: Filter
// ============================================================================

/// Scope filter applied to an inventory.
///
/// # Invariants
/// - Empty lists mean "no restriction" for that dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryFilter {
    /// Exact-match schema whitelist.
    pub schemas: Vec<String>,
    /// Table names in `table` or `schema.table` form.
    pub tables: Vec<String>,
}

impl InventoryFilter {
    /// Creates a filter from optional schema and table lists.
    #[must_use]
    pub fn new(schemas: Vec<String>, tables: Vec<String>) -> Self {
        Self {
            schemas,
            tables,
        }
    }

    /// Returns true when the filter imposes no restriction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty() && self.tables.is_empty()
    }
}
