// crates/aird-core/tests/expansion_unit.rs
// ============================================================================
// Module: Suite Expansion Tests
// Description: Determinism, scope predicates, and id encoding checks.
// Purpose: Verify template expansion against a fixed inventory.
// Dependencies: aird-core
// ============================================================================

//! ## Overview
//! Covers the suite expander: byte-identical output across runs, scope-id
//! encoding, per-requirement column scope predicates, platform-template
//! skipping, factor filtering, and inventory filters.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use aird_core::ColumnEntry;
use aird_core::Factor;
use aird_core::IdentifierQuoting;
use aird_core::Inventory;
use aird_core::InventoryFilter;
use aird_core::QuerySource;
use aird_core::TableEntry;
use aird_core::TargetType;
use aird_core::TestDefinition;
use aird_core::expand_tests;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Default double-quote quoting for tests.
struct DoubleQuote;

impl IdentifierQuoting for DoubleQuote {}

/// Builds the two-table fixture inventory.
fn sample_inventory() -> Inventory {
    let tables = vec![TableEntry::new("main", "products"), TableEntry::new("main", "orders")];
    let columns = vec![
        ColumnEntry {
            schema: "main".to_string(),
            table: "products".to_string(),
            column: "id".to_string(),
            data_type: "INTEGER".to_string(),
        },
        ColumnEntry {
            schema: "main".to_string(),
            table: "products".to_string(),
            column: "name".to_string(),
            data_type: "VARCHAR".to_string(),
        },
        ColumnEntry {
            schema: "main".to_string(),
            table: "products".to_string(),
            column: "created_at".to_string(),
            data_type: "TEXT".to_string(),
        },
        ColumnEntry {
            schema: "main".to_string(),
            table: "orders".to_string(),
            column: "amount".to_string(),
            data_type: "DOUBLE".to_string(),
        },
    ];
    Inventory::from_entries(tables, columns)
}

/// Builds a column-scoped template test for one requirement.
fn column_test(id: &str, requirement: &str) -> TestDefinition {
    TestDefinition {
        id: id.to_string(),
        factor: Factor::Clean,
        requirement: requirement.to_string(),
        target_type: TargetType::Column,
        source: QuerySource::Template(
            "SELECT {column_q} FROM {schema_q}.{table_q}".to_string(),
        ),
    }
}

// ============================================================================
// SECTION: Expansion
// ============================================================================

#[test]
fn fixed_queries_pass_through_unchanged() {
    let tests = vec![TestDefinition {
        id: "clean_table_count".to_string(),
        factor: Factor::Clean,
        requirement: "table_discovery".to_string(),
        target_type: TargetType::Platform,
        source: QuerySource::Fixed("SELECT COUNT(*) FROM sqlite_master".to_string()),
    }];
    let expanded = expand_tests(&tests, &sample_inventory(), &DoubleQuote, None);
    assert_eq!(expanded.len(), 1);
    assert_eq!(expanded[0].id, "clean_table_count");
    assert_eq!(expanded[0].query, "SELECT COUNT(*) FROM sqlite_master");
}

#[test]
fn table_templates_expand_per_table_with_scoped_ids() {
    let tests = vec![TestDefinition {
        id: "duplicate_rate".to_string(),
        factor: Factor::Clean,
        requirement: "duplicate_rate".to_string(),
        target_type: TargetType::Table,
        source: QuerySource::Template("SELECT 1 FROM {schema_q}.{table_q}".to_string()),
    }];
    let expanded = expand_tests(&tests, &sample_inventory(), &DoubleQuote, None);
    assert_eq!(expanded.len(), 2);
    assert_eq!(expanded[0].id, "duplicate_rate|main|products");
    assert_eq!(expanded[0].query, "SELECT 1 FROM \"main\".\"products\"");
    assert_eq!(expanded[1].id, "duplicate_rate|main|orders");
}

#[test]
fn column_templates_expand_in_inventory_order() {
    let tests = vec![column_test("null_rate", "null_rate")];
    let expanded = expand_tests(&tests, &sample_inventory(), &DoubleQuote, None);
    let ids: Vec<&str> = expanded.iter().map(|test| test.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "null_rate|main|products|id",
            "null_rate|main|products|name",
            "null_rate|main|products|created_at",
            "null_rate|main|orders|amount",
        ]
    );
}

#[test]
fn numeric_scope_restricts_to_numeric_columns() {
    let tests = vec![column_test("zero_negative_rate", "zero_negative_rate")];
    let expanded = expand_tests(&tests, &sample_inventory(), &DoubleQuote, None);
    let ids: Vec<&str> = expanded.iter().map(|test| test.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["zero_negative_rate|main|products|id", "zero_negative_rate|main|orders|amount"]
    );
}

#[test]
fn format_scope_restricts_to_dateish_string_columns() {
    let tests = vec![column_test("format_inconsistency_rate", "format_inconsistency_rate")];
    let expanded = expand_tests(&tests, &sample_inventory(), &DoubleQuote, None);
    let ids: Vec<&str> = expanded.iter().map(|test| test.id.as_str()).collect();
    assert_eq!(ids, vec!["format_inconsistency_rate|main|products|created_at"]);
}

#[test]
fn platform_templates_are_skipped() {
    let tests = vec![TestDefinition {
        id: "bad_template".to_string(),
        factor: Factor::Clean,
        requirement: "null_rate".to_string(),
        target_type: TargetType::Platform,
        source: QuerySource::Template("SELECT 1 FROM {table_q}".to_string()),
    }];
    let expanded = expand_tests(&tests, &sample_inventory(), &DoubleQuote, None);
    assert!(expanded.is_empty());
}

#[test]
fn factor_filter_drops_non_matching_tests() {
    let tests = vec![
        column_test("null_rate", "null_rate"),
        TestDefinition {
            id: "pk".to_string(),
            factor: Factor::Contextual,
            requirement: "primary_key_defined".to_string(),
            target_type: TargetType::Platform,
            source: QuerySource::Fixed("SELECT 1".to_string()),
        },
    ];
    let expanded =
        expand_tests(&tests, &sample_inventory(), &DoubleQuote, Some(Factor::Contextual));
    assert_eq!(expanded.len(), 1);
    assert_eq!(expanded[0].id, "pk");
}

#[test]
fn expansion_is_deterministic() {
    let tests = vec![
        column_test("null_rate", "null_rate"),
        column_test("zero_negative_rate", "zero_negative_rate"),
    ];
    let inventory = sample_inventory();
    let first = expand_tests(&tests, &inventory, &DoubleQuote, None);
    let second = expand_tests(&tests, &inventory, &DoubleQuote, None);
    assert_eq!(first, second);
}

#[test]
fn quoting_doubles_embedded_quotes() {
    let inventory = Inventory::from_entries(
        vec![TableEntry::new("main", "odd\"name")],
        Vec::new(),
    );
    let tests = vec![TestDefinition {
        id: "duplicate_rate".to_string(),
        factor: Factor::Clean,
        requirement: "duplicate_rate".to_string(),
        target_type: TargetType::Table,
        source: QuerySource::Template("SELECT 1 FROM {schema_q}.{table_q}".to_string()),
    }];
    let expanded = expand_tests(&tests, &inventory, &DoubleQuote, None);
    assert_eq!(expanded[0].query, "SELECT 1 FROM \"main\".\"odd\"\"name\"");
}

// ============================================================================
// SECTION: Inventory Filters
// ============================================================================

#[test]
fn table_filter_accepts_bare_and_qualified_names() {
    let inventory = sample_inventory();
    let bare = inventory
        .filtered(&InventoryFilter::new(Vec::new(), vec!["PRODUCTS".to_string()]));
    assert_eq!(bare.tables.len(), 1);
    assert_eq!(bare.tables[0].full_name, "main.products");
    let qualified = inventory
        .filtered(&InventoryFilter::new(Vec::new(), vec!["Main.Products".to_string()]));
    assert_eq!(qualified.tables.len(), 1);
}

#[test]
fn schema_filter_is_exact_match() {
    let inventory = sample_inventory();
    let kept = inventory.filtered(&InventoryFilter::new(vec!["main".to_string()], Vec::new()));
    assert_eq!(kept.tables.len(), 2);
    let dropped = inventory.filtered(&InventoryFilter::new(vec!["MAIN".to_string()], Vec::new()));
    assert!(dropped.tables.is_empty());
}

#[test]
fn columns_of_excluded_tables_are_dropped() {
    let inventory = sample_inventory();
    let filtered = inventory
        .filtered(&InventoryFilter::new(Vec::new(), vec!["orders".to_string()]));
    assert_eq!(filtered.columns.len(), 1);
    assert_eq!(filtered.columns[0].column, "amount");
    assert_eq!(filtered.schemas, vec!["main".to_string()]);
}
