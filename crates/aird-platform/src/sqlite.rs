// crates/aird-platform/src/sqlite.rs
// ============================================================================
// Module: SQLite Adapter
// Description: Embedded SQLite backend via rusqlite.
// Purpose: Open sqlite:// connections and run read probes.
// Dependencies: aird-core, rusqlite, percent-encoding
// ============================================================================

//! ## Overview
//! The SQLite adapter accepts `sqlite:///absolute/path`,
//! `sqlite://relative/path`, and `sqlite://:memory:` (or an empty opaque
//! part) for an in-memory database. Paths are percent-decoded. Rows convert
//! into the engine's tagged scalar values; rusqlite's native placeholder is
//! already the canonical `?`, so no translation wrapper is needed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use aird_core::Connection;
use aird_core::ConnectionError;
use aird_core::IdentifierQuoting;
use aird_core::ScalarValue;
use percent_encoding::percent_decode_str;
use rusqlite::types::Value;
use rusqlite::types::ValueRef;

use crate::registry::AdapterEntry;

// ============================================================================
// SECTION: Adapter Entry
// ============================================================================

/// Returns the registry entry for the SQLite adapter.
#[must_use]
pub fn adapter_entry() -> AdapterEntry {
    AdapterEntry {
        name: "sqlite",
        default_suite: "common_sqlite",
        connect,
    }
}

// ============================================================================
// SECTION: URI Parsing
// ============================================================================

/// Resolves the database path from a `sqlite://` connection string.
///
/// An empty opaque part or `:memory:` selects an in-memory database.
#[must_use]
pub fn database_path(connection: &str) -> String {
    let rest = connection.split_once("://").map_or(connection, |(_, rest)| rest);
    let rest = rest.trim();
    if rest.is_empty() || rest == ":memory:" {
        return ":memory:".to_string();
    }
    percent_decode_str(rest).decode_utf8_lossy().into_owned()
}

// ============================================================================
// SECTION: Connection
// ============================================================================

/// SQLite-backed probe connection.
///
/// # Invariants
/// - One statement at a time; the pipeline holds exclusive use.
pub struct SqliteConnection {
    /// Underlying rusqlite handle.
    inner: rusqlite::Connection,
}

impl SqliteConnection {
    /// Opens a connection for the given connection string.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Connect`] when the database cannot be
    /// opened.
    pub fn open(connection: &str) -> Result<Self, ConnectionError> {
        let path = database_path(connection);
        let inner = if path == ":memory:" {
            rusqlite::Connection::open_in_memory()
        } else {
            rusqlite::Connection::open(&path)
        }
        .map_err(|err| ConnectionError::Connect(err.to_string()))?;
        Ok(Self {
            inner,
        })
    }

}

/// Opens a boxed SQLite connection for the registry.
fn connect(connection: &str) -> Result<Box<dyn Connection>, ConnectionError> {
    Ok(Box::new(SqliteConnection::open(connection)?))
}

impl IdentifierQuoting for SqliteConnection {}

impl Connection for SqliteConnection {
    fn execute(
        &self,
        sql: &str,
        params: &[ScalarValue],
    ) -> Result<Vec<Vec<ScalarValue>>, ConnectionError> {
        let mut statement = self
            .inner
            .prepare(sql)
            .map_err(|err| ConnectionError::Execute(err.to_string()))?;
        let column_count = statement.column_count();
        let bound = params.iter().map(bind_value).collect::<Vec<Value>>();
        let mut rows = statement
            .query(rusqlite::params_from_iter(bound))
            .map_err(|err| ConnectionError::Execute(err.to_string()))?;
        let mut out = Vec::new();
        loop {
            let row = match rows.next() {
                Ok(Some(row)) => row,
                Ok(None) => break,
                Err(err) => return Err(ConnectionError::Execute(err.to_string())),
            };
            let mut cells = Vec::with_capacity(column_count);
            for index in 0 .. column_count {
                let cell = row
                    .get_ref(index)
                    .map_err(|err| ConnectionError::Execute(err.to_string()))?;
                cells.push(scalar_from_ref(cell));
            }
            out.push(cells);
        }
        Ok(out)
    }
}

// ============================================================================
// SECTION: Value Conversion
// ============================================================================

/// Converts an engine scalar into a rusqlite bind value.
fn bind_value(value: &ScalarValue) -> Value {
    match value {
        ScalarValue::Null => Value::Null,
        ScalarValue::Int(inner) => Value::Integer(*inner),
        ScalarValue::Float(inner) => Value::Real(*inner),
        ScalarValue::Decimal(_) => value.as_f64().map_or(Value::Null, Value::Real),
        ScalarValue::Text(inner) => Value::Text(inner.clone()),
        ScalarValue::Bytes(inner) => Value::Blob(inner.clone()),
    }
}

/// Converts a rusqlite cell into an engine scalar.
fn scalar_from_ref(cell: ValueRef<'_>) -> ScalarValue {
    match cell {
        ValueRef::Null => ScalarValue::Null,
        ValueRef::Integer(inner) => ScalarValue::Int(inner),
        ValueRef::Real(inner) => ScalarValue::Float(inner),
        ValueRef::Text(inner) => ScalarValue::Text(String::from_utf8_lossy(inner).into_owned()),
        ValueRef::Blob(inner) => ScalarValue::Bytes(inner.to_vec()),
    }
}
