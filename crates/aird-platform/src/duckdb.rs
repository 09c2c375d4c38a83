// crates/aird-platform/src/duckdb.rs
// ============================================================================
// Module: DuckDB Adapter
// Description: Embedded DuckDB backend behind the `duckdb` feature.
// Purpose: Open duckdb:// connections when the capability is compiled in.
// Dependencies: aird-core, duckdb (optional), percent-encoding
// ============================================================================

//! ## Overview
//! DuckDB is an optional embedded backend. The scheme stays registered in
//! every build so default-suite binding and scheme errors behave uniformly;
//! without the `duckdb` feature, connecting fails with a capability error
//! naming the missing feature. URI handling mirrors the SQLite adapter:
//! `duckdb:///absolute/path`, `duckdb://relative/path`, and `:memory:`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use aird_core::Connection;
use aird_core::ConnectionError;
use percent_encoding::percent_decode_str;

use crate::registry::AdapterEntry;

// ============================================================================
// SECTION: Adapter Entry
// ============================================================================

/// Returns the registry entry for the DuckDB adapter.
#[must_use]
pub fn adapter_entry() -> AdapterEntry {
    AdapterEntry {
        name: "duckdb",
        default_suite: "common",
        connect,
    }
}

// ============================================================================
// SECTION: URI Parsing
// ============================================================================

/// Resolves the database path from a `duckdb://` connection string.
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
// SECTION: Connect (feature-gated)
// ============================================================================

/// Opens a boxed DuckDB connection for the registry.
#[cfg(feature = "duckdb")]
fn connect(connection: &str) -> Result<Box<dyn Connection>, ConnectionError> {
    Ok(Box::new(backend::DuckdbConnection::open(connection)?))
}

/// Fails with a capability error when DuckDB support is compiled out.
#[cfg(not(feature = "duckdb"))]
fn connect(_connection: &str) -> Result<Box<dyn Connection>, ConnectionError> {
    Err(ConnectionError::Unsupported(
        "duckdb support is not compiled in (enable the `duckdb` feature)".to_string(),
    ))
}

// ============================================================================
// SECTION: Backend (feature-gated)
// ============================================================================

#[cfg(feature = "duckdb")]
mod backend {
    //! DuckDB-backed connection implementation.

    use std::str::FromStr;

    use aird_core::IdentifierQuoting;
    use aird_core::ScalarValue;
    use bigdecimal::BigDecimal;
    use ::duckdb::types::Value;
    use ::duckdb::types::ValueRef;

    use super::Connection;
    use super::ConnectionError;
    use super::database_path;

    /// DuckDB-backed probe connection.
    ///
    /// # Invariants
    /// - One statement at a time; the pipeline holds exclusive use.
    pub struct DuckdbConnection {
        /// Underlying duckdb handle.
        inner: ::duckdb::Connection,
    }

    impl DuckdbConnection {
        /// Opens a connection for the given connection string.
        ///
        /// # Errors
        ///
        /// Returns [`ConnectionError::Connect`] when the database cannot be
        /// opened.
        pub fn open(connection: &str) -> Result<Self, ConnectionError> {
            let path = database_path(connection);
            let inner = if path == ":memory:" {
                ::duckdb::Connection::open_in_memory()
            } else {
                ::duckdb::Connection::open(&path)
            }
            .map_err(|err| ConnectionError::Connect(err.to_string()))?;
            Ok(Self {
                inner,
            })
        }
    }

    impl IdentifierQuoting for DuckdbConnection {}

    impl Connection for DuckdbConnection {
        fn execute(
            &self,
            sql: &str,
            params: &[ScalarValue],
        ) -> Result<Vec<Vec<ScalarValue>>, ConnectionError> {
            let mut statement = self
                .inner
                .prepare(sql)
                .map_err(|err| ConnectionError::Execute(err.to_string()))?;
            let bound = params.iter().map(bind_value).collect::<Vec<Value>>();
            let mut rows = statement
                .query(::duckdb::params_from_iter(bound))
                .map_err(|err| ConnectionError::Execute(err.to_string()))?;
            let mut out = Vec::new();
            loop {
                let row = match rows.next() {
                    Ok(Some(row)) => row,
                    Ok(None) => break,
                    Err(err) => return Err(ConnectionError::Execute(err.to_string())),
                };
                let column_count = row.as_ref().column_count();
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

    /// Converts an engine scalar into a duckdb bind value.
    fn bind_value(value: &ScalarValue) -> Value {
        match value {
            ScalarValue::Null => Value::Null,
            ScalarValue::Int(inner) => Value::BigInt(*inner),
            ScalarValue::Float(inner) => Value::Double(*inner),
            ScalarValue::Decimal(_) => value.as_f64().map_or(Value::Null, Value::Double),
            ScalarValue::Text(inner) => Value::Text(inner.clone()),
            ScalarValue::Bytes(inner) => Value::Blob(inner.clone()),
        }
    }

    /// Converts a duckdb cell into an engine scalar. Exotic nested types
    /// have no numeric projection and degrade to NULL.
    fn scalar_from_ref(cell: ValueRef<'_>) -> ScalarValue {
        match cell {
            ValueRef::Null => ScalarValue::Null,
            ValueRef::Boolean(inner) => ScalarValue::Int(i64::from(inner)),
            ValueRef::TinyInt(inner) => ScalarValue::Int(i64::from(inner)),
            ValueRef::SmallInt(inner) => ScalarValue::Int(i64::from(inner)),
            ValueRef::Int(inner) => ScalarValue::Int(i64::from(inner)),
            ValueRef::BigInt(inner) => ScalarValue::Int(inner),
            ValueRef::UTinyInt(inner) => ScalarValue::Int(i64::from(inner)),
            ValueRef::USmallInt(inner) => ScalarValue::Int(i64::from(inner)),
            ValueRef::UInt(inner) => ScalarValue::Int(i64::from(inner)),
            ValueRef::UBigInt(inner) => i64::try_from(inner)
                .map_or(ScalarValue::Null, ScalarValue::Int),
            ValueRef::Float(inner) => ScalarValue::Float(f64::from(inner)),
            ValueRef::Double(inner) => ScalarValue::Float(inner),
            ValueRef::Decimal(inner) => BigDecimal::from_str(&inner.to_string())
                .map_or(ScalarValue::Null, ScalarValue::Decimal),
            ValueRef::Text(inner) => {
                ScalarValue::Text(String::from_utf8_lossy(inner).into_owned())
            }
            ValueRef::Blob(inner) => ScalarValue::Bytes(inner.to_vec()),
            _ => ScalarValue::Null,
        }
    }
}
