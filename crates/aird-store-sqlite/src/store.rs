// crates/aird-store-sqlite/src/store.rs
// ============================================================================
// Module: History Store
// Description: Assessments, benchmarks, and audit streams over SQLite.
// Purpose: Append-only persistence with indexed listing queries.
// Dependencies: rusqlite, serde_json, thiserror, time, uuid
// ============================================================================

//! ## Overview
//! One store file holds three logical record kinds. Assessments are
//! append-only: save returns a fresh UUID and the report JSON never changes
//! afterwards. Listings filter by connection fingerprint and data product,
//! order by `created_at DESC`, and cap the row count; the full report is
//! fetched by id on demand. Benchmarks bind groups of assessment ids under
//! human labels. Audit streams are written only when auditing is enabled.
//!
//! Schema evolution on open: create missing tables, then introspect each
//! additive column and `ALTER TABLE` when absent. Concurrent pipelines
//! writing to one file serialise through the connection mutex and SQLite's
//! transaction boundary.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Store schema version.
const SCHEMA_VERSION: i64 = 1;
/// Busy timeout for concurrent pipeline writes (ms).
const BUSY_TIMEOUT_MS: u64 = 5_000;
/// Default listing limit.
pub const DEFAULT_LIST_LIMIT: usize = 20;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// History store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Messages avoid embedding report payloads.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("history store io error: {0}")]
    Io(String),
    /// SQLite engine error.
    #[error("history store db error: {0}")]
    Db(String),
    /// Persisted data failed to deserialize.
    #[error("history store invalid data: {0}")]
    Invalid(String),
}

/// Maps a rusqlite error into a store error.
fn db_err(err: rusqlite::Error) -> StoreError {
    StoreError::Db(err.to_string())
}

// ============================================================================
// SECTION: Records
// ============================================================================

/// Listing row for one persisted assessment.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentSummary {
    /// Assessment id (UUID).
    pub id: String,
    /// RFC3339 creation timestamp.
    pub created_at: String,
    /// Credential-elided connection identity.
    pub connection_fingerprint: String,
    /// Data product the assessment was scoped to, when any.
    pub data_product: Option<String>,
    /// The persisted report's `summary` object.
    pub summary: Value,
}

/// Filter for assessment listings.
#[derive(Debug, Clone, Default)]
pub struct AssessmentFilter {
    /// Exact fingerprint match, when set.
    pub fingerprint: Option<String>,
    /// Exact data product match, when set.
    pub data_product: Option<String>,
    /// Maximum rows returned (default [`DEFAULT_LIST_LIMIT`]).
    pub limit: Option<usize>,
}

/// One persisted benchmark group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkRecord {
    /// Benchmark id (UUID).
    pub id: String,
    /// RFC3339 creation timestamp.
    pub created_at: String,
    /// Human labels, one per connection.
    pub labels: Vec<String>,
    /// Credential-elided connection identities.
    pub connections: Vec<String>,
    /// Bound assessment ids.
    pub assessment_ids: Vec<String>,
}

/// One audit query event.
#[derive(Debug, Clone, Default)]
pub struct AuditQueryRecord {
    /// Owning assessment id, when known.
    pub assessment_id: Option<String>,
    /// Session correlation id, when known.
    pub session_id: Option<String>,
    /// Executed SQL text.
    pub query: String,
    /// Probe target scope.
    pub target: Option<String>,
    /// Probe factor.
    pub factor: Option<String>,
    /// Probe requirement.
    pub requirement: Option<String>,
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// SQLite-backed history store.
///
/// # Invariants
/// - Assessments are append-only; saved reports never change.
/// - Connection access is serialised through a mutex; writes commit inside
///   transactions.
pub struct HistoryStore {
    /// Shared connection guarded by a mutex.
    connection: Mutex<Connection>,
}

impl HistoryStore {
    /// Opens (or creates) the store at the given path.
    ///
    /// Parent directories are created, missing tables are created, and
    /// additive column migrations run before the store is usable.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the file cannot be opened or initialised.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|err| StoreError::Io(err.to_string()))?;
        }
        let connection = Connection::open(path).map_err(db_err)?;
        Self::from_connection(connection)
    }

    /// Opens an in-memory store (tests and tooling).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when initialisation fails.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let connection = Connection::open_in_memory().map_err(db_err)?;
        Self::from_connection(connection)
    }

    /// Initialises schema on a fresh connection.
    fn from_connection(connection: Connection) -> Result<Self, StoreError> {
        connection
            .busy_timeout(std::time::Duration::from_millis(BUSY_TIMEOUT_MS))
            .map_err(db_err)?;
        initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    /// Locks the connection, mapping poisoning into a store error.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.connection
            .lock()
            .map_err(|_| StoreError::Io("history store mutex poisoned".to_string()))
    }

    // ------------------------------------------------------------------
    // Assessments
    // ------------------------------------------------------------------

    /// Persists one report and returns the new assessment id.
    ///
    /// `created_at` and `connection_fingerprint` are read from the report
    /// when present; a missing timestamp is stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when serialisation or the insert fails.
    pub fn save_assessment(
        &self,
        report: &Value,
        data_product: Option<&str>,
    ) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let created_at = report
            .get("created_at")
            .and_then(Value::as_str)
            .map_or_else(now_rfc3339, ToString::to_string);
        let fingerprint = report
            .get("connection_fingerprint")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let payload = serde_json::to_string(report)
            .map_err(|err| StoreError::Invalid(err.to_string()))?;
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(db_err)?;
        tx.execute(
            "INSERT INTO assessments (id, created_at, connection_fingerprint, data_product, \
             report_json) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, created_at, fingerprint, data_product, payload],
        )
        .map_err(db_err)?;
        tx.commit().map_err(db_err)?;
        Ok(id)
    }

    /// Fetches a persisted report by assessment id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails or the stored JSON is
    /// malformed.
    pub fn get_report(&self, assessment_id: &str) -> Result<Option<Value>, StoreError> {
        let guard = self.lock()?;
        let payload: Option<String> = guard
            .query_row(
                "SELECT report_json FROM assessments WHERE id = ?1",
                params![assessment_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_err)?;
        drop(guard);
        payload
            .map(|text| {
                serde_json::from_str(&text).map_err(|err| StoreError::Invalid(err.to_string()))
            })
            .transpose()
    }

    /// Lists assessments newest-first with optional filters.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails or stored summaries are
    /// malformed.
    pub fn list_assessments(
        &self,
        filter: &AssessmentFilter,
    ) -> Result<Vec<AssessmentSummary>, StoreError> {
        let limit = i64::try_from(filter.limit.unwrap_or(DEFAULT_LIST_LIMIT))
            .map_err(|_| StoreError::Invalid("listing limit too large".to_string()))?;
        let guard = self.lock()?;
        let mut statement = guard
            .prepare(
                "SELECT id, created_at, connection_fingerprint, data_product, report_json \
                 FROM assessments \
                 WHERE (?1 IS NULL OR connection_fingerprint = ?1) \
                   AND (?2 IS NULL OR data_product = ?2) \
                 ORDER BY created_at DESC, rowid DESC LIMIT ?3",
            )
            .map_err(db_err)?;
        let rows = statement
            .query_map(
                params![filter.fingerprint, filter.data_product, limit],
                |row| {
                    let id: String = row.get(0)?;
                    let created_at: String = row.get(1)?;
                    let fingerprint: Option<String> = row.get(2)?;
                    let data_product: Option<String> = row.get(3)?;
                    let payload: String = row.get(4)?;
                    Ok((id, created_at, fingerprint, data_product, payload))
                },
            )
            .map_err(db_err)?;
        let mut out = Vec::new();
        for row in rows {
            let (id, created_at, fingerprint, data_product, payload) = row.map_err(db_err)?;
            let report: Value = serde_json::from_str(&payload)
                .map_err(|err| StoreError::Invalid(err.to_string()))?;
            out.push(AssessmentSummary {
                id,
                created_at,
                connection_fingerprint: fingerprint.unwrap_or_default(),
                data_product,
                summary: report.get("summary").cloned().unwrap_or(Value::Null),
            });
        }
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Benchmarks
    // ------------------------------------------------------------------

    /// Persists one benchmark group binding assessments under labels.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the insert fails.
    pub fn save_benchmark(
        &self,
        labels: &[String],
        connections: &[String],
        assessment_ids: &[String],
    ) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let created_at = now_rfc3339();
        let encode = |values: &[String]| -> Result<String, StoreError> {
            serde_json::to_string(values).map_err(|err| StoreError::Invalid(err.to_string()))
        };
        let labels_json = encode(labels)?;
        let connections_json = encode(connections)?;
        let ids_json = encode(assessment_ids)?;
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(db_err)?;
        tx.execute(
            "INSERT INTO benchmarks (id, created_at, labels, connections, assessment_ids) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, created_at, labels_json, connections_json, ids_json],
        )
        .map_err(db_err)?;
        tx.commit().map_err(db_err)?;
        Ok(id)
    }

    /// Lists benchmark groups newest-first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails or stored arrays are
    /// malformed.
    pub fn list_benchmarks(&self, limit: usize) -> Result<Vec<BenchmarkRecord>, StoreError> {
        let limit = i64::try_from(limit)
            .map_err(|_| StoreError::Invalid("listing limit too large".to_string()))?;
        let guard = self.lock()?;
        let mut statement = guard
            .prepare(
                "SELECT id, created_at, labels, connections, assessment_ids FROM benchmarks \
                 ORDER BY created_at DESC, rowid DESC LIMIT ?1",
            )
            .map_err(db_err)?;
        let rows = statement
            .query_map(params![limit], |row| {
                let id: String = row.get(0)?;
                let created_at: String = row.get(1)?;
                let labels: String = row.get(2)?;
                let connections: String = row.get(3)?;
                let assessment_ids: String = row.get(4)?;
                Ok((id, created_at, labels, connections, assessment_ids))
            })
            .map_err(db_err)?;
        let mut out = Vec::new();
        for row in rows {
            let (id, created_at, labels, connections, assessment_ids) = row.map_err(db_err)?;
            let decode = |text: &str| -> Result<Vec<String>, StoreError> {
                serde_json::from_str(text).map_err(|err| StoreError::Invalid(err.to_string()))
            };
            out.push(BenchmarkRecord {
                id,
                created_at,
                labels: decode(&labels)?,
                connections: decode(&connections)?,
                assessment_ids: decode(&assessment_ids)?,
            });
        }
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Audit
    // ------------------------------------------------------------------

    /// Appends one audit query event.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the insert fails.
    pub fn write_audit_query(&self, record: &AuditQueryRecord) -> Result<(), StoreError> {
        let created_at = now_rfc3339();
        let guard = self.lock()?;
        guard
            .execute(
                "INSERT INTO audit_queries (assessment_id, session_id, query_text, target, \
                 factor, requirement, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.assessment_id,
                    record.session_id,
                    record.query,
                    record.target,
                    record.factor,
                    record.requirement,
                    created_at
                ],
            )
            .map_err(db_err)?;
        Ok(())
    }

    /// Appends one audit conversation event.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the insert fails.
    pub fn write_audit_conversation(
        &self,
        content: &str,
        phase: Option<&str>,
        role: &str,
        assessment_id: Option<&str>,
        session_id: Option<&str>,
    ) -> Result<(), StoreError> {
        let created_at = now_rfc3339();
        let guard = self.lock()?;
        guard
            .execute(
                "INSERT INTO audit_conversation (assessment_id, session_id, phase, role, \
                 content, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![assessment_id, session_id, phase, role, content, created_at],
            )
            .map_err(db_err)?;
        Ok(())
    }

    /// Counts audit query rows (diagnostics and tests).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    pub fn audit_query_count(&self) -> Result<u64, StoreError> {
        let guard = self.lock()?;
        let count: i64 = guard
            .query_row("SELECT COUNT(*) FROM audit_queries", [], |row| row.get(0))
            .map_err(db_err)?;
        u64::try_from(count).map_err(|_| StoreError::Invalid("negative row count".to_string()))
    }
}

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Creates missing tables and applies additive column migrations.
fn initialize_schema(connection: &Connection) -> Result<(), StoreError> {
    connection
        .execute_batch(
            "CREATE TABLE IF NOT EXISTS _schema (version INTEGER);
             CREATE TABLE IF NOT EXISTS assessments (
                 id TEXT PRIMARY KEY,
                 created_at TEXT NOT NULL,
                 connection_fingerprint TEXT,
                 report_json TEXT NOT NULL
             );
             CREATE TABLE IF NOT EXISTS benchmarks (
                 id TEXT PRIMARY KEY,
                 created_at TEXT NOT NULL,
                 labels TEXT NOT NULL,
                 connections TEXT NOT NULL,
                 assessment_ids TEXT NOT NULL
             );
             CREATE TABLE IF NOT EXISTS audit_queries (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 assessment_id TEXT,
                 session_id TEXT,
                 query_text TEXT NOT NULL,
                 target TEXT,
                 factor TEXT,
                 requirement TEXT,
                 created_at TEXT NOT NULL
             );
             CREATE TABLE IF NOT EXISTS audit_conversation (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 assessment_id TEXT,
                 session_id TEXT,
                 phase TEXT,
                 role TEXT,
                 content TEXT NOT NULL,
                 created_at TEXT NOT NULL
             );
             CREATE INDEX IF NOT EXISTS idx_assessments_fingerprint
                 ON assessments (connection_fingerprint, created_at);",
        )
        .map_err(db_err)?;
    connection
        .execute(
            "INSERT INTO _schema (version) SELECT ?1 WHERE NOT EXISTS (SELECT 1 FROM _schema)",
            params![SCHEMA_VERSION],
        )
        .map_err(db_err)?;
    ensure_column(connection, "assessments", "data_product", "TEXT")?;
    Ok(())
}

/// Adds an additive column when introspection shows it is absent.
fn ensure_column(
    connection: &Connection,
    table: &str,
    column: &str,
    sql_type: &str,
) -> Result<(), StoreError> {
    let mut statement = connection
        .prepare(&format!("PRAGMA table_info({table})"))
        .map_err(db_err)?;
    let names = statement
        .query_map([], |row| row.get::<_, String>(1))
        .map_err(db_err)?
        .collect::<Result<Vec<String>, _>>()
        .map_err(db_err)?;
    if names.iter().any(|name| name == column) {
        return Ok(());
    }
    connection
        .execute(&format!("ALTER TABLE {table} ADD COLUMN {column} {sql_type}"), [])
        .map_err(db_err)?;
    Ok(())
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Current UTC time as RFC3339.
fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}
