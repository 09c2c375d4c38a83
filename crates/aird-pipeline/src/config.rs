// crates/aird-pipeline/src/config.rs
// ============================================================================
// Module: Pipeline Config
// Description: Resolved assessment configuration plus context loading.
// Purpose: Merge environment defaults with caller arguments, leniently.
// Dependencies: aird-core, serde, serde_yaml, serde_json, tracing
// ============================================================================

//! ## Overview
//! [`AssessConfig`] is the resolved input to one pipeline run: connection,
//! scope filters, suite selection, collaborator flags, and paths. Defaults
//! come from the `AIRD_*` environment; callers layer arguments on top.
//! Context and threshold files load leniently: a malformed document logs a
//! warning and degrades to the default, it never fails the run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use aird_core::DataProduct;
use aird_core::Factor;
use aird_core::ThresholdOverrides;
use aird_core::WorkloadLevel;
use serde::Deserialize;
use serde_json::Value;

// ============================================================================
// SECTION: Environment Keys
// ============================================================================

/// Env var supplying the default connection string.
pub const ENV_CONNECTION: &str = "AIRD_CONNECTION_STRING";
/// Env var supplying the default context file path.
pub const ENV_CONTEXT: &str = "AIRD_CONTEXT";
/// Env var supplying the default thresholds file path.
pub const ENV_THRESHOLDS: &str = "AIRD_THRESHOLDS";
/// Env var enabling the audit sink.
pub const ENV_AUDIT: &str = "AIRD_AUDIT";
/// Env var supplying the history store path.
pub const ENV_DB_PATH: &str = "AIRD_DB_PATH";

// ============================================================================
// SECTION: Config
// ============================================================================

/// Resolved configuration for one pipeline run.
///
/// # Invariants
/// - `suite` is a registered suite name or the literal `auto`.
/// - Explicit `schemas`/`tables` take precedence over context scope.
#[derive(Debug, Clone)]
pub struct AssessConfig {
    /// Connection string, when one resolved.
    pub connection: Option<String>,
    /// Explicit schema whitelist.
    pub schemas: Vec<String>,
    /// Explicit table scope (bare or qualified names).
    pub tables: Vec<String>,
    /// Optional context document path.
    pub context_path: Option<PathBuf>,
    /// Suite selection (`auto` resolves to the adapter default).
    pub suite: String,
    /// Optional threshold override file path.
    pub thresholds_path: Option<PathBuf>,
    /// Skip persistence when true.
    pub no_save: bool,
    /// Attach the previous assessment id for diffing when true.
    pub compare: bool,
    /// Preview expansion without executing when true.
    pub dry_run: bool,
    /// Write audit streams when true.
    pub audit: bool,
    /// Run the survey collaborator when true.
    pub survey: bool,
    /// Optional survey answer file path.
    pub survey_answers_path: Option<PathBuf>,
    /// Requested target workload.
    pub target_workload: Option<WorkloadLevel>,
    /// Optional single-factor filter.
    pub factor_filter: Option<Factor>,
    /// Restrict reporting to one declared data product.
    pub product: Option<String>,
    /// History store path.
    pub db_path: PathBuf,
}

impl AssessConfig {
    /// Builds a config from environment defaults only.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            connection: env_string(ENV_CONNECTION),
            schemas: Vec::new(),
            tables: Vec::new(),
            context_path: env_string(ENV_CONTEXT).map(PathBuf::from),
            suite: "auto".to_string(),
            thresholds_path: env_string(ENV_THRESHOLDS).map(PathBuf::from),
            no_save: false,
            compare: false,
            dry_run: false,
            audit: env_flag(ENV_AUDIT),
            survey: false,
            survey_answers_path: None,
            target_workload: None,
            factor_filter: None,
            product: None,
            db_path: env_string(ENV_DB_PATH).map_or_else(default_db_path, PathBuf::from),
        }
    }
}

impl Default for AssessConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Default history store path (`~/.aird/assessments.db`).
#[must_use]
pub fn default_db_path() -> PathBuf {
    std::env::var_os("HOME")
        .map_or_else(|| PathBuf::from("."), PathBuf::from)
        .join(".aird")
        .join("assessments.db")
}

/// Reads a non-blank environment string.
fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

/// Reads a boolean environment flag (`1`, `true`, `yes`).
fn env_flag(key: &str) -> bool {
    matches!(
        std::env::var(key).unwrap_or_default().trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

// ============================================================================
// SECTION: User Context
// ============================================================================

/// Parsed context document.
///
/// # Invariants
/// - Unknown keys are ignored; the raw document is preserved separately for
///   report embedding.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserContext {
    /// Schema scope from the context.
    #[serde(default)]
    pub schemas: Vec<String>,
    /// Table scope from the context.
    #[serde(default)]
    pub tables: Vec<String>,
    /// Target workload level (long or short form).
    #[serde(default)]
    pub target_level: Option<String>,
    /// Declared data products.
    #[serde(default)]
    pub data_products: Vec<DataProduct>,
}

/// Loads the optional context document, leniently.
///
/// Returns the typed context plus the raw document for report embedding.
/// A missing path yields `None`; a malformed document logs a warning and
/// yields `None` so the run degrades to an empty context.
#[must_use]
pub fn load_context(path: Option<&Path>) -> Option<(UserContext, Value)> {
    let path = path?;
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to read context file");
            return None;
        }
    };
    let raw: serde_yaml::Value = match serde_yaml::from_str(&text) {
        Ok(raw) => raw,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "malformed context file");
            return None;
        }
    };
    let context: UserContext = match serde_yaml::from_value(raw.clone()) {
        Ok(context) => context,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "unusable context file");
            return None;
        }
    };
    let embedded = serde_json::to_value(raw).unwrap_or(Value::Null);
    Some((context, embedded))
}

// ============================================================================
// SECTION: Threshold Overrides
// ============================================================================

/// Loads the optional threshold override file (JSON), leniently.
///
/// A missing path or malformed document logs a warning and yields empty
/// overrides so scoring degrades to the built-in defaults.
#[must_use]
pub fn load_threshold_overrides(path: Option<&Path>) -> ThresholdOverrides {
    let Some(path) = path else {
        return ThresholdOverrides::new();
    };
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to read thresholds file");
            return ThresholdOverrides::new();
        }
    };
    match serde_json::from_str(&text) {
        Ok(overrides) => overrides,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "malformed thresholds file");
            ThresholdOverrides::new()
        }
    }
}
