// crates/aird-suites/src/loader.rs
// ============================================================================
// Module: Suite Loader
// Description: YAML suite-document parsing and validation.
// Purpose: Turn declarative documents into validated suite definitions.
// Dependencies: aird-core, serde, serde_yaml, tracing
// ============================================================================

//! ## Overview
//! Suite documents are YAML mappings with `suite_name`, optional `platform`,
//! optional `extends`, and a `tests` list. Every test needs `id`, `factor`,
//! `requirement`, a `target_type` of `platform`, `table`, or `column`, and
//! exactly one of `query` / `query_template`. Validation runs over the whole
//! document before anything registers, and the error message carries every
//! failure so authors fix a file in one pass.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use aird_core::Factor;
use aird_core::QuerySource;
use aird_core::SuiteDefinition;
use aird_core::TargetType;
use aird_core::TestDefinition;
use serde::Deserialize;

use crate::SuiteError;
use crate::SuiteRegistry;

// ============================================================================
// SECTION: Raw Document
// ============================================================================

/// Unvalidated suite document as parsed from YAML.
#[derive(Debug, Deserialize)]
struct RawSuiteFile {
    /// Suite name the document registers into.
    suite_name: Option<String>,
    /// Informational platform label.
    #[serde(default)]
    platform: Option<String>,
    /// Parent suite names.
    #[serde(default)]
    extends: Option<Vec<String>>,
    /// Test definitions.
    #[serde(default)]
    tests: Option<Vec<RawTest>>,
}

/// Unvalidated test entry as parsed from YAML.
#[derive(Debug, Deserialize)]
struct RawTest {
    /// Base test identifier.
    id: Option<String>,
    /// Factor key.
    factor: Option<String>,
    /// Requirement key.
    requirement: Option<String>,
    /// Target type key.
    target_type: Option<String>,
    /// Fixed SQL.
    #[serde(default)]
    query: Option<String>,
    /// SQL template.
    #[serde(default)]
    query_template: Option<String>,
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates one raw test, returning the built definition or messages.
fn validate_test(raw: &RawTest, index: usize) -> Result<TestDefinition, Vec<String>> {
    let mut errors = Vec::new();
    let id = raw.id.clone().filter(|value| !value.trim().is_empty());
    if id.is_none() {
        errors.push(format!("test[{index}]: missing required field 'id'"));
    }
    let factor = match raw.factor.as_deref() {
        None => {
            errors.push(format!("test[{index}]: missing required field 'factor'"));
            None
        }
        Some(key) => {
            let parsed = Factor::from_key(key);
            if parsed.is_none() {
                errors.push(format!("test[{index}]: unknown factor '{key}'"));
            }
            parsed
        }
    };
    let requirement = raw.requirement.clone().filter(|value| !value.trim().is_empty());
    if requirement.is_none() {
        errors.push(format!("test[{index}]: missing required field 'requirement'"));
    }
    let target_type = match raw.target_type.as_deref() {
        None => {
            errors.push(format!("test[{index}]: missing required field 'target_type'"));
            None
        }
        Some("platform") => Some(TargetType::Platform),
        Some("table") => Some(TargetType::Table),
        Some("column") => Some(TargetType::Column),
        Some(other) => {
            errors.push(format!(
                "test[{index}]: invalid target_type '{other}' (expected platform, table, or \
                 column)"
            ));
            None
        }
    };
    let source = match (&raw.query, &raw.query_template) {
        (Some(_), Some(_)) => {
            errors.push(format!(
                "test[{index}]: cannot have both 'query' and 'query_template'"
            ));
            None
        }
        (None, None) => {
            errors.push(format!("test[{index}]: must have 'query' or 'query_template'"));
            None
        }
        (Some(sql), None) => Some(QuerySource::Fixed(sql.clone())),
        (None, Some(template)) => Some(QuerySource::Template(template.clone())),
    };
    match (id, factor, requirement, target_type, source) {
        (Some(id), Some(factor), Some(requirement), Some(target_type), Some(source))
            if errors.is_empty() =>
        {
            Ok(TestDefinition {
                id,
                factor,
                requirement,
                target_type,
                source,
            })
        }
        _ => Err(errors),
    }
}

/// Parses and validates one suite document.
///
/// # Errors
///
/// Returns [`SuiteError`] when the YAML is malformed or any test is invalid.
pub fn parse_document(text: &str, origin: &str) -> Result<SuiteDefinition, SuiteError> {
    let raw: RawSuiteFile = serde_yaml::from_str(text).map_err(|err| SuiteError::Parse {
        origin: origin.to_string(),
        message: err.to_string(),
    })?;
    let mut errors = Vec::new();
    let suite_name = raw.suite_name.clone().filter(|value| !value.trim().is_empty());
    if suite_name.is_none() {
        errors.push("missing or invalid 'suite_name'".to_string());
    }
    let extends = raw.extends.clone().unwrap_or_default();
    let raw_tests = raw.tests.unwrap_or_default();
    if raw_tests.is_empty() && extends.is_empty() {
        errors.push("'tests' must be non-empty unless 'extends' is given".to_string());
    }
    let mut tests = Vec::with_capacity(raw_tests.len());
    for (index, raw_test) in raw_tests.iter().enumerate() {
        match validate_test(raw_test, index) {
            Ok(test) => tests.push(test),
            Err(messages) => errors.extend(messages),
        }
    }
    if !errors.is_empty() {
        return Err(SuiteError::Invalid {
            origin: origin.to_string(),
            message: errors.join("; "),
        });
    }
    let document = SuiteDefinition {
        suite_name: suite_name.unwrap_or_default(),
        platform: raw.platform,
        extends,
        tests,
    };
    document.validate().map_err(|err| SuiteError::Invalid {
        origin: origin.to_string(),
        message: err.to_string(),
    })?;
    Ok(document)
}

// ============================================================================
// SECTION: File Loading
// ============================================================================

/// Loads one suite file into the registry.
///
/// # Errors
///
/// Returns [`SuiteError`] when the file cannot be read, parsed, validated,
/// or registered.
pub fn load_suite_file(registry: &mut SuiteRegistry, path: &Path) -> Result<(), SuiteError> {
    let origin = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());
    let text = std::fs::read_to_string(path).map_err(|err| SuiteError::Parse {
        origin: origin.clone(),
        message: err.to_string(),
    })?;
    let document = parse_document(&text, &origin)?;
    registry.register_document(document)
}

/// Loads every `*.yaml` file in a directory, in file-name sorted order.
///
/// Invalid files are skipped with a warning so one bad document cannot take
/// down the rest of the directory. Returns the number of files loaded.
pub fn load_suite_dir(registry: &mut SuiteRegistry, dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        tracing::debug!(dir = %dir.display(), "no suite definitions directory");
        return 0;
    };
    let mut paths: Vec<_> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "yaml" || ext == "yml"))
        .collect();
    paths.sort();
    let mut loaded = 0;
    for path in paths {
        match load_suite_file(registry, &path) {
            Ok(()) => loaded += 1,
            Err(err) => {
                tracing::warn!(file = %path.display(), error = %err, "failed to load suite file");
            }
        }
    }
    loaded
}
