// crates/aird-cli/src/output.rs
// ============================================================================
// Module: Output Routing
// Description: Output-format parsing and stdout/stderr writers.
// Purpose: Keep machine output on stdout and human output on stderr.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Report-producing commands accept `stdout` (compact JSON), `markdown`
//! (human-readable), `json:<path>` (pretty JSON to a file), and, where a
//! command allows it, a bare path treated as a file target. Machine output
//! always goes to standard output; human rendering and progress go to
//! standard error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;

// ============================================================================
// SECTION: Output Target
// ============================================================================

/// Parsed output destination for a report-producing command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Compact JSON on standard output.
    Stdout,
    /// Human-readable markdown.
    Markdown,
    /// Pretty-printed JSON written to the given path.
    JsonFile(PathBuf),
    /// Bare path treated as a file target (discover fallback).
    File(PathBuf),
}

impl OutputTarget {
    /// Parses an output argument. `allow_bare_path` enables the file
    /// fallback used by `discover`.
    #[must_use]
    pub fn parse(raw: &str, allow_bare_path: bool) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "stdout" || trimmed == "-" || trimmed == "json" {
            return Self::Stdout;
        }
        if trimmed == "markdown" {
            return Self::Markdown;
        }
        if let Some(path) = trimmed.strip_prefix("json:") {
            return Self::JsonFile(PathBuf::from(path));
        }
        if allow_bare_path {
            return Self::File(PathBuf::from(trimmed));
        }
        Self::Markdown
    }
}

// ============================================================================
// SECTION: Writers
// ============================================================================

/// Writes one line to standard output.
///
/// # Errors
///
/// Returns an [`std::io::Error`] when the stream is closed.
pub fn write_stdout_line(line: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(line.as_bytes())?;
    if !line.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    Ok(())
}

/// Writes one line to standard error.
///
/// # Errors
///
/// Returns an [`std::io::Error`] when the stream is closed.
pub fn write_stderr_line(line: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr().lock();
    stderr.write_all(line.as_bytes())?;
    if !line.ends_with('\n') {
        stderr.write_all(b"\n")?;
    }
    Ok(())
}
