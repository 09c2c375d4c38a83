// crates/aird-core/src/core/fingerprint.rs
// ============================================================================
// Module: Connection Fingerprint
// Description: Credential-elided, truncated connection identity.
// Purpose: Give history records a durable identity without secrets.
// Dependencies: none
// ============================================================================

//! ## Overview
//! A fingerprint is the connection URI with the userinfo replaced by `***`
//! and the whole string truncated to 80 characters (50 when the input has no
//! scheme separator). Fingerprinting is deterministic and idempotent:
//! feeding a fingerprint back in yields the same fingerprint, and
//! credentials never appear in the output.

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum fingerprint length for URIs with a scheme.
const MAX_URI_FINGERPRINT: usize = 80;
/// Maximum fingerprint length for scheme-less inputs.
const MAX_BARE_FINGERPRINT: usize = 50;

// ============================================================================
// SECTION: Fingerprint
// ============================================================================

/// Computes the credential-elided fingerprint of a connection string.
#[must_use]
pub fn fingerprint(connection: &str) -> String {
    let Some((scheme, rest)) = connection.split_once("://") else {
        return truncate(connection, MAX_BARE_FINGERPRINT);
    };
    let rest = match rest.split_once('@') {
        Some((_userinfo, tail)) => format!("***@{tail}"),
        None => rest.to_string(),
    };
    truncate(&format!("{scheme}://{rest}"), MAX_URI_FINGERPRINT)
}

/// Truncates a string to at most `limit` characters on a char boundary.
#[must_use]
fn truncate(value: &str, limit: usize) -> String {
    value.chars().take(limit).collect()
}
