// crates/aird-core/src/core/value.rs
// ============================================================================
// Module: Scalar Values
// Description: Tagged variant for heterogeneous backend row cells.
// Purpose: Carry probe results of unknown type with one float projection.
// Dependencies: bigdecimal, serde_json
// ============================================================================

//! ## Overview
//! Backend rows arrive as columns of unknown type. [`ScalarValue`] models a
//! single cell as a tagged variant with exactly one projector to `f64`:
//! integers widen, decimals convert lossily, text parses, and everything else
//! yields `None`. Arbitrary-precision numerics become doubles at the JSON
//! boundary via [`ScalarValue::to_json`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use bigdecimal::BigDecimal;
use bigdecimal::ToPrimitive;
use serde_json::Number;
use serde_json::Value;

// ============================================================================
// SECTION: Scalar Value
// ============================================================================

/// One cell of a backend result row.
///
/// # Invariants
/// - `Decimal` preserves the backend's precision until projection.
/// - Projection to `f64` is the only numeric interpretation; there is no
///   integer-preserving path.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    /// SQL NULL.
    Null,
    /// Signed 64-bit integer.
    Int(i64),
    /// Double-precision float.
    Float(f64),
    /// Arbitrary-precision decimal.
    Decimal(BigDecimal),
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
}

impl ScalarValue {
    /// Projects the value to `f64`, yielding `None` when no numeric
    /// interpretation exists.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Null | Self::Bytes(_) => None,
            Self::Int(value) => {
                #[allow(clippy::cast_precision_loss, reason = "Lossy projection is the contract.")]
                let projected = *value as f64;
                Some(projected)
            }
            Self::Float(value) => Some(*value),
            Self::Decimal(value) => value.to_f64(),
            Self::Text(value) => value.trim().parse::<f64>().ok(),
        }
    }

    /// Returns true when the value is SQL NULL.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Converts the value to JSON for storage, widening decimals to doubles.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Int(value) => Value::Number(Number::from(*value)),
            Self::Float(value) => Number::from_f64(*value).map_or(Value::Null, Value::Number),
            Self::Decimal(value) => value
                .to_f64()
                .and_then(Number::from_f64)
                .map_or(Value::Null, Value::Number),
            Self::Text(value) => Value::String(value.clone()),
            Self::Bytes(bytes) => {
                Value::Array(bytes.iter().map(|byte| Value::Number(Number::from(*byte))).collect())
            }
        }
    }
}
