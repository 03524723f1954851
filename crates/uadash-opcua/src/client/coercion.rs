// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Value coercion between dashboard JSON values and OPC UA variants.
//!
//! Writes arrive as loosely typed JSON (a string from a text box, a number
//! from a slider, a boolean or `0`/`1` from a switch). The node's live type,
//! discovered by reading it first, decides which variant goes on the wire:
//!
//! ```text
//! type hint "switch"  ──►  Boolean(truthiness)
//! observed Int64      ──►  Int64
//! observed Int32      ──►  Int32
//! observed Float      ──►  Float
//! observed Double     ──►  Double
//! observed String     ──►  String
//! anything else       ──►  String
//! ```
//!
//! Numeric coercion never truncates or wraps: a fraction for an integer node,
//! an out-of-range integer, a non-numeric string or a finite value too large
//! for a single-precision float is rejected with a [`ConversionError`].
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use uadash_opcua::client::coercion::coerce_for_write;
//! use uadash_opcua::client::OpcUaValue;
//! use uadash_opcua::types::OpcUaDataType;
//!
//! let v = coerce_for_write(&json!("42"), None, OpcUaDataType::Int32).unwrap();
//! assert_eq!(v, OpcUaValue::Int32(42));
//!
//! let v = coerce_for_write(&json!(0), Some("switch"), OpcUaDataType::Int32).unwrap();
//! assert_eq!(v, OpcUaValue::Boolean(false));
//! ```

use std::num::IntErrorKind;

use serde_json::Value;

use crate::error::{ConversionError, OpcUaResult};
use crate::types::OpcUaDataType;

use super::transport::OpcUaValue;

/// Type hint that forces a boolean write regardless of the node's type.
pub const SWITCH_HINT: &str = "switch";

// =============================================================================
// Write Coercion
// =============================================================================

/// Coerces a dashboard value into the variant written to a node.
///
/// `type_hint` is the widget type recorded for the tag; `observed` is the
/// data type of the node's current value.
///
/// # Errors
///
/// Returns a conversion error when a numeric target cannot represent
/// `raw` exactly.
pub fn coerce_for_write(
    raw: &Value,
    type_hint: Option<&str>,
    observed: OpcUaDataType,
) -> OpcUaResult<OpcUaValue> {
    if type_hint == Some(SWITCH_HINT) {
        return Ok(OpcUaValue::Boolean(is_truthy(raw)));
    }

    let value = match observed {
        OpcUaDataType::Int64 => OpcUaValue::Int64(to_i64(raw)?),
        OpcUaDataType::Int32 => OpcUaValue::Int32(to_i32(raw)?),
        OpcUaDataType::Float => OpcUaValue::Float(to_f32(raw)?),
        OpcUaDataType::Double => OpcUaValue::Double(to_f64(raw, "Double")?),
        _ => OpcUaValue::String(display_string(raw)),
    };

    Ok(value)
}

/// Returns the truthiness of a JSON value.
///
/// `false`, `null`, numeric zero, the empty string, the empty array and the
/// empty object are false. Everything else is true, including the string
/// `"false"` and the string `"0"`.
pub fn is_truthy(raw: &Value) -> bool {
    match raw {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => i != 0,
            (None, Some(u)) => u != 0,
            _ => n.as_f64().is_some_and(|f| f != 0.0),
        },
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Renders a JSON value as the string written to a String node.
///
/// Strings are taken verbatim; every other value uses its JSON text.
pub fn display_string(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// =============================================================================
// Read Normalization
// =============================================================================

/// Renders a value read from a node for display.
///
/// Booleans become `true`/`false`, numbers use their shortest round-trip
/// form, strings are verbatim and empty variants become `null`.
#[inline]
pub fn normalize_read(value: &OpcUaValue) -> String {
    value.to_string()
}

// =============================================================================
// Numeric Helpers
// =============================================================================

fn to_i64(raw: &Value) -> OpcUaResult<i64> {
    const TARGET: &str = "Int64";

    match raw {
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else if n.is_u64() {
                Err(ConversionError::overflow(n.to_string(), TARGET).into())
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                integral_from_f64(f, i64::MIN as f64, 9_223_372_036_854_775_808.0, TARGET)
                    .map(|f| f as i64)
            }
        }
        Value::String(s) => parse_integer::<i64>(s, TARGET),
        other => Err(not_numeric(other, TARGET)),
    }
}

fn to_i32(raw: &Value) -> OpcUaResult<i32> {
    const TARGET: &str = "Int32";

    match raw {
        Value::String(s) => parse_integer::<i32>(s, TARGET),
        Value::Number(n) if n.is_f64() => {
            let f = n.as_f64().unwrap_or(f64::NAN);
            integral_from_f64(f, i32::MIN as f64, i32::MAX as f64 + 1.0, TARGET)
                .map(|f| f as i32)
        }
        Value::Number(n) => n
            .as_i64()
            .and_then(|wide| i32::try_from(wide).ok())
            .ok_or_else(|| ConversionError::overflow(n.to_string(), TARGET).into()),
        other => {
            let wide = to_i64(other).map_err(|_| not_numeric(other, TARGET))?;
            Ok(wide as i32)
        }
    }
}

fn to_f64(raw: &Value, target: &str) -> OpcUaResult<f64> {
    match raw {
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64().ok_or_else(|| not_numeric(raw, target)),
        Value::String(s) => s.trim().parse::<f64>().map_err(|e| {
            ConversionError::invalid_value(target, format!("'{}' is not a number: {}", s, e)).into()
        }),
        other => Err(not_numeric(other, target)),
    }
}

fn to_f32(raw: &Value) -> OpcUaResult<f32> {
    const TARGET: &str = "Float";

    let wide = to_f64(raw, TARGET)?;
    if wide.is_finite() && wide.abs() > f32::MAX as f64 {
        return Err(ConversionError::overflow(wide.to_string(), TARGET).into());
    }
    Ok(wide as f32)
}

fn parse_integer<T>(s: &str, target: &str) -> OpcUaResult<T>
where
    T: std::str::FromStr<Err = std::num::ParseIntError>,
{
    let trimmed = s.trim();
    trimmed.parse::<T>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            ConversionError::overflow(trimmed, target).into()
        }
        _ => ConversionError::invalid_value(target, format!("'{}' is not an integer", s)).into(),
    })
}

/// `upper` is exclusive.
fn integral_from_f64(f: f64, lower: f64, upper: f64, target: &str) -> OpcUaResult<f64> {
    if !f.is_finite() || f.fract() != 0.0 {
        return Err(ConversionError::fractional(f.to_string(), target).into());
    }
    if f < lower || f >= upper {
        return Err(ConversionError::overflow(f.to_string(), target).into());
    }
    Ok(f)
}

fn not_numeric(raw: &Value, target: &str) -> crate::error::OpcUaError {
    ConversionError::invalid_value(target, format!("{} is not a number", raw)).into()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn coerce(raw: Value, observed: OpcUaDataType) -> OpcUaResult<OpcUaValue> {
        coerce_for_write(&raw, None, observed)
    }

    #[test]
    fn test_switch_hint_wins_over_observed_type() {
        for observed in [
            OpcUaDataType::Int32,
            OpcUaDataType::Double,
            OpcUaDataType::String,
            OpcUaDataType::Boolean,
        ] {
            let v = coerce_for_write(&json!(0), Some("switch"), observed).unwrap();
            assert_eq!(v, OpcUaValue::Boolean(false));
        }

        let v = coerce_for_write(&json!(1), Some("switch"), OpcUaDataType::Int32).unwrap();
        assert_eq!(v, OpcUaValue::Boolean(true));
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!([])));
        assert!(!is_truthy(&json!({})));

        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(-1)));
        assert!(is_truthy(&json!(0.5)));
        assert!(is_truthy(&json!("false")));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!([0])));
    }

    #[test]
    fn test_int32_coercion() {
        assert_eq!(coerce(json!("42"), OpcUaDataType::Int32).unwrap(), OpcUaValue::Int32(42));
        assert_eq!(coerce(json!(" -7 "), OpcUaDataType::Int32).unwrap(), OpcUaValue::Int32(-7));
        assert_eq!(coerce(json!(42), OpcUaDataType::Int32).unwrap(), OpcUaValue::Int32(42));
        assert_eq!(coerce(json!(42.0), OpcUaDataType::Int32).unwrap(), OpcUaValue::Int32(42));
        assert_eq!(coerce(json!(true), OpcUaDataType::Int32).unwrap(), OpcUaValue::Int32(1));

        assert!(coerce(json!("not-a-number"), OpcUaDataType::Int32).is_err());
        assert!(coerce(json!("4.5"), OpcUaDataType::Int32).is_err());
        assert!(coerce(json!(4.5), OpcUaDataType::Int32).is_err());
        assert!(coerce(json!(null), OpcUaDataType::Int32).is_err());
    }

    #[test]
    fn test_int32_overflow_is_rejected() {
        let err = coerce(json!(2_147_483_648_i64), OpcUaDataType::Int32).unwrap_err();
        assert!(matches!(
            err,
            crate::error::OpcUaError::Conversion(ConversionError::Overflow { .. })
        ));

        let err = coerce(json!("-2147483649"), OpcUaDataType::Int32).unwrap_err();
        assert!(matches!(
            err,
            crate::error::OpcUaError::Conversion(ConversionError::Overflow { .. })
        ));
    }

    #[test]
    fn test_u64_beyond_i64_reports_int32_target() {
        let err = coerce(json!(u64::MAX), OpcUaDataType::Int32).unwrap_err();
        match err {
            crate::error::OpcUaError::Conversion(ConversionError::Overflow {
                value,
                target_type,
            }) => {
                assert_eq!(value, u64::MAX.to_string());
                assert_eq!(target_type, "Int32");
            }
            other => panic!("expected overflow, got {other:?}"),
        }
    }

    #[test]
    fn test_int64_coercion() {
        assert_eq!(
            coerce(json!("9007199254740993"), OpcUaDataType::Int64).unwrap(),
            OpcUaValue::Int64(9_007_199_254_740_993)
        );
        assert_eq!(coerce(json!(-3), OpcUaDataType::Int64).unwrap(), OpcUaValue::Int64(-3));
        assert!(coerce(json!(u64::MAX), OpcUaDataType::Int64).is_err());
        assert!(coerce(json!("99999999999999999999"), OpcUaDataType::Int64).is_err());
        assert!(coerce(json!("abc"), OpcUaDataType::Int64).is_err());
    }

    #[test]
    fn test_float_coercion() {
        assert_eq!(coerce(json!("1.5"), OpcUaDataType::Float).unwrap(), OpcUaValue::Float(1.5));
        assert_eq!(coerce(json!(2), OpcUaDataType::Float).unwrap(), OpcUaValue::Float(2.0));
        assert!(coerce(json!("1e39"), OpcUaDataType::Float).is_err());
        assert!(coerce(json!("warm"), OpcUaDataType::Float).is_err());
    }

    #[test]
    fn test_double_coercion() {
        assert_eq!(
            coerce(json!("23.25"), OpcUaDataType::Double).unwrap(),
            OpcUaValue::Double(23.25)
        );
        assert_eq!(coerce(json!(1e39), OpcUaDataType::Double).unwrap(), OpcUaValue::Double(1e39));
        assert!(coerce(json!(""), OpcUaDataType::Double).is_err());
    }

    #[test]
    fn test_string_and_fallback() {
        assert_eq!(
            coerce(json!("hello"), OpcUaDataType::String).unwrap(),
            OpcUaValue::String("hello".into())
        );
        assert_eq!(
            coerce(json!(12), OpcUaDataType::String).unwrap(),
            OpcUaValue::String("12".into())
        );
        // Unrecognized observed types fall back to String.
        assert_eq!(
            coerce(json!(5), OpcUaDataType::UInt16).unwrap(),
            OpcUaValue::String("5".into())
        );
        assert_eq!(
            coerce(json!(true), OpcUaDataType::Boolean).unwrap(),
            OpcUaValue::String("true".into())
        );
    }

    #[test]
    fn test_normalize_read() {
        assert_eq!(normalize_read(&OpcUaValue::Boolean(true)), "true");
        assert_eq!(normalize_read(&OpcUaValue::Int32(-5)), "-5");
        assert_eq!(normalize_read(&OpcUaValue::Double(2.5)), "2.5");
        assert_eq!(normalize_read(&OpcUaValue::String("Tank A".into())), "Tank A");
        assert_eq!(normalize_read(&OpcUaValue::Null), "null");
    }
}
