//! Scalar codec.
//!
//! Converts a single raw text value, taken from a query string, header or
//! path segment, into a typed JSON scalar. Only the incoming direction exists.

use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Scalar types a query, header or path value can be converted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// UTF-8 text, taken verbatim.
    String,
    /// Boolean.
    Bool,
    /// 8-bit signed integer.
    I8,
    /// 16-bit signed integer.
    I16,
    /// 32-bit signed integer.
    I32,
    /// 64-bit signed integer.
    I64,
    /// 8-bit unsigned integer.
    U8,
    /// 16-bit unsigned integer.
    U16,
    /// 32-bit unsigned integer.
    U32,
    /// 64-bit unsigned integer.
    U64,
    /// 32-bit float.
    F32,
    /// 64-bit float.
    F64,
}

impl ScalarType {
    /// Returns true for [`ScalarType::String`].
    #[must_use]
    pub const fn is_string(self) -> bool {
        matches!(self, Self::String)
    }

    /// Returns true for any integer or float type.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Returns true for signed and unsigned integers.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::I8
                | Self::I16
                | Self::I32
                | Self::I64
                | Self::U8
                | Self::U16
                | Self::U32
                | Self::U64
        )
    }

    /// Returns true for unsigned integers.
    #[must_use]
    pub const fn is_unsigned(self) -> bool {
        matches!(self, Self::U8 | Self::U16 | Self::U32 | Self::U64)
    }

    /// Returns true for `F32` and `F64`.
    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// The value a field of this type holds when nothing was supplied.
    #[must_use]
    pub fn zero_value(self) -> Value {
        match self {
            Self::String => Value::String(String::new()),
            Self::Bool => Value::Bool(false),
            Self::F32 | Self::F64 => Value::from(0.0_f64),
            _ => Value::from(0_u64),
        }
    }

    const fn describe(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "boolean",
            Self::I8 | Self::I16 | Self::I32 | Self::I64 => "integer",
            Self::U8 | Self::U16 | Self::U32 | Self::U64 => "unsigned integer",
            Self::F32 | Self::F64 => "float",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
        };
        f.write_str(name)
    }
}

/// A raw value that could not be converted to its target type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {} value {raw:?}", .expected.describe())]
pub struct ScalarParseError {
    raw: String,
    expected: ScalarType,
}

impl ScalarParseError {
    /// Creates a parse error for `raw` targeting `expected`.
    #[must_use]
    pub fn new(raw: impl Into<String>, expected: ScalarType) -> Self {
        Self {
            raw: raw.into(),
            expected,
        }
    }

    /// The offending raw text.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The type conversion was attempted for.
    #[must_use]
    pub fn expected(&self) -> ScalarType {
        self.expected
    }
}

/// Parses `raw` as a value of type `ty`.
///
/// Integers fail when the value does not fit the target bit width. Floats
/// fail on non-numeric input and on results that are not finite, since JSON
/// has no representation for them.
///
/// # Example
///
/// ```
/// use bindery_core::{parse_scalar, ScalarType};
/// use serde_json::json;
///
/// assert_eq!(parse_scalar("42", ScalarType::I32).unwrap(), json!(42));
/// assert_eq!(parse_scalar("t", ScalarType::Bool).unwrap(), json!(true));
/// assert!(parse_scalar("300", ScalarType::U8).is_err());
/// ```
pub fn parse_scalar(raw: &str, ty: ScalarType) -> Result<Value, ScalarParseError> {
    let parsed = match ty {
        ScalarType::String => Some(Value::String(raw.to_owned())),
        ScalarType::Bool => parse_bool(raw).map(Value::Bool),
        ScalarType::I8 => parse_signed::<i8>(raw),
        ScalarType::I16 => parse_signed::<i16>(raw),
        ScalarType::I32 => parse_signed::<i32>(raw),
        ScalarType::I64 => parse_signed::<i64>(raw),
        ScalarType::U8 => parse_unsigned::<u8>(raw),
        ScalarType::U16 => parse_unsigned::<u16>(raw),
        ScalarType::U32 => parse_unsigned::<u32>(raw),
        ScalarType::U64 => parse_unsigned::<u64>(raw),
        ScalarType::F32 => raw
            .parse::<f32>()
            .ok()
            .filter(|n| n.is_finite())
            .map(|n| Value::from(f64::from(n))),
        ScalarType::F64 => raw
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Value::from),
    };
    parsed.ok_or_else(|| ScalarParseError::new(raw, ty))
}

// Same lexical set as the common `ParseBool` convention.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

fn parse_signed<T>(raw: &str) -> Option<Value>
where
    T: FromStr + Into<i64>,
{
    raw.parse::<T>().ok().map(|n| Value::from(n.into()))
}

fn parse_unsigned<T>(raw: &str) -> Option<Value>
where
    T: FromStr + Into<u64>,
{
    if raw.starts_with('+') {
        return None;
    }
    raw.parse::<T>().ok().map(|n| Value::from(n.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_string_is_identity() {
        assert_eq!(parse_scalar("", ScalarType::String).unwrap(), json!(""));
        assert_eq!(
            parse_scalar("a b&c", ScalarType::String).unwrap(),
            json!("a b&c")
        );
    }

    #[test]
    fn test_bool_lexical_forms() {
        for raw in ["1", "t", "T", "true", "TRUE", "True"] {
            assert_eq!(parse_scalar(raw, ScalarType::Bool).unwrap(), json!(true));
        }
        for raw in ["0", "f", "F", "false", "FALSE", "False"] {
            assert_eq!(parse_scalar(raw, ScalarType::Bool).unwrap(), json!(false));
        }
        assert!(parse_scalar("yes", ScalarType::Bool).is_err());
        assert!(parse_scalar("", ScalarType::Bool).is_err());
    }

    #[test]
    fn test_signed_bounds() {
        assert_eq!(parse_scalar("-128", ScalarType::I8).unwrap(), json!(-128));
        assert!(parse_scalar("128", ScalarType::I8).is_err());
        assert_eq!(parse_scalar("+7", ScalarType::I32).unwrap(), json!(7));
        assert_eq!(
            parse_scalar("9223372036854775807", ScalarType::I64).unwrap(),
            json!(i64::MAX)
        );
        assert!(parse_scalar("9223372036854775808", ScalarType::I64).is_err());
    }

    #[test]
    fn test_unsigned_rejects_signs() {
        assert!(parse_scalar("-1", ScalarType::U32).is_err());
        assert!(parse_scalar("+1", ScalarType::U32).is_err());
        assert_eq!(parse_scalar("255", ScalarType::U8).unwrap(), json!(255));
        assert!(parse_scalar("256", ScalarType::U8).is_err());
    }

    #[test]
    fn test_float_parsing() {
        assert_eq!(parse_scalar("3.5", ScalarType::F64).unwrap(), json!(3.5));
        assert_eq!(parse_scalar("1e3", ScalarType::F64).unwrap(), json!(1000.0));
        assert!(parse_scalar("abc", ScalarType::F64).is_err());
        assert!(parse_scalar("NaN", ScalarType::F64).is_err());
        assert!(parse_scalar("inf", ScalarType::F64).is_err());
        assert!(parse_scalar("1e39", ScalarType::F32).is_err());
    }

    #[test]
    fn test_error_message() {
        let err = parse_scalar("abc", ScalarType::I64).unwrap_err();
        assert_eq!(err.to_string(), "invalid integer value \"abc\"");
        assert_eq!(err.raw(), "abc");
        assert_eq!(err.expected(), ScalarType::I64);

        let err = parse_scalar("maybe", ScalarType::Bool).unwrap_err();
        assert_eq!(err.to_string(), "invalid boolean value \"maybe\"");

        let err = parse_scalar("-3", ScalarType::U16).unwrap_err();
        assert_eq!(err.to_string(), "invalid unsigned integer value \"-3\"");
    }

    #[test]
    fn test_zero_values() {
        assert_eq!(ScalarType::String.zero_value(), json!(""));
        assert_eq!(ScalarType::Bool.zero_value(), json!(false));
        assert_eq!(ScalarType::U8.zero_value(), json!(0));
        assert_eq!(ScalarType::F32.zero_value(), json!(0.0));
    }

    proptest! {
        #[test]
        fn prop_i8_accepts_exactly_its_range(n in any::<i32>()) {
            let result = parse_scalar(&n.to_string(), ScalarType::I8);
            prop_assert_eq!(result.is_ok(), i8::try_from(n).is_ok());
        }

        #[test]
        fn prop_u16_accepts_exactly_its_range(n in any::<i64>()) {
            let result = parse_scalar(&n.to_string(), ScalarType::U16);
            prop_assert_eq!(result.is_ok(), u16::try_from(n).is_ok());
        }

        #[test]
        fn prop_i64_value_preserved(n in any::<i64>()) {
            let value = parse_scalar(&n.to_string(), ScalarType::I64).unwrap();
            prop_assert_eq!(value.as_i64(), Some(n));
        }
    }
}
