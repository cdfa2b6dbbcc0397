//! Scalar values accepted by the cache.
//!
//! Values are stored in their textual form. Reads always come back as
//! strings, so `CacheValue::Integer(7)` is read back as `"7"`.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{CacheError, Result};

/// A scalar value that can be written to the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CacheValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

/// The kind of scalar a textual value should be parsed as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValueKind {
    #[default]
    Text,
    Integer,
    Float,
    Boolean,
}

impl CacheValue {
    /// Returns the store encoding of this value.
    ///
    /// Booleans encode as `"true"` / `"false"`, numbers as their decimal form.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Parses `raw` as a value of the given kind.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::InvalidValue` if `raw` is not a valid value of `kind`.
    pub fn parse(raw: &str, kind: ValueKind) -> Result<Self> {
        match kind {
            ValueKind::Text => Ok(CacheValue::Text(raw.to_string())),
            ValueKind::Integer => raw.trim().parse().map(CacheValue::Integer).map_err(|e| {
                CacheError::InvalidValue(format!("'{}' is not an integer: {}", raw, e))
            }),
            ValueKind::Float => {
                let value: f64 = raw.trim().parse().map_err(|e| {
                    CacheError::InvalidValue(format!("'{}' is not a number: {}", raw, e))
                })?;
                if !value.is_finite() {
                    return Err(CacheError::InvalidValue(format!(
                        "'{}' is not a finite number",
                        raw
                    )));
                }
                Ok(CacheValue::Float(value))
            }
            ValueKind::Boolean => match raw.trim() {
                "true" => Ok(CacheValue::Boolean(true)),
                "false" => Ok(CacheValue::Boolean(false)),
                other => Err(CacheError::InvalidValue(format!(
                    "'{}' is not a boolean (expected 'true' or 'false')",
                    other
                ))),
            },
        }
    }
}

impl fmt::Display for CacheValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheValue::Boolean(b) => write!(f, "{}", b),
            CacheValue::Integer(n) => write!(f, "{}", n),
            CacheValue::Float(n) => write!(f, "{}", n),
            CacheValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CacheValue {
    fn from(value: &str) -> Self {
        CacheValue::Text(value.to_string())
    }
}

impl From<String> for CacheValue {
    fn from(value: String) -> Self {
        CacheValue::Text(value)
    }
}

impl From<&String> for CacheValue {
    fn from(value: &String) -> Self {
        CacheValue::Text(value.clone())
    }
}

impl From<bool> for CacheValue {
    fn from(value: bool) -> Self {
        CacheValue::Boolean(value)
    }
}

impl From<i64> for CacheValue {
    fn from(value: i64) -> Self {
        CacheValue::Integer(value)
    }
}

impl From<i32> for CacheValue {
    fn from(value: i32) -> Self {
        CacheValue::Integer(i64::from(value))
    }
}

impl From<u32> for CacheValue {
    fn from(value: u32) -> Self {
        CacheValue::Integer(i64::from(value))
    }
}

impl From<f64> for CacheValue {
    fn from(value: f64) -> Self {
        CacheValue::Float(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_scalars() {
        assert_eq!(CacheValue::from("user-7").encode(), "user-7");
        assert_eq!(CacheValue::from(42_i64).encode(), "42");
        assert_eq!(CacheValue::from(-3_i32).encode(), "-3");
        assert_eq!(CacheValue::from(1.5).encode(), "1.5");
        assert_eq!(CacheValue::from(true).encode(), "true");
        assert_eq!(CacheValue::from(false).encode(), "false");
    }

    #[test]
    fn test_whole_float_encodes_without_fraction() {
        assert_eq!(CacheValue::from(2.0).encode(), "2");
    }

    #[test]
    fn test_parse_text_is_verbatim() {
        let value = CacheValue::parse("  spaced  ", ValueKind::Text).unwrap();
        assert_eq!(value, CacheValue::Text("  spaced  ".to_string()));
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(
            CacheValue::parse("17", ValueKind::Integer).unwrap(),
            CacheValue::Integer(17)
        );
        assert!(matches!(
            CacheValue::parse("1.2", ValueKind::Integer),
            Err(CacheError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_parse_float_rejects_non_finite() {
        assert_eq!(
            CacheValue::parse("0.25", ValueKind::Float).unwrap(),
            CacheValue::Float(0.25)
        );
        assert!(CacheValue::parse("NaN", ValueKind::Float).is_err());
        assert!(CacheValue::parse("inf", ValueKind::Float).is_err());
    }

    #[test]
    fn test_parse_boolean() {
        assert_eq!(
            CacheValue::parse("true", ValueKind::Boolean).unwrap(),
            CacheValue::Boolean(true)
        );
        assert_eq!(
            CacheValue::parse("false", ValueKind::Boolean).unwrap(),
            CacheValue::Boolean(false)
        );
        let err = CacheValue::parse("yes", ValueKind::Boolean).unwrap_err();
        assert!(err.to_string().contains("expected 'true' or 'false'"));
    }

    #[test]
    fn test_untagged_json() {
        let values: Vec<CacheValue> = serde_json::from_str(r#"[true, 3, 1.5, "x"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                CacheValue::Boolean(true),
                CacheValue::Integer(3),
                CacheValue::Float(1.5),
                CacheValue::Text("x".to_string()),
            ]
        );
    }
}
