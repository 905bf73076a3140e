//! Bound argument values
//!
//! Every positional placeholder in a rewritten statement is bound to exactly
//! one `SqlValue`. The engine never inspects values; it only moves them into
//! the final argument list in placeholder order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A value bound to a positional placeholder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    /// SQL NULL
    Null,

    /// Boolean
    Bool(bool),

    /// Signed integer
    Int(i64),

    /// Floating point number
    Float(f64),

    /// Text
    Text(String),

    /// Raw bytes
    ///
    /// When deserialized, an array of integers in `0..=255` lands here.
    Bytes(Vec<u8>),
}

impl SqlValue {
    /// Check if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short type name, used in logs and CLI output
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Text(s) => write!(f, "{:?}", s),
            Self::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for SqlValue {
                fn from(v: $t) -> Self {
                    Self::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f32> for SqlValue {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Self::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn conversions() {
        assert_eq!(SqlValue::from(25), SqlValue::Int(25));
        assert_eq!(SqlValue::from(7u32), SqlValue::Int(7));
        assert_eq!(SqlValue::from("John"), SqlValue::Text("John".to_string()));
        assert_eq!(SqlValue::from(None::<i32>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some(true)), SqlValue::Bool(true));
    }

    #[test]
    fn json_values_deserialize_untagged() {
        let values: Vec<SqlValue> = serde_json::from_str(r#"["John", 25, 1.5, true, null]"#).unwrap();
        assert_eq!(
            values,
            vec![
                SqlValue::Text("John".to_string()),
                SqlValue::Int(25),
                SqlValue::Float(1.5),
                SqlValue::Bool(true),
                SqlValue::Null,
            ]
        );
    }

    #[test]
    fn display_quotes_text() {
        assert_eq!(SqlValue::from("a").to_string(), "\"a\"");
        assert_eq!(SqlValue::Null.to_string(), "NULL");
        assert_eq!(SqlValue::Bytes(vec![1, 2, 3]).to_string(), "<3 bytes>");
    }
}
