//! Scalar cell values

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A scalar value held in a row field or used in a filter comparison
///
/// Equality is strict: values of different variants are never equal and no
/// coercion is performed (`Number(1.0)` does not equal `String("1")`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Absent / null
    Null,
    /// Boolean
    Bool(bool),
    /// Numeric value (all numbers are f64, like the row data they come from)
    Number(f64),
    /// String value
    String(String),
}

impl Value {
    /// The null value, usable where a `&Value` is needed for missing fields
    pub const NULL: Value = Value::Null;

    /// Check whether this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the numeric value, if this is a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the string value, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Canonical serialization of this value, used for distinct counting and
    /// group keys
    pub fn canonical(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "null".to_string())
    }
}

/// Ordering is defined within a variant only: numbers compare numerically,
/// strings lexicographically, booleans false < true. Values of different
/// variants (and nulls) are unordered, so range bounds on them never match.
impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_equality() {
        assert_eq!(Value::Number(1.0), Value::Number(1.0));
        assert_ne!(Value::Number(1.0), Value::String("1".to_string()));
        assert_ne!(Value::Bool(true), Value::Number(1.0));
        assert_eq!(Value::Null, Value::Null);
    }

    #[test]
    fn test_ordering_within_variant() {
        assert!(Value::Number(2.0) > Value::Number(1.0));
        assert!(Value::String("a".to_string()) < Value::String("b".to_string()));
        assert_eq!(
            Value::Bool(false).partial_cmp(&Value::Bool(true)),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn test_mismatched_variants_unordered() {
        assert_eq!(Value::Number(1.0).partial_cmp(&Value::String("1".to_string())), None);
        assert_eq!(Value::Null.partial_cmp(&Value::Null), None);
        assert_eq!(Value::Null.partial_cmp(&Value::Number(0.0)), None);
    }

    #[test]
    fn test_deserialize_untagged() {
        let v: Value = serde_yaml::from_str("1000").unwrap();
        assert_eq!(v, Value::Number(1000.0));
        let v: Value = serde_yaml::from_str("NA").unwrap();
        assert_eq!(v, Value::String("NA".to_string()));
        let v: Value = serde_yaml::from_str("~").unwrap();
        assert_eq!(v, Value::Null);
        let v: Value = serde_yaml::from_str("true").unwrap();
        assert_eq!(v, Value::Bool(true));
    }

    #[test]
    fn test_canonical() {
        assert_eq!(Value::Number(5.0).canonical(), "5.0");
        assert_eq!(Value::String("NA".to_string()).canonical(), "\"NA\"");
        assert_eq!(Value::Null.canonical(), "null");
    }
}
