//! Filter contexts (nouns)
//!
//! A filter context is the active set of equality and range constraints a
//! computation evaluates under. Context transforms rewrite these for time
//! intelligence; the evaluator keys its memo cache on the canonical
//! serialization produced here.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::dataset::Value;

/// Active constraints, keyed by field name. Absence of a key means "no
/// constraint on that field". A `BTreeMap` so the canonical serialization is
/// deterministic without extra sorting.
pub type FilterContext = BTreeMap<String, FilterSpec>;

/// A single field constraint: either a scalar (equality) or a range spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterSpec {
    /// Range or comparison bounds
    Range(RangeSpec),
    /// Strict equality against a scalar
    Scalar(Value),
}

impl FilterSpec {
    /// A null scalar constrains nothing and is skipped by the row filter
    pub fn is_null(&self) -> bool {
        matches!(self, FilterSpec::Scalar(Value::Null))
    }
}

impl From<Value> for FilterSpec {
    fn from(value: Value) -> Self {
        FilterSpec::Scalar(value)
    }
}

impl From<RangeSpec> for FilterSpec {
    fn from(range: RangeSpec) -> Self {
        FilterSpec::Range(range)
    }
}

impl From<f64> for FilterSpec {
    fn from(n: f64) -> Self {
        FilterSpec::Scalar(Value::Number(n))
    }
}

impl From<i64> for FilterSpec {
    fn from(n: i64) -> Self {
        FilterSpec::Scalar(Value::Number(n as f64))
    }
}

impl From<i32> for FilterSpec {
    fn from(n: i32) -> Self {
        FilterSpec::Scalar(Value::Number(n as f64))
    }
}

impl From<bool> for FilterSpec {
    fn from(b: bool) -> Self {
        FilterSpec::Scalar(Value::Bool(b))
    }
}

impl From<&str> for FilterSpec {
    fn from(s: &str) -> Self {
        FilterSpec::Scalar(Value::String(s.to_string()))
    }
}

/// Range / comparison bounds on a single field
///
/// `from`/`to` are an inclusive-range shorthand. When either is present the
/// four comparison bounds are not consulted; otherwise every present bound of
/// `gte`/`lte`/`gt`/`lt` must hold (logical AND).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RangeSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gte: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lte: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<Value>,
}

impl RangeSpec {
    /// Upper inclusive bound only
    pub fn lte(value: impl Into<Value>) -> Self {
        RangeSpec {
            lte: Some(value.into()),
            ..RangeSpec::default()
        }
    }

    /// Lower inclusive bound only
    pub fn gte(value: impl Into<Value>) -> Self {
        RangeSpec {
            gte: Some(value.into()),
            ..RangeSpec::default()
        }
    }

    /// Inclusive range between two bounds
    pub fn between(low: impl Into<Value>, high: impl Into<Value>) -> Self {
        RangeSpec {
            gte: Some(low.into()),
            lte: Some(high.into()),
            ..RangeSpec::default()
        }
    }
}

/// Canonical serialization of a context, the cache-key half the evaluator
/// pairs with a metric name. Identical contexts always serialize identically.
pub fn canonical_key(context: &FilterContext) -> String {
    serde_json::to_string(context).unwrap_or_else(|_| "{}".to_string())
}

/// Build a context from field/spec pairs
pub fn context_from<I, S, F>(entries: I) -> FilterContext
where
    I: IntoIterator<Item = (S, F)>,
    S: Into<String>,
    F: Into<FilterSpec>,
{
    entries
        .into_iter()
        .map(|(field, spec)| (field.into(), spec.into()))
        .collect()
}
