//! Query request types

use serde::Deserialize;

use crate::context::FilterContext;

/// Request body for grouped aggregate queries
///
/// Queries are expressed in terms of attributes (for grouping) and metrics
/// (for values), plus an optional global filter context. Measures are
/// internal implementation details reached through metrics.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryRequest {
    /// Attributes to group by; must be non-empty and share one table
    #[serde(default)]
    pub attributes: Vec<String>,
    /// Global filter context applied before grouping and to every metric
    #[serde(default)]
    pub filters: Option<FilterContext>,
    /// Metrics to compute per group; may be empty
    #[serde(default)]
    pub metrics: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FilterSpec;
    use crate::dataset::Value;

    #[test]
    fn test_deserialize_request() {
        let request: QueryRequest = serde_json::from_str(
            r#"{
                "attributes": ["region"],
                "filters": { "year": 2025, "month": { "lte": 6 } },
                "metrics": ["revenue"]
            }"#,
        )
        .unwrap();
        assert_eq!(request.attributes, vec!["region"]);
        assert_eq!(request.metrics, vec!["revenue"]);
        let filters = request.filters.unwrap();
        assert_eq!(
            filters.get("year"),
            Some(&FilterSpec::Scalar(Value::Number(2025.0)))
        );
    }

    #[test]
    fn test_deserialize_minimal_request() {
        let request: QueryRequest =
            serde_json::from_str(r#"{ "attributes": ["region"] }"#).unwrap();
        assert!(request.filters.is_none());
        assert!(request.metrics.is_empty());
    }
}
