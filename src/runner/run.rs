//! Grouped query execution
//!
//! Groups the primary table's filtered rows by the requested attribute
//! columns, evaluates every requested metric per group through one shared
//! cache, and assembles formatted output rows.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use log::debug;

use crate::context::{FilterContext, FilterSpec};
use crate::dataset::{Dataset, Row, Value};
use crate::eval::{evaluate_metric_cached, EvalCache, EvalError};
use crate::filter::filter_rows;
use crate::format::format_value;
use crate::query::QueryRequest;
use crate::semantic_model::{Attribute, DisplayName, SemanticModel};

use super::error::QueryError;

/// Run a grouped aggregate query
///
/// Returns one output row per attribute-value combination present in the
/// filtered data, in first-seen order. Each row carries the requested
/// attributes (plus any resolved display names) and each requested metric as
/// a formatted string, null when the metric evaluates to null.
pub fn run_query(
    model: &SemanticModel,
    data: &Dataset,
    request: &QueryRequest,
) -> Result<Vec<Row>, QueryError> {
    if request.attributes.is_empty() {
        return Err(QueryError::NoAttributes);
    }

    // Resolve attributes; grouping is single-table by design
    let attributes = request
        .attributes
        .iter()
        .map(|name| {
            model
                .get_attribute(name)
                .ok_or_else(|| QueryError::UnknownAttribute(name.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let primary = &attributes[0].table;
    for attribute in &attributes[1..] {
        if attribute.table != *primary {
            return Err(QueryError::MixedAttributeTables {
                expected: primary.clone(),
                attribute: attribute.name.clone(),
                table: attribute.table.clone(),
            });
        }
    }

    let table = data
        .get_table(primary)
        .ok_or_else(|| EvalError::MissingTable(primary.clone()))?;

    let empty = FilterContext::new();
    let global = request.filters.as_ref().unwrap_or(&empty);

    // Group filtered rows by the projected attribute columns, keeping the
    // first row of each group as its representative
    let mut groups: IndexMap<String, &Row> = IndexMap::new();
    for row in filter_rows(&table.rows, global, &table.columns) {
        let key = group_key(row, &attributes);
        groups.entry(key).or_insert(row);
    }
    debug!(
        "query over '{}': {} groups, {} metrics",
        primary,
        groups.len(),
        request.metrics.len()
    );

    // One cache for every metric of every group in this invocation
    let mut cache = EvalCache::new();
    let mut output = Vec::with_capacity(groups.len());
    for row in groups.values() {
        // Scope the context to exactly this attribute combination
        let mut scoped = global.clone();
        for attribute in &attributes {
            scoped.insert(
                attribute.column_name().to_string(),
                FilterSpec::Scalar(raw_value(row, attribute)),
            );
        }

        let mut out = Row::new();
        for attribute in &attributes {
            let raw = raw_value(row, attribute);
            let value = if let Some(derive) = &attribute.derive {
                derive(row)
            } else if let Some(format) = &attribute.format {
                Value::String(format(&raw))
            } else {
                raw.clone()
            };
            out.insert(attribute.name.clone(), value);

            if let Some(display) = &attribute.display {
                if let Some(label) = resolve_display(data, display, &raw) {
                    out.insert(display.field.clone(), label);
                }
            }
        }

        for metric_name in &request.metrics {
            let metric = model
                .get_metric(metric_name)
                .ok_or_else(|| EvalError::UnknownMetric(metric_name.clone()))?;
            let value = evaluate_metric_cached(model, data, metric_name, &scoped, &mut cache)?;
            let formatted = format_value(value, metric.format.as_deref());
            out.insert(
                metric_name.clone(),
                formatted.map(Value::String).unwrap_or(Value::Null),
            );
        }

        output.push(out);
    }

    Ok(output)
}

fn raw_value(row: &Row, attribute: &Attribute) -> Value {
    row.get(attribute.column_name())
        .cloned()
        .unwrap_or(Value::Null)
}

/// Canonical serialization of the projected sub-row, the group identity
fn group_key(row: &Row, attributes: &[&Attribute]) -> String {
    let projection: BTreeMap<&str, &Value> = attributes
        .iter()
        .map(|attribute| {
            let column = attribute.column_name();
            (column, row.get(column).unwrap_or(&Value::NULL))
        })
        .collect();
    serde_json::to_string(&projection).unwrap_or_else(|_| "{}".to_string())
}

/// Best-effort display-name lookup through explicit relationship metadata.
/// No matching table or row silently omits the field.
fn resolve_display(data: &Dataset, display: &DisplayName, key: &Value) -> Option<Value> {
    let table = data.get_table(&display.table)?;
    table
        .rows
        .iter()
        .find(|row| row.get(&display.key_column).unwrap_or(&Value::NULL) == key)
        .and_then(|row| row.get(&display.label_column))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::context_from;
    use crate::semantic_model::{Aggregation, Measure, Metric};

    fn demo_dataset() -> Dataset {
        let yaml = r#"
tables:
  - name: sales
    columns: [year, month, regionId, amount]
    rows:
      - { year: 2025, month: 1, regionId: NA, amount: 1000 }
      - { year: 2025, month: 1, regionId: EU, amount: 600 }
      - { year: 2025, month: 2, regionId: NA, amount: 950 }
      - { year: 2024, month: 1, regionId: NA, amount: 700 }
  - name: regions
    columns: [id, name]
    rows:
      - { id: NA, name: North America }
      - { id: EU, name: Europe }
"#;
        Dataset::parse_str(yaml).unwrap()
    }

    fn demo_model() -> SemanticModel {
        SemanticModel::builder()
            .attribute(Attribute::new("year", "sales"))
            .attribute(
                Attribute::new("region", "sales")
                    .column("regionId")
                    .display(DisplayName::new("regionName", "regions", "id", "name")),
            )
            .measure(Measure::new("amount", "sales", Aggregation::Sum))
            .metric(Metric::simple("revenue", "amount").format("currency"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_groups_in_first_seen_order() {
        let model = demo_model();
        let data = demo_dataset();
        let request = QueryRequest {
            attributes: vec!["region".to_string()],
            filters: Some(context_from([("year", 2025)])),
            metrics: vec!["revenue".to_string()],
        };
        let rows = run_query(&model, &data, &request).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("region"), Some(&Value::String("NA".to_string())));
        assert_eq!(rows[1].get("region"), Some(&Value::String("EU".to_string())));
        assert_eq!(
            rows[0].get("revenue"),
            Some(&Value::String("$1950.00".to_string()))
        );
        assert_eq!(
            rows[1].get("revenue"),
            Some(&Value::String("$600.00".to_string()))
        );
    }

    #[test]
    fn test_display_name_resolved() {
        let model = demo_model();
        let data = demo_dataset();
        let request = QueryRequest {
            attributes: vec!["region".to_string()],
            filters: None,
            metrics: vec![],
        };
        let rows = run_query(&model, &data, &request).unwrap();
        assert_eq!(
            rows[0].get("regionName"),
            Some(&Value::String("North America".to_string()))
        );
    }

    #[test]
    fn test_attribute_only_query_has_no_metric_fields() {
        let model = demo_model();
        let data = demo_dataset();
        let request = QueryRequest {
            attributes: vec!["year".to_string()],
            filters: None,
            metrics: vec![],
        };
        let rows = run_query(&model, &data, &request).unwrap();
        assert_eq!(rows.len(), 2); // 2025 and 2024
        assert!(rows[0].get("revenue").is_none());
    }

    #[test]
    fn test_no_attributes_rejected() {
        let model = demo_model();
        let data = demo_dataset();
        let request = QueryRequest::default();
        let err = run_query(&model, &data, &request).unwrap_err();
        assert!(matches!(err, QueryError::NoAttributes));
    }

    #[test]
    fn test_unknown_attribute() {
        let model = demo_model();
        let data = demo_dataset();
        let request = QueryRequest {
            attributes: vec!["nope".to_string()],
            filters: None,
            metrics: vec![],
        };
        let err = run_query(&model, &data, &request).unwrap_err();
        assert!(matches!(err, QueryError::UnknownAttribute(name) if name == "nope"));
    }

    #[test]
    fn test_mixed_attribute_tables_rejected() {
        let model = SemanticModel::builder()
            .attribute(Attribute::new("year", "sales"))
            .attribute(Attribute::new("regionName", "regions").column("name"))
            .build()
            .unwrap();
        let data = demo_dataset();
        let request = QueryRequest {
            attributes: vec!["year".to_string(), "regionName".to_string()],
            filters: None,
            metrics: vec![],
        };
        let err = run_query(&model, &data, &request).unwrap_err();
        assert!(matches!(err, QueryError::MixedAttributeTables { .. }));
    }

    #[test]
    fn test_groups_with_no_rows_do_not_appear() {
        let model = demo_model();
        let data = demo_dataset();
        let request = QueryRequest {
            attributes: vec!["region".to_string()],
            filters: Some(context_from([("year", 2024)])),
            metrics: vec![],
        };
        let rows = run_query(&model, &data, &request).unwrap();
        // Only NA sold in 2024; EU emits no group
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("region"), Some(&Value::String("NA".to_string())));
    }

    #[test]
    fn test_derived_attribute_value() {
        let model = SemanticModel::builder()
            .attribute(
                Attribute::new("period", "sales").column("month").derive(|row| {
                    let month = row.get("month").and_then(Value::as_f64).unwrap_or(0.0);
                    Value::String(format!("M{:02}", month))
                }),
            )
            .build()
            .unwrap();
        let data = demo_dataset();
        let request = QueryRequest {
            attributes: vec!["period".to_string()],
            filters: Some(context_from([("year", 2025)])),
            metrics: vec![],
        };
        let rows = run_query(&model, &data, &request).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("period"), Some(&Value::String("M01".to_string())));
        assert_eq!(rows[1].get("period"), Some(&Value::String("M02".to_string())));
    }
}
