//! Metric evaluation
//!
//! The recursive, memoized evaluator at the center of the engine. Each
//! top-level call owns one `EvalCache`; recursive evaluation of derived and
//! context-transformed metrics threads that cache through so shared
//! dependencies are computed once per (metric, context) pair. The cache must
//! never be shared across concurrent invocations.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::trace;

use crate::context::{canonical_key, FilterContext};
use crate::dataset::{Dataset, Row, RowSeq, Value};
use crate::filter::filter_rows;
use crate::semantic_model::{Aggregation, MetricKind, SemanticModel};

use super::error::EvalError;

/// Per-top-level-call memo table, keyed by metric name and canonical context
/// serialization. A cached `None` is a valid value, distinct from "not yet
/// computed".
pub type EvalCache = HashMap<(String, String), Option<f64>>;

/// Evaluate a metric under a context with a fresh cache
pub fn evaluate_metric(
    model: &SemanticModel,
    data: &Dataset,
    name: &str,
    context: &FilterContext,
) -> Result<Option<f64>, EvalError> {
    let mut cache = EvalCache::new();
    evaluate_metric_cached(model, data, name, context, &mut cache)
}

/// Evaluate a metric under a context, memoizing into the given cache
///
/// The query runner calls this with one cache shared across every metric and
/// group of a query invocation.
pub fn evaluate_metric_cached(
    model: &SemanticModel,
    data: &Dataset,
    name: &str,
    context: &FilterContext,
    cache: &mut EvalCache,
) -> Result<Option<f64>, EvalError> {
    let key = (name.to_string(), canonical_key(context));
    if let Some(cached) = cache.get(&key) {
        trace!("cache hit for metric '{}' under {}", name, key.1);
        return Ok(*cached);
    }

    let metric = model
        .get_metric(name)
        .ok_or_else(|| EvalError::UnknownMetric(name.to_string()))?;

    let value = match &metric.kind {
        MetricKind::Simple { measure, grain } => {
            resolve_measure(model, data, measure, context, grain.as_deref())?
        }
        MetricKind::Expression { table, grain, expr } => {
            let table = data
                .get_table(table)
                .ok_or_else(|| EvalError::MissingTable(table.clone()))?;
            let grain = grain.as_deref().unwrap_or(&table.columns);
            let rows: RowSeq<'_> = Box::new(filter_rows(&table.rows, context, grain));
            expr(rows, context)
        }
        MetricKind::Derived {
            dependencies,
            combine,
        } => {
            let mut resolved: BTreeMap<String, Option<f64>> = BTreeMap::new();
            for dependency in dependencies {
                let value = evaluate_metric_cached(model, data, dependency, context, cache)?;
                resolved.insert(dependency.clone(), value);
            }
            combine(&resolved)
        }
        MetricKind::ContextTransform { base, transform } => {
            let rewrite = model
                .get_transform(transform)
                .ok_or_else(|| EvalError::UnknownTransform(transform.clone()))?;
            let transformed = rewrite(context);
            evaluate_metric_cached(model, data, base, &transformed, cache)?
        }
    };

    cache.insert(key, value);
    Ok(value)
}

/// Resolve a measure under a context: filter the backing table by the
/// effective grain, then aggregate
///
/// The effective grain is the explicit override if given, else the measure's
/// declared grain, else the table's declared columns.
pub fn resolve_measure(
    model: &SemanticModel,
    data: &Dataset,
    name: &str,
    context: &FilterContext,
    grain_override: Option<&[String]>,
) -> Result<Option<f64>, EvalError> {
    let measure = model
        .get_measure(name)
        .ok_or_else(|| EvalError::UnknownMeasure(name.to_string()))?;
    let table = data
        .get_table(&measure.table)
        .ok_or_else(|| EvalError::MissingTable(measure.table.clone()))?;
    let grain = grain_override
        .or(measure.grain.as_deref())
        .unwrap_or(&table.columns);

    let rows = filter_rows(&table.rows, context, grain);
    if let Some(custom) = &measure.aggregate_with {
        return Ok(custom(Box::new(rows)));
    }
    Ok(aggregate(rows, measure.column_name(), measure.aggregation))
}

/// Built-in aggregation dispatch over a filtered row sequence
///
/// Empty-sequence policy: `sum` and `count` and `distinct` yield 0; `avg`,
/// `min`, and `max` yield null (there is no average of nothing). Null and
/// non-numeric values count as 0 under `sum`/`avg` and are skipped by
/// `min`/`max`; `distinct` counts every value, null included.
fn aggregate<'a>(
    rows: impl Iterator<Item = &'a Row>,
    column: &str,
    aggregation: Aggregation,
) -> Option<f64> {
    match aggregation {
        Aggregation::Sum => {
            let mut total = 0.0;
            for row in rows {
                total += number_or_zero(row.get(column));
            }
            Some(total)
        }
        Aggregation::Avg => {
            let mut total = 0.0;
            let mut count: u64 = 0;
            for row in rows {
                total += number_or_zero(row.get(column));
                count += 1;
            }
            if count == 0 {
                None
            } else {
                Some(total / count as f64)
            }
        }
        Aggregation::Count => Some(rows.count() as f64),
        Aggregation::Min => rows
            .filter_map(|row| row.get(column).and_then(Value::as_f64))
            .fold(None, |extremum, value| {
                Some(match extremum {
                    None => value,
                    Some(current) => current.min(value),
                })
            }),
        Aggregation::Max => rows
            .filter_map(|row| row.get(column).and_then(Value::as_f64))
            .fold(None, |extremum, value| {
                Some(match extremum {
                    None => value,
                    Some(current) => current.max(value),
                })
            }),
        Aggregation::Distinct => {
            let mut seen: BTreeSet<String> = BTreeSet::new();
            for row in rows {
                seen.insert(row.get(column).unwrap_or(&Value::NULL).canonical());
            }
            Some(seen.len() as f64)
        }
    }
}

fn number_or_zero(value: Option<&Value>) -> f64 {
    value.and_then(Value::as_f64).unwrap_or(0.0)
}
