//! Metric types - named business computations
//!
//! A metric is one of four kinds: a simple measure wrapper, a custom
//! expression over filtered rows, a derivation combining other metrics, or a
//! re-evaluation of a base metric under a rewritten filter context.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::context::FilterContext;
use crate::dataset::RowSeq;

/// Custom expression: computes a value from the filtered (lazy) row sequence
/// and the raw evaluation context
pub type ExpressionFn =
    Arc<dyn for<'a> Fn(RowSeq<'a>, &FilterContext) -> Option<f64> + Send + Sync>;

/// Combining function for derived metrics: receives each dependency's
/// resolved value (which may be null) keyed by metric name
pub type CombineFn = Arc<dyn Fn(&BTreeMap<String, Option<f64>>) -> Option<f64> + Send + Sync>;

/// A metric - a named business computation over the dataset
#[derive(Clone)]
pub struct Metric {
    pub name: String,
    pub label: Option<String>,
    /// Human-readable description for UIs
    pub description: Option<String>,
    /// Display format tag (see `format_value`)
    pub format: Option<String>,
    pub kind: MetricKind,
}

/// The four metric kinds
#[derive(Clone)]
pub enum MetricKind {
    /// Wraps a measure by name, optionally overriding its grain
    Simple {
        measure: String,
        grain: Option<Vec<String>>,
    },
    /// Custom expression over a table's filtered rows
    Expression {
        table: String,
        grain: Option<Vec<String>>,
        expr: ExpressionFn,
    },
    /// Combines the values of other metrics
    Derived {
        dependencies: Vec<String>,
        combine: CombineFn,
    },
    /// Re-evaluates a base metric under a transformed context
    ContextTransform { base: String, transform: String },
}

impl Metric {
    /// A metric wrapping a measure
    pub fn simple(name: impl Into<String>, measure: impl Into<String>) -> Self {
        Metric {
            name: name.into(),
            label: None,
            description: None,
            format: None,
            kind: MetricKind::Simple {
                measure: measure.into(),
                grain: None,
            },
        }
    }

    /// A metric computed by a custom expression over a table's filtered rows
    pub fn expression<F>(name: impl Into<String>, table: impl Into<String>, expr: F) -> Self
    where
        F: for<'a> Fn(RowSeq<'a>, &FilterContext) -> Option<f64> + Send + Sync + 'static,
    {
        Metric {
            name: name.into(),
            label: None,
            description: None,
            format: None,
            kind: MetricKind::Expression {
                table: table.into(),
                grain: None,
                expr: Arc::new(expr),
            },
        }
    }

    /// A metric derived from other metrics by a combining function
    pub fn derived<I, S, F>(name: impl Into<String>, dependencies: I, combine: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&BTreeMap<String, Option<f64>>) -> Option<f64> + Send + Sync + 'static,
    {
        Metric {
            name: name.into(),
            label: None,
            description: None,
            format: None,
            kind: MetricKind::Derived {
                dependencies: dependencies.into_iter().map(Into::into).collect(),
                combine: Arc::new(combine),
            },
        }
    }

    /// A metric re-evaluating a base metric under a named context transform
    pub fn transformed(
        name: impl Into<String>,
        base: impl Into<String>,
        transform: impl Into<String>,
    ) -> Self {
        Metric {
            name: name.into(),
            label: None,
            description: None,
            format: None,
            kind: MetricKind::ContextTransform {
                base: base.into(),
                transform: transform.into(),
            },
        }
    }

    /// Set the display label
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the display format tag
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Override the grain. Applies to `Simple` and `Expression` metrics; the
    /// other kinds inherit context handling from what they evaluate.
    pub fn grain<I, S>(mut self, grain: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let cols: Vec<String> = grain.into_iter().map(Into::into).collect();
        match &mut self.kind {
            MetricKind::Simple { grain, .. } | MetricKind::Expression { grain, .. } => {
                *grain = Some(cols);
            }
            MetricKind::Derived { .. } | MetricKind::ContextTransform { .. } => {}
        }
        self
    }

    /// Names of metrics this metric evaluates before itself
    pub fn dependency_names(&self) -> Vec<&str> {
        match &self.kind {
            MetricKind::Derived { dependencies, .. } => {
                dependencies.iter().map(String::as_str).collect()
            }
            MetricKind::ContextTransform { base, .. } => vec![base.as_str()],
            MetricKind::Simple { .. } | MetricKind::Expression { .. } => vec![],
        }
    }
}

impl fmt::Debug for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metric")
            .field("name", &self.name)
            .field("format", &self.format)
            .field("kind", &self.kind)
            .finish()
    }
}

impl fmt::Debug for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKind::Simple { measure, grain } => f
                .debug_struct("Simple")
                .field("measure", measure)
                .field("grain", grain)
                .finish(),
            MetricKind::Expression { table, grain, .. } => f
                .debug_struct("Expression")
                .field("table", table)
                .field("grain", grain)
                .finish(),
            MetricKind::Derived { dependencies, .. } => f
                .debug_struct("Derived")
                .field("dependencies", dependencies)
                .finish(),
            MetricKind::ContextTransform { base, transform } => f
                .debug_struct("ContextTransform")
                .field("base", base)
                .field("transform", transform)
                .finish(),
        }
    }
}
