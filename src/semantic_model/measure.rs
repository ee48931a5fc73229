//! Measure types - aggregatable quantities

use std::fmt;
use std::sync::Arc;

use super::types::Aggregation;
use crate::dataset::RowSeq;

/// Custom aggregation function over an already-filtered row sequence.
/// When set on a measure it fully replaces the built-in aggregation dispatch.
pub type AggregateFn = Arc<dyn for<'a> Fn(RowSeq<'a>) -> Option<f64> + Send + Sync>;

/// A measure - an aggregatable quantity backed by a table column
#[derive(Clone)]
pub struct Measure {
    pub name: String,
    pub table: String,
    /// Backing column; defaults to the measure name
    pub column: Option<String>,
    pub label: Option<String>,
    /// Human-readable description for UIs
    pub description: Option<String>,
    /// Display format tag (see `format_value`)
    pub format: Option<String>,
    /// Aggregation function (sum, avg, count, distinct, min, max)
    pub aggregation: Aggregation,
    /// Grain override; defaults to the backing table's declared columns
    pub grain: Option<Vec<String>>,
    /// Custom aggregation, overriding the aggregation kind entirely
    pub aggregate_with: Option<AggregateFn>,
}

impl Measure {
    /// Create a measure over the column of the same name
    pub fn new(name: impl Into<String>, table: impl Into<String>, aggregation: Aggregation) -> Self {
        Measure {
            name: name.into(),
            table: table.into(),
            column: None,
            label: None,
            description: None,
            format: None,
            aggregation,
            grain: None,
            aggregate_with: None,
        }
    }

    /// Override the backing column
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
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

    /// Override the grain (the fields whose filters this measure respects)
    pub fn grain<I, S>(mut self, grain: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.grain = Some(grain.into_iter().map(Into::into).collect());
        self
    }

    /// Replace the built-in aggregation with a custom function
    pub fn aggregate_with<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(RowSeq<'a>) -> Option<f64> + Send + Sync + 'static,
    {
        self.aggregate_with = Some(Arc::new(f));
        self
    }

    /// Get the column name, defaulting to the measure name if not specified
    pub fn column_name(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.name)
    }
}

impl fmt::Debug for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Measure")
            .field("name", &self.name)
            .field("table", &self.table)
            .field("column", &self.column)
            .field("aggregation", &self.aggregation)
            .field("grain", &self.grain)
            .field("aggregate_with", &self.aggregate_with.is_some())
            .finish()
    }
}
