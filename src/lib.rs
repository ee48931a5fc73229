//! metricore - Evaluate semantic metrics over in-memory row data
//!
//! This library provides:
//! - Dataset types (Value, Row, Table, Dataset) with YAML loading
//! - Semantic model definitions (Attribute, Measure, Metric, SemanticModel)
//! - Filter contexts with equality and range constraints
//! - Grain-aware row filtering
//! - Recursive, memoized metric evaluation with time intelligence
//! - Grouped query execution with formatted output
//!
//! # Architecture
//!
//! **Noun modules** (data structures):
//! - `dataset/` - row data (Value, Row, Table, Dataset)
//! - `context` - filter contexts (FilterContext, FilterSpec, RangeSpec)
//! - `semantic_model/` - queryable definitions (Attribute, Measure, Metric, SemanticModel)
//! - `query/` - query request types (QueryRequest)
//!
//! **Verb modules** (transformations):
//! - `filter` - value matching + grain-aware lazy row filtering
//! - `transform` - context rewrites for time intelligence (ytd, last_year, ...)
//! - `eval/` - measure resolution + recursive memoized metric evaluation
//! - `runner/` - request → grouped, formatted output rows
//! - `format` - numeric display formatting
//!
//! # Example
//!
//! ```ignore
//! use metricore::{run_query, Aggregation, Attribute, Dataset, Measure, Metric,
//!     QueryRequest, SemanticModel};
//!
//! let data = Dataset::from_file("sales.yaml")?;
//! let model = SemanticModel::builder()
//!     .attribute(Attribute::new("region", "sales").column("regionId"))
//!     .measure(Measure::new("amount", "sales", Aggregation::Sum))
//!     .metric(Metric::simple("revenue", "amount").format("currency"))
//!     .build()?;
//! let request = QueryRequest {
//!     attributes: vec!["region".into()],
//!     metrics: vec!["revenue".into()],
//!     ..Default::default()
//! };
//! let rows = run_query(&model, &data, &request)?;
//! ```

pub mod context;
pub mod dataset;
pub mod error;
pub mod eval;
pub mod filter;
pub mod format;
pub mod query;
pub mod runner;
pub mod semantic_model;
pub mod transform;

// Re-export commonly used types
pub use context::{canonical_key, context_from, FilterContext, FilterSpec, RangeSpec};
pub use dataset::{Dataset, Row, RowSeq, Table, Value};
pub use error::ParseError;
pub use eval::{evaluate_metric, evaluate_metric_cached, resolve_measure, EvalCache, EvalError};
pub use filter::{filter_rows, matches_filter};
pub use format::format_value;
pub use query::QueryRequest;
pub use runner::{run_query, QueryError};
pub use semantic_model::{
    Aggregation, Attribute, DisplayName, Measure, Metric, MetricKind, ModelError, SemanticModel,
    SemanticModelBuilder,
};
pub use transform::{
    compose, last_year, rolling_months, shift_month, shift_year, ytd, ContextTransformFn,
};
