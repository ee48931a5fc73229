//! Metric evaluation (verb module)
//!
//! Resolves measures and recursively evaluates metrics under a filter
//! context, memoizing per top-level call.

mod error;
mod evaluate;

pub use error::EvalError;
pub use evaluate::{evaluate_metric, evaluate_metric_cached, resolve_measure, EvalCache};
