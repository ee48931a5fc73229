//! Evaluation error types

use std::fmt;

/// Errors that can occur during metric evaluation
///
/// All of these are configuration mistakes, raised synchronously at the
/// point of detection and never caught internally. A metric evaluating to
/// null or zero is a valid result, not an error.
#[derive(Debug)]
pub enum EvalError {
    /// Requested or dependency-referenced metric not in the registry
    UnknownMetric(String),
    /// A simple metric references a measure absent from the registry
    UnknownMeasure(String),
    /// A context-transform metric references an unregistered transform
    UnknownTransform(String),
    /// A declared source table has no data in the dataset
    MissingTable(String),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::UnknownMetric(name) => write!(f, "Metric '{}' not found", name),
            EvalError::UnknownMeasure(name) => write!(f, "Measure '{}' not found", name),
            EvalError::UnknownTransform(name) => {
                write!(f, "Context transform '{}' not found", name)
            }
            EvalError::MissingTable(name) => {
                write!(f, "Table '{}' has no data in the dataset", name)
            }
        }
    }
}

impl std::error::Error for EvalError {}
