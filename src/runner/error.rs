//! Query runner error types

use std::fmt;

use crate::eval::EvalError;

/// Errors that can occur while running a grouped query
#[derive(Debug)]
pub enum QueryError {
    /// The request named no attributes to group by
    NoAttributes,
    /// A requested attribute is absent from the registry
    UnknownAttribute(String),
    /// Requested attributes span more than one table; grouping is
    /// single-table by design
    MixedAttributeTables {
        expected: String,
        attribute: String,
        table: String,
    },
    /// A metric failed to evaluate
    Eval(EvalError),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::NoAttributes => {
                write!(f, "Query requested no attributes to group by")
            }
            QueryError::UnknownAttribute(name) => {
                write!(f, "Attribute '{}' not found", name)
            }
            QueryError::MixedAttributeTables {
                expected,
                attribute,
                table,
            } => {
                write!(
                    f,
                    "Attribute '{}' lives on table '{}' but the query groups over table '{}'; all requested attributes must share one table",
                    attribute, table, expected
                )
            }
            QueryError::Eval(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QueryError::Eval(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EvalError> for QueryError {
    fn from(err: EvalError) -> Self {
        QueryError::Eval(err)
    }
}
