//! Attribute types - slicing dimensions

use std::fmt;
use std::sync::Arc;

use crate::dataset::{Row, Value};

/// Derivation function: compute an attribute's output value from a raw row
pub type DeriveFn = Arc<dyn Fn(&Row) -> Value + Send + Sync>;

/// Format function: render an attribute's raw value for display
pub type FormatFn = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// An attribute - a named, slice-able dimension backed by a table column
///
/// Query results group by the attribute's raw column values; the output value
/// can be reshaped by a derivation or format function.
#[derive(Clone)]
pub struct Attribute {
    pub name: String,
    pub table: String,
    /// Backing column; defaults to the attribute name
    pub column: Option<String>,
    pub label: Option<String>,
    /// Human-readable description for UIs
    pub description: Option<String>,
    /// Optional derivation expression, applied to the whole row
    pub derive: Option<DeriveFn>,
    /// Optional display formatting for the raw value
    pub format: Option<FormatFn>,
    /// Optional display-name relationship to a related table
    pub display: Option<DisplayName>,
}

/// Explicit display-name relationship metadata
///
/// Declares where an attribute's human-readable label lives: the related
/// table, the column matched against the attribute's raw value, and the
/// column holding the label. Resolution is best-effort; a missing table or
/// unmatched key silently omits the output field.
#[derive(Debug, Clone)]
pub struct DisplayName {
    /// Output field name the label is emitted under (e.g. "regionName")
    pub field: String,
    /// Related table holding the labels
    pub table: String,
    /// Column in the related table matched against the raw attribute value
    pub key_column: String,
    /// Column in the related table providing the label
    pub label_column: String,
}

impl DisplayName {
    pub fn new<F, T, K, L>(field: F, table: T, key_column: K, label_column: L) -> Self
    where
        F: Into<String>,
        T: Into<String>,
        K: Into<String>,
        L: Into<String>,
    {
        DisplayName {
            field: field.into(),
            table: table.into(),
            key_column: key_column.into(),
            label_column: label_column.into(),
        }
    }
}

impl Attribute {
    /// Create an attribute backed by the column of the same name
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Attribute {
            name: name.into(),
            table: table.into(),
            column: None,
            label: None,
            description: None,
            derive: None,
            format: None,
            display: None,
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

    /// Set a derivation expression computing the output value from the row
    pub fn derive<F>(mut self, f: F) -> Self
    where
        F: Fn(&Row) -> Value + Send + Sync + 'static,
    {
        self.derive = Some(Arc::new(f));
        self
    }

    /// Set a format function for the raw value
    pub fn format_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        self.format = Some(Arc::new(f));
        self
    }

    /// Declare a display-name relationship
    pub fn display(mut self, display: DisplayName) -> Self {
        self.display = Some(display);
        self
    }

    /// Get the column name, defaulting to the attribute name if not specified
    pub fn column_name(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.name)
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("table", &self.table)
            .field("column", &self.column)
            .field("label", &self.label)
            .field("derive", &self.derive.is_some())
            .field("format", &self.format.is_some())
            .field("display", &self.display)
            .finish()
    }
}
