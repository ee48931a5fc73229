//! Tables and datasets
//!
//! Pure storage: a dataset is a named collection of tables, each a declared
//! column list plus ordered rows. The same table may back multiple attributes
//! and measures at once.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use super::value::Value;
use crate::error::ParseError;

/// A row: an open-ended mapping from field name to scalar value.
/// No schema is enforced at runtime; missing fields read as null.
pub type Row = BTreeMap<String, Value>;

/// A lazy sequence of borrowed rows, the shape custom expression and
/// aggregation functions receive. Nothing is evaluated until consumed.
pub type RowSeq<'a> = Box<dyn Iterator<Item = &'a Row> + 'a>;

/// A named table: declared columns plus ordered rows
///
/// The declared column list is the schema of record. It is the default grain
/// for every measure and metric backed by this table, so filters on fields
/// outside it are ignored for those computations.
#[derive(Debug, Clone, Deserialize)]
pub struct Table {
    pub name: String,
    /// Declared columns; the default grain for computations over this table
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl Table {
    /// Create a table from declared columns and rows
    pub fn new<N, C, S>(name: N, columns: C, rows: Vec<Row>) -> Self
    where
        N: Into<String>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Table {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows,
        }
    }
}

/// An in-memory dataset: the named tables a semantic model evaluates over
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Dataset {
    pub tables: Vec<Table>,
}

impl Dataset {
    /// Create an empty dataset
    pub fn new() -> Self {
        Dataset::default()
    }

    /// Load a dataset from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ParseError> {
        let path_str = path.as_ref().display().to_string();
        let contents = std::fs::read_to_string(&path).map_err(|e| ParseError::Io {
            path: path_str,
            source: e,
        })?;
        Self::parse_str(&contents)
    }

    /// Parse a dataset from a YAML string
    pub fn parse_str(yaml: &str) -> Result<Self, ParseError> {
        serde_yaml::from_str(yaml).map_err(ParseError::from)
    }

    /// Get a table by name
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Add a table, returning self for chaining
    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    /// All table names in declaration order
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dataset() {
        let yaml = r#"
tables:
  - name: sales
    columns: [year, month, amount]
    rows:
      - { year: 2025, month: 1, amount: 1000 }
      - { year: 2025, month: 2, amount: 950 }
"#;
        let data = Dataset::parse_str(yaml).unwrap();
        assert_eq!(data.tables.len(), 1);
        let sales = data.get_table("sales").unwrap();
        assert_eq!(sales.columns, vec!["year", "month", "amount"]);
        assert_eq!(sales.rows.len(), 2);
        assert_eq!(sales.rows[0].get("amount"), Some(&Value::Number(1000.0)));
    }

    #[test]
    fn test_parse_empty_rows() {
        let yaml = r#"
tables:
  - name: budget
    columns: [year, amount]
"#;
        let data = Dataset::parse_str(yaml).unwrap();
        assert!(data.get_table("budget").unwrap().rows.is_empty());
    }

    #[test]
    fn test_parse_invalid_yaml() {
        assert!(Dataset::parse_str("tables: [name: [").is_err());
    }

    #[test]
    fn test_get_table_missing() {
        let data = Dataset::new();
        assert!(data.get_table("nope").is_none());
    }
}
