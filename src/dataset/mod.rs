//! In-memory row data (nouns)
//!
//! Rows, tables, and datasets. Pure storage with YAML loading; all
//! computation lives in the verb modules.

mod table;
mod value;

pub use table::{Dataset, Row, RowSeq, Table};
pub use value::Value;
