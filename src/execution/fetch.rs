//! Fetch modes: the shapes a cursor row can be projected into

use std::collections::HashMap;
use std::str::FromStr;

use crate::core::{Row, Value};
use crate::error::{Result, SparqlError};

/// How a fetched row is handed to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// The row itself, columns addressable by name.
    #[default]
    Object,
    /// Column name to value map.
    Assoc,
    /// Values only, in column order.
    Num,
    /// Values by position followed by values by name.
    Both,
    /// Value of the first column, `None` when the row binds nothing.
    Column,
}

impl FetchMode {
    pub fn name(&self) -> &'static str {
        match self {
            FetchMode::Object => "obj",
            FetchMode::Assoc => "assoc",
            FetchMode::Num => "num",
            FetchMode::Both => "both",
            FetchMode::Column => "column",
        }
    }

    pub fn project(self, row: Row) -> Fetched {
        match self {
            FetchMode::Object => Fetched::Object(row),
            FetchMode::Assoc => Fetched::Assoc(row.into_map()),
            FetchMode::Num => Fetched::Num(row.into_values()),
            FetchMode::Both => Fetched::Both(Combined::from(row)),
            FetchMode::Column => Fetched::Column(row.into_first()),
        }
    }
}

impl FromStr for FetchMode {
    type Err = SparqlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "obj" | "object" | "row" => Ok(FetchMode::Object),
            "assoc" | "map" => Ok(FetchMode::Assoc),
            "num" | "array" => Ok(FetchMode::Num),
            "both" => Ok(FetchMode::Both),
            "column" | "col" => Ok(FetchMode::Column),
            _ => Err(SparqlError::UnsupportedFetchMode(s.to_string())),
        }
    }
}

/// A projected row.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    Object(Row),
    Assoc(HashMap<String, Value>),
    Num(Vec<Value>),
    Both(Combined),
    Column(Option<Value>),
}

impl Fetched {
    pub fn into_row(self) -> Option<Row> {
        match self {
            Fetched::Object(row) => Some(row),
            _ => None,
        }
    }

    pub fn into_map(self) -> Option<HashMap<String, Value>> {
        match self {
            Fetched::Assoc(map) => Some(map),
            _ => None,
        }
    }

    pub fn into_values(self) -> Option<Vec<Value>> {
        match self {
            Fetched::Num(values) => Some(values),
            _ => None,
        }
    }

    pub fn into_combined(self) -> Option<Combined> {
        match self {
            Fetched::Both(combined) => Some(combined),
            _ => None,
        }
    }

    /// First-column value; `None` for other shapes and for unbound columns.
    pub fn into_value(self) -> Option<Value> {
        self.into_column().flatten()
    }

    pub fn into_column(self) -> Option<Option<Value>> {
        match self {
            Fetched::Column(value) => Some(value),
            _ => None,
        }
    }
}

/// Row addressable both by column position and by column name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Combined {
    values: Vec<Value>,
    named: HashMap<String, Value>,
}

impl Combined {
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.named.get(column)
    }

    /// Number of addressable entries: each column counts once per access style.
    pub fn len(&self) -> usize {
        self.values.len() + self.named.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Row> for Combined {
    fn from(row: Row) -> Self {
        let values = row.values().cloned().collect();
        Combined { values, named: row.into_map() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Cell;

    fn row() -> Row {
        Row::new(vec![
            ("a".to_string(), Value::Term(Cell::uri("http://a"))),
            ("b".to_string(), Value::Text("b".to_string())),
        ])
    }

    #[test]
    fn test_fetch_mode_names() {
        for mode in [FetchMode::Object, FetchMode::Assoc, FetchMode::Num, FetchMode::Both, FetchMode::Column] {
            assert_eq!(mode.name().parse::<FetchMode>().unwrap(), mode);
        }
        assert!(matches!(
            "lazy".parse::<FetchMode>(),
            Err(SparqlError::UnsupportedFetchMode(name)) if name == "lazy"
        ));
    }

    #[test]
    fn test_projections() {
        let values = FetchMode::Num.project(row()).into_values().unwrap();
        assert_eq!(values[1], Value::Text("b".to_string()));

        let both = FetchMode::Both.project(row()).into_combined().unwrap();
        assert_eq!(both.len(), 4);
        assert_eq!(both.get_index(0), both.get("a"));

        let first = FetchMode::Column.project(row()).into_value().unwrap();
        assert_eq!(first, Value::Term(Cell::uri("http://a")));

        let unbound = FetchMode::Column.project(Row::default());
        assert_eq!(unbound, Fetched::Column(None));
        assert_eq!(unbound.into_column(), Some(None));
    }
}
