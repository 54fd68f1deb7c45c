//! Result rows: ordered column name to value mappings

use std::collections::HashMap;
use std::fmt;

use super::term::Cell;

/// Name of the synthetic column holding an ASK answer.
pub const BOOLEAN_COLUMN: &str = "boolean";

/// One value of a result row.
///
/// JSON and XML results decode to `Term`. CSV/TSV results carry no type
/// information and decode to `Text`. `Boolean` only appears in the synthetic
/// row of an ASK result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Term(Cell),
    Text(String),
    Boolean(bool),
}

impl Value {
    pub fn as_cell(&self) -> Option<&Cell> {
        match self {
            Value::Term(cell) => Some(cell),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Lexical form, comparable across typed and untyped results.
    pub fn lexical(&self) -> String {
        match self {
            Value::Term(cell) => cell.value().map_or_else(|| cell.to_string(), str::to_string),
            Value::Text(text) => text.clone(),
            Value::Boolean(b) => b.to_string(),
        }
    }
}

impl From<Cell> for Value {
    fn from(cell: Cell) -> Self {
        Value::Term(cell)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Term(cell) => write!(f, "{cell}"),
            Value::Text(text) => write!(f, "{text}"),
            Value::Boolean(b) => write!(f, "{b}"),
        }
    }
}

/// A decoded result record. Column order follows the source document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new(columns: Vec<(String, Value)>) -> Self {
        Self { columns }
    }

    /// The single-column row produced for an ASK answer.
    pub fn boolean(answer: bool) -> Self {
        Self { columns: vec![(BOOLEAN_COLUMN.to_string(), Value::Boolean(answer))] }
    }

    /// The ASK answer, if this is the synthetic boolean row.
    pub fn as_boolean(&self) -> Option<bool> {
        match self.columns.as_slice() {
            [(_, Value::Boolean(b))] => Some(*b),
            _ => None,
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.iter().find(|(name, _)| name == column).map(|(_, v)| v)
    }

    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.columns.get(index).map(|(_, v)| v)
    }

    pub fn first(&self) -> Option<&Value> {
        self.get_index(0)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.columns.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, v)| (name.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn into_map(self) -> HashMap<String, Value> {
        self.columns.into_iter().collect()
    }

    pub fn into_values(self) -> Vec<Value> {
        self.columns.into_iter().map(|(_, v)| v).collect()
    }

    pub fn into_first(self) -> Option<Value> {
        self.columns.into_iter().next().map(|(_, v)| v)
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.into_iter()
    }
}
