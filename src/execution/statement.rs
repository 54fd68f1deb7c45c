//! Result Cursor
//!
//! A [`Statement`] owns one decoder's lazy row sequence and turns raw rows into
//! typed [`Row`]s on demand. It can be driven explicitly through
//! [`Statement::advance`] / [`Statement::current`] / [`Statement::row_index`],
//! through [`Statement::fetch`], or as an [`Iterator`]. All three surfaces share
//! the same position.
//!
//! # Example
//!
//! ```rust
//! use janus_sparql::execution::{FetchMode, Statement};
//!
//! let body = r#"{"head":{"vars":["s"]},"results":{"bindings":[
//!     {"s":{"type":"uri","value":"http://example.org/a"}}
//! ]}}"#;
//! let mut statement = Statement::new(Some("application/sparql-results+json"), body.as_bytes());
//! let row = statement.fetch(FetchMode::Object).unwrap().unwrap().into_row().unwrap();
//! assert_eq!(row.get("s").unwrap().lexical(), "http://example.org/a");
//! assert!(statement.fetch(FetchMode::Object).unwrap().is_none());
//! ```

use std::io::Read;

use tracing::{debug, trace};

use super::fetch::{FetchMode, Fetched};
use crate::core::{Cell, Row, Value};
use crate::error::{Result, SparqlError};
use crate::parsing::{self, RawCell, RawRow, RawRows, RawTerm, RawValue, ResultFormat};

/// Forward-only cursor over one query response.
pub struct Statement {
    rows: RawRows,
    current: Option<Row>,
    row_number: Option<usize>,
    produced: usize,
    exhausted: bool,
}

impl Statement {
    /// Opens a cursor over `body`, picking the decoder from `content_type`.
    pub fn new<R: Read + 'static>(content_type: Option<&str>, body: R) -> Self {
        Self::with_chunk_size(content_type, body, parsing::DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size<R: Read + 'static>(
        content_type: Option<&str>,
        body: R,
        chunk_size: usize,
    ) -> Self {
        let format = ResultFormat::from_content_type(content_type);
        debug!(
            content_type = content_type.unwrap_or("<none>"),
            decoder = format.media_type(),
            chunk_size,
            "selected result decoder"
        );
        Self::from_rows(format.decode(body, chunk_size))
    }

    /// Wraps an already opened raw row sequence.
    pub fn from_rows(rows: RawRows) -> Self {
        Self { rows, current: None, row_number: None, produced: 0, exhausted: false }
    }

    /// Cursor holding a single ASK answer row.
    pub fn from_boolean(answer: bool) -> Self {
        Self::from_rows(Box::new(std::iter::once(Ok(RawRow::Boolean(answer)))))
    }

    /// Accept header listing the formats this cursor decodes, best first.
    pub fn accept_header() -> &'static str {
        parsing::accept_header()
    }

    /// Moves to the next row. Returns `false` once the response is exhausted.
    ///
    /// Exhaustion is terminal, and so is a decode failure: the failing call
    /// returns the error and every later call reports no more rows.
    pub fn advance(&mut self) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        let next = match self.rows.next() {
            Some(Ok(raw)) => make_row(raw),
            Some(Err(err)) => Err(err),
            None => {
                self.finish();
                return Ok(false);
            }
        };
        match next {
            Ok(row) => {
                trace!(row = self.produced, columns = row.len(), "advanced cursor");
                self.current = Some(row);
                self.row_number = Some(self.produced);
                self.produced += 1;
                Ok(true)
            }
            Err(err) => {
                self.finish();
                Err(err)
            }
        }
    }

    pub fn current(&self) -> Option<&Row> {
        self.current.as_ref()
    }

    /// 0-based position of the current row.
    pub fn row_index(&self) -> Option<usize> {
        self.row_number
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Advances once and projects the new row. `None` means no more rows.
    pub fn fetch(&mut self, mode: FetchMode) -> Result<Option<Fetched>> {
        if !self.advance()? {
            return Ok(None);
        }
        match self.current.clone() {
            Some(row) => Ok(Some(mode.project(row))),
            None => Ok(None),
        }
    }

    pub fn fetch_all(&mut self, mode: FetchMode) -> Result<Vec<Fetched>> {
        let mut all = Vec::new();
        while let Some(fetched) = self.fetch(mode)? {
            all.push(fetched);
        }
        Ok(all)
    }

    /// Value of the first column of the next row.
    ///
    /// The outer `None` means no more rows; the inner one a row with every
    /// variable unbound.
    pub fn fetch_column(&mut self) -> Result<Option<Option<Value>>> {
        Ok(self.fetch(FetchMode::Column)?.and_then(Fetched::into_column))
    }

    fn finish(&mut self) {
        self.exhausted = true;
        self.current = None;
        self.row_number = None;
    }
}

impl Iterator for Statement {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.advance() {
            Ok(true) => self.current.clone().map(Ok),
            Ok(false) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

impl std::fmt::Debug for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Statement")
            .field("current", &self.current)
            .field("row_number", &self.row_number)
            .field("exhausted", &self.exhausted)
            .finish_non_exhaustive()
    }
}

fn make_row(raw: RawRow) -> Result<Row> {
    match raw {
        RawRow::Boolean(answer) => Ok(Row::boolean(answer)),
        RawRow::Bindings(columns) => {
            let columns = columns
                .into_iter()
                .map(|(name, cell)| -> Result<(String, Value)> {
                    let value = match cell {
                        RawCell::Term(term) => Value::Term(make_cell(term)?),
                        RawCell::Text(text) => Value::Text(text),
                    };
                    Ok((name, value))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Row::new(columns))
        }
    }
}

/// Builds a [`Cell`] from a wire cell, recursing into triple components.
pub fn make_cell(raw: RawTerm) -> Result<Cell> {
    let RawTerm { kind, value, lang, datatype, subject, predicate, object } = raw;
    match kind.as_str() {
        "uri" => Ok(Cell::Uri(leaf_text(value, &kind)?)),
        "literal" | "typed-literal" => Cell::literal(leaf_text(value, &kind)?, lang, datatype),
        "bnode" => Ok(Cell::BlankNode(leaf_text(value, &kind)?)),
        "triple" => {
            let (subject, predicate, object) = match value {
                Some(RawValue::Triple { subject, predicate, object }) => {
                    (Some(subject), Some(predicate), Some(object))
                }
                _ => (subject, predicate, object),
            };
            Ok(Cell::triple(
                make_cell(*component(subject, "subject")?)?,
                make_cell(*component(predicate, "predicate")?)?,
                make_cell(*component(object, "object")?)?,
            ))
        }
        other => Err(SparqlError::Decode(format!("Unsupported return variable type {other}"))),
    }
}

fn leaf_text(value: Option<RawValue>, kind: &str) -> Result<String> {
    match value {
        Some(RawValue::Text(text)) => Ok(text),
        Some(RawValue::Triple { .. }) => {
            Err(SparqlError::Decode(format!("{kind} cell carries a triple value")))
        }
        None => Err(SparqlError::Decode(format!("{kind} cell without a value"))),
    }
}

fn component(term: Option<Box<RawTerm>>, field: &str) -> Result<Box<RawTerm>> {
    term.ok_or_else(|| SparqlError::Decode(format!("triple cell without a {field}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BOOLEAN_COLUMN;

    fn raw(kind: &str, value: &str) -> RawTerm {
        RawTerm {
            kind: kind.to_string(),
            value: Some(RawValue::Text(value.to_string())),
            ..RawTerm::default()
        }
    }

    #[test]
    fn test_make_cell_leaf_kinds() {
        assert_eq!(make_cell(raw("uri", "http://a")).unwrap(), Cell::uri("http://a"));
        assert_eq!(make_cell(raw("bnode", "b1")).unwrap(), Cell::blank_node("b1"));
        let typed = RawTerm {
            datatype: Some("http://www.w3.org/2001/XMLSchema#integer".to_string()),
            ..raw("typed-literal", "5")
        };
        assert_eq!(
            make_cell(typed).unwrap().datatype(),
            Some("http://www.w3.org/2001/XMLSchema#integer")
        );
    }

    #[test]
    fn test_make_cell_rejects_unknown_kind_and_missing_parts() {
        let err = make_cell(raw("variable", "x")).unwrap_err();
        assert_eq!(err.to_string(), "Decode error: Unsupported return variable type variable");

        let missing = RawTerm { kind: "uri".to_string(), ..RawTerm::default() };
        assert!(matches!(make_cell(missing), Err(SparqlError::Decode(_))));

        let half = RawTerm {
            kind: "triple".to_string(),
            subject: Some(Box::new(raw("uri", "http://s"))),
            ..RawTerm::default()
        };
        assert!(matches!(make_cell(half), Err(SparqlError::Decode(_))));
    }

    #[test]
    fn test_boolean_statement() {
        let mut statement = Statement::from_boolean(false);
        assert!(statement.advance().unwrap());
        assert_eq!(statement.row_index(), Some(0));
        let row = statement.current().unwrap();
        assert_eq!(row.get(BOOLEAN_COLUMN), Some(&Value::Boolean(false)));
        assert!(!statement.advance().unwrap());
        assert!(statement.current().is_none());
        assert!(statement.row_index().is_none());
    }

    #[test]
    fn test_decode_error_is_fatal() {
        let rows: RawRows = Box::new(
            vec![
                Ok(RawRow::Bindings(vec![("a".to_string(), RawCell::Term(raw("nope", "x")))])),
                Ok(RawRow::Boolean(true)),
            ]
            .into_iter(),
        );
        let mut statement = Statement::from_rows(rows);
        assert!(matches!(statement.advance(), Err(SparqlError::Decode(_))));
        assert!(statement.is_exhausted());
        assert!(!statement.advance().unwrap());
    }
}
