//! Prepared statements: a parsed template bound to a connection.
//!
//! # Example
//!
//! ```ignore
//! use janus_sparql::core::Cell;
//! use janus_sparql::execution::FetchMode;
//! use janus_sparql::http::{SimpleConnection, StandardConnection};
//! use janus_sparql::querying::Params;
//!
//! let connection = StandardConnection::new("http://localhost:7878/query")?;
//! let mut statement = connection.prepare("SELECT ?o WHERE { ? :p ?o }")?;
//! statement.execute(
//!     Params::new()
//!         .push(Cell::uri("http://example.org/s"))
//!         .named("p", Cell::uri("http://example.org/p")),
//! )?;
//! while let Some(row) = statement.fetch(FetchMode::Object)? {
//!     println!("{:?}", row);
//! }
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use super::placeholder::ParamKey;
use super::template::{Params, QueryTemplate};
use crate::core::{Cell, Row, Value};
use crate::error::{Result, SparqlError};
use crate::execution::{FetchMode, Fetched, Statement};
use crate::http::SimpleConnection;

pub struct PreparedStatement<'c, C: SimpleConnection + ?Sized> {
    connection: &'c C,
    template: QueryTemplate,
    ask: bool,
    statement: Option<Statement>,
}

impl<'c, C: SimpleConnection + ?Sized> PreparedStatement<'c, C> {
    /// Parses `query` for placeholders. `ask` selects the boolean query path.
    pub fn new(connection: &'c C, query: &str, ask: bool) -> Result<Self> {
        Ok(Self { connection, template: QueryTemplate::parse(query)?, ask, statement: None })
    }

    pub fn is_ask(&self) -> bool {
        self.ask
    }

    pub fn parameters(&self) -> &[ParamKey] {
        self.template.parameters()
    }

    pub fn bind_value(&mut self, key: impl Into<ParamKey>, value: Cell) -> Result<()> {
        self.template.bind_value(key, value)
    }

    pub fn bind_param(&mut self, key: impl Into<ParamKey>, handle: Rc<RefCell<Cell>>) -> Result<()> {
        self.template.bind_param(key, handle)
    }

    pub fn clear_bindings(&mut self) {
        self.template.clear_bindings();
    }

    /// The query text with the current bindings substituted.
    pub fn query(&self) -> Result<String> {
        self.template.render()
    }

    /// Binds `params`, renders the query and runs it, replacing any previous result.
    pub fn execute(&mut self, params: impl Into<Params>) -> Result<()> {
        self.template.bind_all(params.into())?;
        let query = self.template.render()?;
        debug!(ask = self.ask, "executing prepared statement");
        let statement = if self.ask {
            Statement::from_boolean(self.connection.ask_query(&query)?)
        } else {
            self.connection.query(&query)?
        };
        self.statement = Some(statement);
        Ok(())
    }

    pub fn fetch(&mut self, mode: FetchMode) -> Result<Option<Fetched>> {
        self.statement_mut()?.fetch(mode)
    }

    pub fn fetch_all(&mut self, mode: FetchMode) -> Result<Vec<Fetched>> {
        self.statement_mut()?.fetch_all(mode)
    }

    pub fn fetch_column(&mut self) -> Result<Option<Option<Value>>> {
        self.statement_mut()?.fetch_column()
    }

    pub fn advance(&mut self) -> Result<bool> {
        self.statement_mut()?.advance()
    }

    pub fn current(&self) -> Option<&Row> {
        self.statement.as_ref().and_then(Statement::current)
    }

    pub fn row_index(&self) -> Option<usize> {
        self.statement.as_ref().and_then(Statement::row_index)
    }

    /// Cursor of the last execution.
    pub fn statement_mut(&mut self) -> Result<&mut Statement> {
        self.statement.as_mut().ok_or(SparqlError::NotExecuted)
    }

    pub fn into_statement(self) -> Result<Statement> {
        self.statement.ok_or(SparqlError::NotExecuted)
    }
}
