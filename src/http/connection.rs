//! SPARQL endpoint connections.
//!
//! [`SimpleConnection`] is the seam between prepared statements and the
//! transport. [`StandardConnection`] sends the query as the `query` field of a
//! form-encoded POST, which most SPARQL stores accept, and hands the response
//! body to the cursor without reading it first.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{Result, SparqlError};
use crate::execution::{FetchMode, Statement};
use crate::querying::PreparedStatement;

pub trait SimpleConnection {
    /// Runs a row-returning query.
    fn query(&self, query: &str) -> Result<Statement>;

    /// Runs an ASK query. The response must carry the boolean row and nothing else.
    fn ask_query(&self, query: &str) -> Result<bool> {
        let mut statement = self.query(query)?;
        let answer = statement
            .fetch(FetchMode::Object)?
            .and_then(|fetched| fetched.into_row())
            .and_then(|row| row.as_boolean())
            .ok_or_else(not_an_ask_response)?;
        if statement.advance()? {
            return Err(not_an_ask_response());
        }
        Ok(answer)
    }

    fn prepare(&self, query: &str) -> Result<PreparedStatement<'_, Self>>
    where
        Self: Sized,
    {
        PreparedStatement::new(self, query, false)
    }

    fn prepare_ask(&self, query: &str) -> Result<PreparedStatement<'_, Self>>
    where
        Self: Sized,
    {
        PreparedStatement::new(self, query, true)
    }
}

/// Connection to an endpoint over blocking HTTP.
pub struct StandardConnection {
    config: ClientConfig,
    client: Client,
}

impl StandardConnection {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::new(endpoint))
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SparqlError::HttpError(e.to_string()))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn open_statement(&self, response: Response) -> Result<Statement> {
        let status = response.status();
        if !status.is_success() {
            return Err(SparqlError::Protocol {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }
        let content_type =
            response.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()).map(str::to_string);
        debug!(
            status = status.as_u16(),
            content_type = content_type.as_deref().unwrap_or("<none>"),
            "received query response"
        );
        Ok(Statement::with_chunk_size(content_type.as_deref(), response, self.config.read_chunk_size))
    }
}

impl SimpleConnection for StandardConnection {
    fn query(&self, query: &str) -> Result<Statement> {
        debug!(endpoint = %self.config.endpoint, bytes = query.len(), "sending query");
        let response = self
            .client
            .post(&self.config.endpoint)
            .header(ACCEPT, self.config.accept.as_str())
            .form(&[("query", query)])
            .send()?;
        self.open_statement(response)
    }
}

fn not_an_ask_response() -> SparqlError {
    SparqlError::MalformedResponse("Not an ASK query response".to_string())
}
