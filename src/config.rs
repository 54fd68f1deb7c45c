//! Client configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SparqlError};
use crate::parsing;

/// Settings for a [`StandardConnection`](crate::http::StandardConnection).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// SPARQL query endpoint URL
    pub endpoint: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Bytes read from the response body at a time
    pub read_chunk_size: usize,
    /// Accept header sent with every query
    pub accept: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:7878/query".to_string(),
            timeout_secs: 30,
            read_chunk_size: parsing::DEFAULT_CHUNK_SIZE,
            accept: parsing::accept_header().to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into(), ..Self::default() }
    }

    /// Loads a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SparqlError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            SparqlError::ConfigError(format!("invalid config {}: {}", path.display(), e))
        })
    }
}
