//! Error types for SPARQL client operations

use thiserror::Error;

use crate::querying::ParamKey;

/// Result type alias for SPARQL client operations
pub type Result<T> = std::result::Result<T, SparqlError>;

/// Main error type for SPARQL client operations
#[derive(Error, Debug)]
pub enum SparqlError {
    /// The endpoint answered with a non-success HTTP status
    #[error("Query execution failed with HTTP {status} {reason}")]
    Protocol { status: u16, reason: String },

    /// The response shape does not match the query kind
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A result cell could not be turned into a term
    #[error("Decode error: {0}")]
    Decode(String),

    /// A binding call named a parameter the template does not contain
    #[error("Unknown parameter {0}")]
    UnknownParameter(ParamKey),

    /// A placeholder had no bound value at execution time
    #[error("Parameter {0} value missing")]
    MissingParameterValue(ParamKey),

    /// Fetch mode name or code not recognised
    #[error("Unsupported fetch mode: {0}")]
    UnsupportedFetchMode(String),

    /// A prepared statement was read before it was executed
    #[error("Statement has not been executed")]
    NotExecuted,

    /// The payload is not valid JSON, XML or delimited text
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A bound value cannot be serialized into the query
    #[error("Invalid term: {0}")]
    InvalidTerm(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Placeholder grammar failed to compile
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl From<std::io::Error> for SparqlError {
    fn from(err: std::io::Error) -> Self {
        SparqlError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for SparqlError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            SparqlError::IoError(err.to_string())
        } else {
            SparqlError::ParseError(err.to_string())
        }
    }
}

impl From<quick_xml::Error> for SparqlError {
    fn from(err: quick_xml::Error) -> Self {
        match err {
            quick_xml::Error::Io(io) => SparqlError::IoError(io.to_string()),
            other => SparqlError::ParseError(other.to_string()),
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for SparqlError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        SparqlError::ParseError(err.to_string())
    }
}

impl From<csv::Error> for SparqlError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            SparqlError::IoError(err.to_string())
        } else {
            SparqlError::ParseError(err.to_string())
        }
    }
}

impl From<reqwest::Error> for SparqlError {
    fn from(err: reqwest::Error) -> Self {
        SparqlError::HttpError(err.to_string())
    }
}

impl From<oxigraph::model::IriParseError> for SparqlError {
    fn from(err: oxigraph::model::IriParseError) -> Self {
        SparqlError::InvalidTerm(err.to_string())
    }
}

impl From<oxigraph::model::LanguageTagParseError> for SparqlError {
    fn from(err: oxigraph::model::LanguageTagParseError) -> Self {
        SparqlError::InvalidTerm(err.to_string())
    }
}

impl From<oxigraph::model::BlankNodeIdParseError> for SparqlError {
    fn from(err: oxigraph::model::BlankNodeIdParseError) -> Self {
        SparqlError::InvalidTerm(err.to_string())
    }
}
