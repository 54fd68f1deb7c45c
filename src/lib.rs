//! # Janus SPARQL
//!
//! A streaming client for SPARQL endpoints, built for the Janus engine.
//!
//! Query responses are decoded incrementally: rows are produced while the
//! response body is still being read, so memory stays proportional to a
//! single row whatever the result size.
//!
//! ## Features
//!
//! - SPARQL Results JSON, XML, CSV and TSV, picked by content type
//! - RDF-star results (quoted triples nested to any depth)
//! - Forward-only cursors with several fetch modes
//! - Prepared statements with positional `?` and named `:name` placeholders
//!
//! ## Example
//!
//! ```rust
//! use janus_sparql::execution::{FetchMode, Statement};
//! use janus_sparql::Result;
//!
//! fn example() -> Result<()> {
//!     let body = r#"{"head":{},"boolean":true}"#;
//!     let mut statement = Statement::new(Some("application/sparql-results+json"), body.as_bytes());
//!     let answer = statement.fetch_column()?;
//!     assert_eq!(answer.flatten().and_then(|v| v.as_bool()), Some(true));
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::new_without_default)]

/// Decoded values and rows
pub mod core;

/// Client configuration
pub mod config;

/// Error types and result definitions
pub mod error;

/// Result cursors and fetch modes
pub mod execution;

/// Endpoint connections
pub mod http;

/// Streaming result decoders
pub mod parsing;

/// Query templates and prepared statements
pub mod querying;

pub use crate::config::ClientConfig;
pub use crate::core::{Cell, Row, Value};
pub use crate::error::{Result, SparqlError};
pub use crate::execution::{FetchMode, Fetched, Statement};
pub use crate::http::{SimpleConnection, StandardConnection};
pub use crate::querying::{ParamKey, Params, PreparedStatement};
