//! HTTP transport for SPARQL endpoints
//!
//! Provides:
//! - The `SimpleConnection` trait used by prepared statements
//! - A blocking `StandardConnection` posting form-encoded queries

pub mod connection;

pub use connection::{SimpleConnection, StandardConnection};
