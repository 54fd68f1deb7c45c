//! Query Result Execution Module
//!
//! Turns a decoded response into typed rows and hands them to callers.
//!
//! # Components
//!
//! - **Statement** - Forward-only cursor over one response
//! - **FetchMode** / **Fetched** - Shapes a row can be projected into
//!
//! # Example
//!
//! ```rust
//! use janus_sparql::execution::{FetchMode, Statement};
//!
//! let mut statement = Statement::new(Some("text/csv"), "a,b\n1,2\n".as_bytes());
//! let rows = statement.fetch_all(FetchMode::Num).unwrap();
//! assert_eq!(rows.len(), 1);
//! ```

pub mod fetch;
pub mod statement;

pub use fetch::{Combined, FetchMode, Fetched};
pub use statement::{make_cell, Statement};
