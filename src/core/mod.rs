//! Core data structures: decoded terms and result rows

pub mod row;
pub mod term;

pub use row::{Row, Value, BOOLEAN_COLUMN};
pub use term::Cell;
