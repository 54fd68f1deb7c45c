//! Query preparation: placeholder discovery, binding and substitution.

pub mod placeholder;
pub mod prepared_statement;
pub mod template;

pub use placeholder::{ParamKey, Placeholder, PlaceholderKind, PlaceholderScanner};
pub use prepared_statement::PreparedStatement;
pub use template::{Binding, Params, QueryTemplate};
