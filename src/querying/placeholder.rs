//! Placeholder grammar for query templates.
//!
//! Two placeholder forms are recognised:
//!
//! - positional `?`, not preceded by `\` and not followed by a SPARQL
//!   variable-name character (so `?var` is left alone);
//! - named `:name`, where `name` is one or more ASCII letters or digits, not
//!   preceded by `\`.
//!
//! An escaped placeholder keeps its backslash in the rendered query.
//!
//! The character after `?` is only looked at, never consumed, so adjacent
//! placeholders stay separate: `??` is two positional slots, not one.

use std::fmt;
use std::ops::Range;

use regex::Regex;

use crate::error::Result;

/// Characters that may continue a SPARQL variable name (`PN_CHARS_U` plus digits).
const VARIABLE_CHAR: &str = r"^[a-zA-Z0-9_\x{00C0}-\x{00D6}\x{00D8}-\x{00F6}\x{00F8}-\x{02FF}\x{0370}-\x{037D}\x{037F}-\x{1FFF}\x{200C}-\x{200D}\x{2070}-\x{218F}\x{2C00}-\x{2FEF}\x{3001}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFFD}\x{10000}-\x{EFFFF}]";

/// Key of a parameter slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParamKey {
    Position(usize),
    Name(String),
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKey::Position(n) => write!(f, "{n}"),
            ParamKey::Name(name) => write!(f, "{name}"),
        }
    }
}

impl From<usize> for ParamKey {
    fn from(position: usize) -> Self {
        ParamKey::Position(position)
    }
}

impl From<&str> for ParamKey {
    fn from(name: &str) -> Self {
        ParamKey::Name(name.to_string())
    }
}

impl From<String> for ParamKey {
    fn from(name: String) -> Self {
        ParamKey::Name(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderKind {
    Positional,
    Named(String),
}

/// One placeholder occurrence: its byte range in the template and its form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub range: Range<usize>,
    pub kind: PlaceholderKind,
}

pub struct PlaceholderScanner {
    candidate_regex: Regex,
    variable_char_regex: Regex,
}

impl PlaceholderScanner {
    pub fn new() -> Result<Self> {
        Ok(PlaceholderScanner {
            candidate_regex: Regex::new(r":([a-zA-Z0-9]+)|\?")?,
            variable_char_regex: Regex::new(VARIABLE_CHAR)?,
        })
    }

    /// Lists placeholder occurrences in template order.
    pub fn scan(&self, template: &str) -> Vec<Placeholder> {
        let mut found = Vec::new();
        for captures in self.candidate_regex.captures_iter(template) {
            let Some(whole) = captures.get(0) else { continue };
            if template[..whole.start()].ends_with('\\') {
                continue;
            }
            let kind = match captures.get(1) {
                Some(name) => PlaceholderKind::Named(name.as_str().to_string()),
                None if self.variable_char_regex.is_match(&template[whole.end()..]) => continue,
                None => PlaceholderKind::Positional,
            };
            found.push(Placeholder { range: whole.range(), kind });
        }
        found
    }
}
