//! Query templates with positional and named parameter slots.
//!
//! Slots are discovered once, when the template is parsed. Rendering scans the
//! template again and substitutes the values bound at that moment, so a
//! template can be rendered any number of times with different bindings.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::trace;

use super::placeholder::{ParamKey, PlaceholderKind, PlaceholderScanner};
use crate::core::Cell;
use crate::error::{Result, SparqlError};

/// A value bound to a slot.
#[derive(Debug, Clone)]
pub enum Binding {
    /// Copied at bind time.
    Value(Cell),
    /// Shared handle, read at render time.
    Param(Rc<RefCell<Cell>>),
}

impl Binding {
    fn to_ntriples(&self) -> Result<String> {
        match self {
            Binding::Value(cell) => cell.to_ntriples(),
            Binding::Param(handle) => handle.borrow().to_ntriples(),
        }
    }
}

/// A batch of values applied before a prepared statement runs.
///
/// Positional entries are numbered in push order, named entries keep their name.
#[derive(Debug, Clone, Default)]
pub struct Params {
    entries: Vec<(ParamKey, Cell)>,
    next_position: usize,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, value: Cell) -> Self {
        self.entries.push((ParamKey::Position(self.next_position), value));
        self.next_position += 1;
        self
    }

    pub fn named(mut self, name: impl Into<String>, value: Cell) -> Self {
        self.entries.push((ParamKey::Name(name.into()), value));
        self
    }

    /// Adds an entry under an explicit key.
    pub fn insert(&mut self, key: impl Into<ParamKey>, value: Cell) {
        self.entries.push((key.into(), value));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(ParamKey, Cell)> {
        self.entries.iter()
    }
}

impl From<Vec<Cell>> for Params {
    fn from(values: Vec<Cell>) -> Self {
        values.into_iter().fold(Params::new(), Params::push)
    }
}

impl From<Vec<(ParamKey, Cell)>> for Params {
    fn from(entries: Vec<(ParamKey, Cell)>) -> Self {
        let mut params = Params::new();
        for (key, value) in entries {
            params.insert(key, value);
        }
        params
    }
}

impl From<HashMap<String, Cell>> for Params {
    fn from(values: HashMap<String, Cell>) -> Self {
        let mut params = Params::new();
        for (name, value) in values {
            params.insert(name, value);
        }
        params
    }
}

/// A parsed query template.
pub struct QueryTemplate {
    text: String,
    scanner: PlaceholderScanner,
    keys: Vec<ParamKey>,
    slots: HashMap<ParamKey, Option<Binding>>,
}

impl QueryTemplate {
    pub fn parse(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let scanner = PlaceholderScanner::new()?;
        let mut keys = Vec::new();
        let mut slots = HashMap::new();
        let mut position = 0;
        for placeholder in scanner.scan(&text) {
            let key = match placeholder.kind {
                PlaceholderKind::Named(name) => ParamKey::Name(name),
                PlaceholderKind::Positional => {
                    position += 1;
                    ParamKey::Position(position - 1)
                }
            };
            if !slots.contains_key(&key) {
                keys.push(key.clone());
                slots.insert(key, None);
            }
        }
        trace!(slots = keys.len(), "parsed query template");
        Ok(QueryTemplate { text, scanner, keys, slots })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Slot keys in order of first appearance.
    pub fn parameters(&self) -> &[ParamKey] {
        &self.keys
    }

    pub fn is_bound(&self, key: &ParamKey) -> bool {
        matches!(self.slots.get(key), Some(Some(_)))
    }

    pub fn bind_value(&mut self, key: impl Into<ParamKey>, value: Cell) -> Result<()> {
        self.bind(key.into(), Binding::Value(value))
    }

    pub fn bind_param(&mut self, key: impl Into<ParamKey>, handle: Rc<RefCell<Cell>>) -> Result<()> {
        self.bind(key.into(), Binding::Param(handle))
    }

    /// Binds every entry of `params`, stopping at the first unknown key.
    pub fn bind_all(&mut self, params: Params) -> Result<()> {
        for (key, value) in params.entries {
            self.bind(key, Binding::Value(value))?;
        }
        Ok(())
    }

    pub fn clear_bindings(&mut self) {
        for slot in self.slots.values_mut() {
            *slot = None;
        }
    }

    /// Substitutes the current bindings into the template.
    pub fn render(&self) -> Result<String> {
        let mut out = String::with_capacity(self.text.len());
        let mut copied = 0;
        let mut position = 0;
        for placeholder in self.scanner.scan(&self.text) {
            let key = match placeholder.kind {
                PlaceholderKind::Named(name) => ParamKey::Name(name),
                PlaceholderKind::Positional => {
                    position += 1;
                    ParamKey::Position(position - 1)
                }
            };
            let binding = match self.slots.get(&key) {
                Some(Some(binding)) => binding,
                _ => return Err(SparqlError::MissingParameterValue(key)),
            };
            out.push_str(&self.text[copied..placeholder.range.start]);
            out.push_str(&binding.to_ntriples()?);
            copied = placeholder.range.end;
        }
        out.push_str(&self.text[copied..]);
        Ok(out)
    }

    fn bind(&mut self, key: ParamKey, binding: Binding) -> Result<()> {
        match self.slots.get_mut(&key) {
            Some(slot) => {
                *slot = Some(binding);
                Ok(())
            }
            None => Err(SparqlError::UnknownParameter(key)),
        }
    }
}

impl std::fmt::Debug for QueryTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryTemplate")
            .field("text", &self.text)
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_numbering_skips_named() {
        let template = QueryTemplate::parse("? :a ? :a ?").unwrap();
        assert_eq!(
            template.parameters(),
            &[
                ParamKey::Position(0),
                ParamKey::Name("a".to_string()),
                ParamKey::Position(1),
                ParamKey::Position(2),
            ]
        );
    }

    #[test]
    fn test_render_substitutes_every_occurrence() {
        let mut template = QueryTemplate::parse("SELECT * WHERE { ?s :p ? . ?o :p \"x\" }").unwrap();
        template.bind_value("p", Cell::uri("http://example.org/p")).unwrap();
        template.bind_value(0, Cell::simple_literal("a\"b")).unwrap();
        assert_eq!(
            template.render().unwrap(),
            "SELECT * WHERE { ?s <http://example.org/p> \"a\\\"b\" . ?o <http://example.org/p> \"x\" }"
        );
    }

    #[test]
    fn test_escaped_placeholder_keeps_backslash() {
        let mut template = QueryTemplate::parse(r"\? ?").unwrap();
        template.bind_value(0, Cell::uri("http://a")).unwrap();
        assert_eq!(template.render().unwrap(), r"\? <http://a>");
    }

    #[test]
    fn test_invalid_value_is_rejected_at_render() {
        let mut template = QueryTemplate::parse("?").unwrap();
        template.bind_value(0, Cell::uri("not an iri")).unwrap();
        assert!(matches!(template.render(), Err(SparqlError::InvalidTerm(_))));
    }

    #[test]
    fn test_params_from_vec() {
        let params = Params::from(vec![Cell::uri("http://a"), Cell::uri("http://b")]);
        let keys: Vec<&ParamKey> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![&ParamKey::Position(0), &ParamKey::Position(1)]);
    }
}
