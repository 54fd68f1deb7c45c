//! Decoded binding values (URIs, literals, blank nodes and embedded triples)

use std::fmt;

use oxigraph::model::vocab::{rdf, xsd};
use oxigraph::model::{BlankNode, Literal, NamedNode};

use crate::error::{Result, SparqlError};

/// A single decoded binding value.
///
/// `Triple` nests arbitrarily deep: each component is itself a `Cell`, which is
/// how RDF-star (quoted triple) results are represented.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Cell {
    Uri(String),
    Literal { value: String, lang: Option<String>, datatype: Option<String> },
    BlankNode(String),
    Triple { subject: Box<Cell>, predicate: Box<Cell>, object: Box<Cell> },
}

impl Cell {
    pub fn uri(iri: impl Into<String>) -> Self {
        Cell::Uri(iri.into())
    }

    pub fn blank_node(label: impl Into<String>) -> Self {
        Cell::BlankNode(label.into())
    }

    /// Plain literal without language tag or datatype.
    pub fn simple_literal(value: impl Into<String>) -> Self {
        Cell::Literal { value: value.into(), lang: None, datatype: None }
    }

    /// Builds a literal, normalizing empty strings to "absent".
    ///
    /// A language-tagged literal always carries `rdf:langString` as its datatype;
    /// any other datatype combined with a language tag is rejected.
    pub fn literal(
        value: impl Into<String>,
        lang: Option<String>,
        datatype: Option<String>,
    ) -> Result<Self> {
        let lang = lang.filter(|l| !l.is_empty());
        let datatype = datatype.filter(|d| !d.is_empty());
        let datatype = match (&lang, datatype) {
            (Some(_), None) => Some(rdf::LANG_STRING.as_str().to_string()),
            (Some(lang), Some(dt)) if dt != rdf::LANG_STRING.as_str() => {
                return Err(SparqlError::Decode(format!(
                    "literal has both language tag {lang} and datatype {dt}"
                )));
            }
            (_, dt) => dt,
        };
        Ok(Cell::Literal { value: value.into(), lang, datatype })
    }

    pub fn triple(subject: Cell, predicate: Cell, object: Cell) -> Self {
        Cell::Triple {
            subject: Box::new(subject),
            predicate: Box::new(predicate),
            object: Box::new(object),
        }
    }

    /// Lexical value of a URI, literal or blank node. Triples have none.
    pub fn value(&self) -> Option<&str> {
        match self {
            Cell::Uri(v) | Cell::BlankNode(v) => Some(v),
            Cell::Literal { value, .. } => Some(value),
            Cell::Triple { .. } => None,
        }
    }

    pub fn lang(&self) -> Option<&str> {
        match self {
            Cell::Literal { lang, .. } => lang.as_deref(),
            _ => None,
        }
    }

    /// Effective datatype of a literal (`xsd:string` when none was given).
    pub fn datatype(&self) -> Option<&str> {
        match self {
            Cell::Literal { datatype, .. } => {
                Some(datatype.as_deref().unwrap_or(xsd::STRING.as_str()))
            }
            _ => None,
        }
    }

    pub fn subject(&self) -> Option<&Cell> {
        match self {
            Cell::Triple { subject, .. } => Some(subject),
            _ => None,
        }
    }

    pub fn predicate(&self) -> Option<&Cell> {
        match self {
            Cell::Triple { predicate, .. } => Some(predicate),
            _ => None,
        }
    }

    pub fn object(&self) -> Option<&Cell> {
        match self {
            Cell::Triple { object, .. } => Some(object),
            _ => None,
        }
    }

    pub fn is_triple(&self) -> bool {
        matches!(self, Cell::Triple { .. })
    }

    /// Serializes the cell in N-Triples syntax, validating IRIs, language tags
    /// and blank node labels on the way.
    ///
    /// Embedded triples use the `<< s p o >>` quoted triple syntax.
    pub fn to_ntriples(&self) -> Result<String> {
        match self {
            Cell::Uri(iri) => Ok(NamedNode::new(iri.as_str())?.to_string()),
            Cell::BlankNode(label) => Ok(BlankNode::new(strip_bnode_prefix(label))?.to_string()),
            Cell::Literal { value, lang: Some(lang), .. } => {
                Ok(Literal::new_language_tagged_literal(value.as_str(), lang.as_str())?.to_string())
            }
            Cell::Literal { value, lang: None, datatype: Some(dt) } => {
                let datatype = NamedNode::new(dt.as_str())?;
                Ok(Literal::new_typed_literal(value.as_str(), datatype).to_string())
            }
            Cell::Literal { value, lang: None, datatype: None } => {
                Ok(Literal::new_simple_literal(value.as_str()).to_string())
            }
            Cell::Triple { subject, predicate, object } => Ok(format!(
                "<< {} {} {} >>",
                subject.to_ntriples()?,
                predicate.to_ntriples()?,
                object.to_ntriples()?
            )),
        }
    }
}

/// Some endpoints report blank node labels with the `_:` prefix included.
fn strip_bnode_prefix(label: &str) -> &str {
    label.strip_prefix("_:").unwrap_or(label)
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Uri(iri) => write!(f, "{}", NamedNode::new_unchecked(iri.as_str())),
            Cell::BlankNode(label) => {
                write!(f, "{}", BlankNode::new_unchecked(strip_bnode_prefix(label)))
            }
            Cell::Literal { value, lang: Some(lang), .. } => write!(
                f,
                "{}",
                Literal::new_language_tagged_literal_unchecked(value.as_str(), lang.as_str())
            ),
            Cell::Literal { value, lang: None, datatype: Some(dt) } => write!(
                f,
                "{}",
                Literal::new_typed_literal(value.as_str(), NamedNode::new_unchecked(dt.as_str()))
            ),
            Cell::Literal { value, lang: None, datatype: None } => {
                write!(f, "{}", Literal::new_simple_literal(value.as_str()))
            }
            Cell::Triple { subject, predicate, object } => {
                write!(f, "<< {subject} {predicate} {object} >>")
            }
        }
    }
}
