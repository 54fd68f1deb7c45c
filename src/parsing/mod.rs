//! Streaming decoders for SPARQL query result documents.
//!
//! Every decoder turns a byte stream into a lazy, single-pass sequence of
//! [`RawRow`]s. Nothing here builds typed terms; that happens in the cursor.
//!
//! References:
//! - <https://www.w3.org/TR/sparql11-results-json/>
//! - <https://www.w3.org/TR/rdf-sparql-XMLres/>
//! - <https://www.w3.org/TR/sparql11-results-csv-tsv/>
//! - <https://w3c.github.io/rdf-star/cg-spec/editors_draft.html#query-result-formats>

use std::io::Read;

use serde::Deserialize;

use crate::error::Result;

pub mod delimited_results;
pub mod json_results;
pub mod xml_results;

pub use delimited_results::DelimitedResults;
pub use json_results::JsonResults;
pub use xml_results::XmlResults;

/// Read size for buffered decoders (1 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 1_048_576;

/// Lazy sequence of raw rows produced by a decoder.
pub type RawRows = Box<dyn Iterator<Item = Result<RawRow>>>;

/// A binding cell as it appears on the wire, before term construction.
///
/// The JSON decoder deserializes straight into this shape and the XML decoder
/// builds it element by element. `typed-literal` and the two RDF-star triple
/// layouts are accepted here and sorted out by the cursor.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawTerm {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub value: Option<RawValue>,
    #[serde(rename = "xml:lang", default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub datatype: Option<String>,
    #[serde(default)]
    pub subject: Option<Box<RawTerm>>,
    #[serde(default)]
    pub predicate: Option<Box<RawTerm>>,
    #[serde(default)]
    pub object: Option<Box<RawTerm>>,
}

/// `value` member of a JSON cell: plain text, or the triple object used by the
/// later RDF-star drafts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Text(String),
    Triple { subject: Box<RawTerm>, predicate: Box<RawTerm>, object: Box<RawTerm> },
}

impl RawTerm {
    pub fn text(&self) -> Option<&str> {
        match &self.value {
            Some(RawValue::Text(text)) => Some(text),
            _ => None,
        }
    }
}

/// One raw cell: a structured term, or an untyped string from CSV/TSV.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Term(RawTerm),
    Text(String),
}

/// One raw result record.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRow {
    Bindings(Vec<(String, RawCell)>),
    Boolean(bool),
}

/// SPARQL query result formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultFormat {
    Json,
    Xml,
    Csv,
    Tsv,
}

impl ResultFormat {
    /// Picks the decoder for a `Content-Type` header value.
    ///
    /// Parameters such as `charset` are ignored. Unknown, missing and wildcard
    /// types fall back to JSON.
    pub fn from_content_type(content_type: Option<&str>) -> ResultFormat {
        let media_type = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|mt| mt.trim().to_ascii_lowercase())
            .unwrap_or_default();
        match media_type.as_str() {
            "application/sparql-results+xml" | "application/xml" | "text/xml" => ResultFormat::Xml,
            "text/csv" => ResultFormat::Csv,
            "text/tab-separated-values" => ResultFormat::Tsv,
            _ => ResultFormat::Json,
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            ResultFormat::Json => "application/sparql-results+json",
            ResultFormat::Xml => "application/sparql-results+xml",
            ResultFormat::Csv => "text/csv",
            ResultFormat::Tsv => "text/tab-separated-values",
        }
    }

    /// Opens a lazy row sequence over `body`, reading at most `chunk_size`
    /// bytes at a time.
    pub fn decode<R: Read + 'static>(&self, body: R, chunk_size: usize) -> RawRows {
        match self {
            ResultFormat::Json => Box::new(JsonResults::with_chunk_size(body, chunk_size)),
            ResultFormat::Xml => Box::new(XmlResults::with_chunk_size(body, chunk_size)),
            ResultFormat::Csv => Box::new(DelimitedResults::with_chunk_size(body, b',', chunk_size)),
            ResultFormat::Tsv => {
                Box::new(DelimitedResults::with_chunk_size(body, b'\t', chunk_size))
            }
        }
    }
}

/// Accept header matching the decoders' preference order.
///
/// CSV/TSV come last as they drop term types, language tags and datatypes.
pub fn accept_header() -> &'static str {
    "application/sparql-results+json, \
     application/json;q=0.9, \
     application/sparql-results+xml;q=0.8, \
     application/xml;q=0.7, \
     text/xml;q=0.6, \
     text/csv;q=0.5, \
     text/tab-separated-values;q=0.4, \
     */*;q=0.1"
}
