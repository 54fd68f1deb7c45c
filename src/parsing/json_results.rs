//! Streaming decoder for SPARQL Results JSON.
//!
//! Only two regions of the document are addressed: the `/results/bindings`
//! array and the `/boolean` member. The document is walked with a small
//! structural scanner over a buffered reader; each binding object is cut out as
//! a byte slice and handed to `serde_json`, so memory stays proportional to a
//! single row. Everything else (`head`, `link`, unknown members) is skipped
//! without being kept.

use std::fmt;
use std::io::{BufRead, BufReader, Read};

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use tracing::trace;

use super::{RawCell, RawRow, RawTerm, DEFAULT_CHUNK_SIZE};
use crate::error::{Result, SparqlError};

/// Position of the scanner inside the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Start,
    /// Inside the top-level object.
    Document { first: bool },
    /// Inside `/results`.
    Results { first: bool },
    /// Inside `/results/bindings`.
    Bindings { first: bool },
    End,
    Done,
}

pub struct JsonResults<R: Read> {
    reader: BufReader<R>,
    region: Region,
    saw_boolean: bool,
    saw_bindings: bool,
}

impl<R: Read> JsonResults<R> {
    pub fn new(body: R) -> Self {
        Self::with_chunk_size(body, DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(body: R, chunk_size: usize) -> Self {
        Self {
            reader: BufReader::with_capacity(chunk_size.max(1), body),
            region: Region::Start,
            saw_boolean: false,
            saw_bindings: false,
        }
    }

    fn advance(&mut self) -> Result<Option<RawRow>> {
        loop {
            match self.region {
                Region::Start => {
                    match self.skip_whitespace()? {
                        Some(b'{') => self.bump(),
                        None => {
                            self.region = Region::End;
                            continue;
                        }
                        Some(other) => return Err(unexpected(other, "'{'")),
                    }
                    self.region = Region::Document { first: true };
                }
                Region::Document { first } => {
                    if !self.enter_member(first)? {
                        self.region = Region::End;
                        continue;
                    }
                    self.region = Region::Document { first: false };
                    let key = self.read_key()?;
                    match key.as_str() {
                        "boolean" => {
                            if self.saw_bindings {
                                return Err(both_regions());
                            }
                            let bytes = self.read_value(true)?;
                            let answer: bool = serde_json::from_slice(&bytes)?;
                            self.saw_boolean = true;
                            return Ok(Some(RawRow::Boolean(answer)));
                        }
                        "results" if self.skip_whitespace()? == Some(b'{') => {
                            self.bump();
                            self.region = Region::Results { first: true };
                        }
                        _ => {
                            self.read_value(false)?;
                        }
                    }
                }
                Region::Results { first } => {
                    if !self.enter_member(first)? {
                        self.region = Region::Document { first: false };
                        continue;
                    }
                    self.region = Region::Results { first: false };
                    let key = self.read_key()?;
                    if key == "bindings" && self.skip_whitespace()? == Some(b'[') {
                        if self.saw_boolean {
                            return Err(both_regions());
                        }
                        self.bump();
                        self.saw_bindings = true;
                        self.region = Region::Bindings { first: true };
                    } else {
                        self.read_value(false)?;
                    }
                }
                Region::Bindings { first } => {
                    match self.skip_whitespace()? {
                        Some(b']') => {
                            self.bump();
                            self.region = Region::Results { first: false };
                            continue;
                        }
                        Some(b',') if !first => self.bump(),
                        Some(_) if first => {}
                        Some(other) => return Err(unexpected(other, "',' or ']'")),
                        None => return Err(truncated()),
                    }
                    self.region = Region::Bindings { first: false };
                    let bytes = self.read_value(true)?;
                    let binding: RawBinding = serde_json::from_slice(&bytes)?;
                    trace!(columns = binding.0.len(), "decoded JSON binding");
                    let row = binding.0.into_iter().map(|(k, t)| (k, RawCell::Term(t))).collect();
                    return Ok(Some(RawRow::Bindings(row)));
                }
                Region::End => {
                    self.region = Region::Done;
                    if !self.saw_boolean && !self.saw_bindings {
                        return Err(SparqlError::MalformedResponse(
                            "response contains neither /results/bindings nor /boolean".to_string(),
                        ));
                    }
                }
                Region::Done => return Ok(None),
            }
        }
    }

    /// Moves to the next member of an object. Returns `false` on its closing brace.
    fn enter_member(&mut self, first: bool) -> Result<bool> {
        match self.skip_whitespace()? {
            Some(b'}') => {
                self.bump();
                Ok(false)
            }
            Some(b',') if !first => {
                self.bump();
                Ok(true)
            }
            Some(b'"') if first => Ok(true),
            Some(other) => Err(unexpected(other, "object member")),
            None => Err(truncated()),
        }
    }

    fn read_key(&mut self) -> Result<String> {
        if self.skip_whitespace()? != Some(b'"') {
            return Err(SparqlError::ParseError("expected object key".to_string()));
        }
        let bytes = self.read_value(true)?;
        let key: String = serde_json::from_slice(&bytes)?;
        match self.skip_whitespace()? {
            Some(b':') => {
                self.bump();
                Ok(key)
            }
            Some(other) => Err(unexpected(other, "':'")),
            None => Err(truncated()),
        }
    }

    /// Reads one complete JSON value, returning its bytes when `keep` is set.
    fn read_value(&mut self, keep: bool) -> Result<Vec<u8>> {
        if self.skip_whitespace()?.is_none() {
            return Err(truncated());
        }
        let mut out = Vec::new();
        let mut consumed = 0usize;
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;
        loop {
            let Some(byte) = self.peek()? else {
                if depth == 0 && !in_string && consumed > 0 {
                    break;
                }
                return Err(truncated());
            };
            if in_string {
                self.take(byte, keep, &mut out, &mut consumed);
                if escaped {
                    escaped = false;
                } else if byte == b'\\' {
                    escaped = true;
                } else if byte == b'"' {
                    in_string = false;
                    if depth == 0 {
                        break;
                    }
                }
                continue;
            }
            match byte {
                b'"' => {
                    self.take(byte, keep, &mut out, &mut consumed);
                    in_string = true;
                }
                b'{' | b'[' => {
                    self.take(byte, keep, &mut out, &mut consumed);
                    depth += 1;
                }
                b'}' | b']' => {
                    if depth == 0 {
                        break;
                    }
                    self.take(byte, keep, &mut out, &mut consumed);
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                b',' if depth == 0 => break,
                b if depth == 0 && b.is_ascii_whitespace() => break,
                _ => self.take(byte, keep, &mut out, &mut consumed),
            }
        }
        if consumed == 0 {
            return Err(SparqlError::ParseError("expected a JSON value".to_string()));
        }
        Ok(out)
    }

    fn take(&mut self, byte: u8, keep: bool, out: &mut Vec<u8>, consumed: &mut usize) {
        self.bump();
        *consumed += 1;
        if keep {
            out.push(byte);
        }
    }

    fn peek(&mut self) -> Result<Option<u8>> {
        Ok(self.reader.fill_buf()?.first().copied())
    }

    fn bump(&mut self) {
        self.reader.consume(1);
    }

    fn skip_whitespace(&mut self) -> Result<Option<u8>> {
        loop {
            let buf = self.reader.fill_buf()?;
            if buf.is_empty() {
                return Ok(None);
            }
            let skipped = buf.iter().take_while(|b| b.is_ascii_whitespace()).count();
            if skipped < buf.len() {
                let next = buf[skipped];
                self.reader.consume(skipped);
                return Ok(Some(next));
            }
            let len = buf.len();
            self.reader.consume(len);
        }
    }
}

impl<R: Read> Iterator for JsonResults<R> {
    type Item = Result<RawRow>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.advance() {
            Ok(row) => row.map(Ok),
            Err(err) => {
                self.region = Region::Done;
                Some(Err(err))
            }
        }
    }
}

fn unexpected(byte: u8, expected: &str) -> SparqlError {
    SparqlError::ParseError(format!("unexpected '{}', expected {expected}", char::from(byte)))
}

fn both_regions() -> SparqlError {
    SparqlError::MalformedResponse(
        "response contains both /results/bindings and /boolean".to_string(),
    )
}

fn truncated() -> SparqlError {
    SparqlError::ParseError("unexpected end of JSON document".to_string())
}

/// A binding object with its members kept in document order.
struct RawBinding(Vec<(String, RawTerm)>);

impl<'de> Deserialize<'de> for RawBinding {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct BindingVisitor;

        impl<'de> Visitor<'de> for BindingVisitor {
            type Value = RawBinding;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a binding object")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<RawBinding, A::Error> {
                let mut columns = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, term)) = map.next_entry::<String, RawTerm>()? {
                    columns.push((name, term));
                }
                Ok(RawBinding(columns))
            }
        }

        deserializer.deserialize_map(BindingVisitor)
    }
}
