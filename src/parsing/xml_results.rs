//! Streaming decoder for SPARQL Results XML, including RDF-star `<triple>` cells.
//!
//! The body is pulled through a bounded buffer and processed as a stream of
//! start/end/text events. Completed rows are queued and handed out as soon as
//! their closing tag has been seen, before the rest of the document is read.
//!
//! Construction state lives in [`BuildState`]: the row being filled, the name of
//! the open binding and a stack of [`TermFrame`]s indexed by nesting depth.
//! Entering `subject`/`predicate`/`object` pushes a frame, leaving it pops the
//! frame and attaches the finished term to its parent triple.

use std::collections::VecDeque;
use std::io::{BufReader, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::trace;

use super::{RawCell, RawRow, RawTerm, RawValue, DEFAULT_CHUNK_SIZE};
use crate::error::{Result, SparqlError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TripleField {
    Subject,
    Predicate,
    Object,
}

/// One level of a term under construction.
#[derive(Debug, Default)]
struct TermFrame {
    field: Option<TripleField>,
    term: RawTerm,
    /// Character data buffer, open only inside a leaf element.
    text: Option<String>,
}

#[derive(Debug, Default)]
struct BuildState {
    pending: VecDeque<RawRow>,
    row: Option<Vec<(String, RawCell)>>,
    binding: Option<String>,
    frames: Vec<TermFrame>,
    saw_results: bool,
    saw_boolean: bool,
}

impl BuildState {
    fn on_start(&mut self, start: &BytesStart<'_>) -> Result<()> {
        let local_name = start.local_name();
        match local_name.as_ref() {
            b"results" => {
                if self.saw_boolean {
                    return Err(both_regions());
                }
                self.saw_results = true;
            }
            b"result" => self.row = Some(Vec::new()),
            b"binding" => {
                let name = attribute(start, b"name")?.ok_or_else(|| {
                    SparqlError::ParseError("binding element without a name".to_string())
                })?;
                self.binding = Some(name);
                self.frames = vec![TermFrame::default()];
            }
            tag @ (b"uri" | b"literal" | b"bnode" | b"triple") => {
                let lang = attribute(start, b"xml:lang")?;
                let datatype = attribute(start, b"datatype")?;
                let frame = self.top()?;
                frame.term.kind = String::from_utf8_lossy(tag).into_owned();
                frame.term.lang = lang;
                frame.term.datatype = datatype;
                if tag != b"triple" && frame.term.value.is_none() {
                    frame.text = Some(String::new());
                }
            }
            b"subject" => self.push_field(TripleField::Subject)?,
            b"predicate" => self.push_field(TripleField::Predicate)?,
            b"object" => self.push_field(TripleField::Object)?,
            b"boolean" => {
                if self.saw_results {
                    return Err(both_regions());
                }
                self.saw_boolean = true;
                self.frames =
                    vec![TermFrame { text: Some(String::new()), ..TermFrame::default() }];
            }
            _ => {}
        }
        Ok(())
    }

    fn on_end(&mut self, local_name: &[u8]) -> Result<()> {
        match local_name {
            b"uri" | b"literal" | b"bnode" => {
                let frame = self.top()?;
                if let Some(text) = frame.text.take() {
                    frame.term.value = Some(RawValue::Text(text));
                }
            }
            b"subject" | b"predicate" | b"object" => {
                let frame = self.frames.pop().ok_or_else(|| unbalanced(local_name))?;
                let parent = self.top()?;
                let slot = match frame.field {
                    Some(TripleField::Subject) => &mut parent.term.subject,
                    Some(TripleField::Predicate) => &mut parent.term.predicate,
                    Some(TripleField::Object) => &mut parent.term.object,
                    None => return Err(unbalanced(local_name)),
                };
                *slot = Some(Box::new(frame.term));
            }
            b"binding" => {
                let frame = self.frames.pop().ok_or_else(|| unbalanced(local_name))?;
                self.frames.clear();
                let name = self.binding.take().ok_or_else(|| unbalanced(local_name))?;
                let row = self.row.as_mut().ok_or_else(|| {
                    SparqlError::ParseError("binding element outside of a result".to_string())
                })?;
                row.push((name, RawCell::Term(frame.term)));
            }
            b"result" => {
                let row = self.row.take().unwrap_or_default();
                trace!(columns = row.len(), "decoded XML result");
                self.pending.push_back(RawRow::Bindings(row));
            }
            b"boolean" => {
                let frame = self.frames.pop().ok_or_else(|| unbalanced(local_name))?;
                let text = frame.text.unwrap_or_default();
                self.pending.push_back(RawRow::Boolean(text.trim() == "true"));
            }
            _ => {}
        }
        Ok(())
    }

    fn on_text(&mut self, text: &str) {
        if let Some(buffer) = self.frames.last_mut().and_then(|f| f.text.as_mut()) {
            buffer.push_str(text);
        }
    }

    fn push_field(&mut self, field: TripleField) -> Result<()> {
        if self.frames.is_empty() {
            return Err(SparqlError::ParseError(
                "triple component outside of a binding".to_string(),
            ));
        }
        self.frames.push(TermFrame { field: Some(field), ..TermFrame::default() });
        Ok(())
    }

    fn top(&mut self) -> Result<&mut TermFrame> {
        self.frames.last_mut().ok_or_else(|| {
            SparqlError::ParseError("term element outside of a binding".to_string())
        })
    }
}

fn attribute(start: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in start.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn both_regions() -> SparqlError {
    SparqlError::MalformedResponse("response contains both <results> and <boolean>".to_string())
}

fn unbalanced(tag: &[u8]) -> SparqlError {
    SparqlError::ParseError(format!(
        "unbalanced closing element </{}>",
        String::from_utf8_lossy(tag)
    ))
}

pub struct XmlResults<R: Read> {
    reader: Reader<BufReader<R>>,
    buf: Vec<u8>,
    state: BuildState,
    finished: bool,
}

impl<R: Read> XmlResults<R> {
    pub fn new(body: R) -> Self {
        Self::with_chunk_size(body, DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(body: R, chunk_size: usize) -> Self {
        let mut reader = Reader::from_reader(BufReader::with_capacity(chunk_size.max(1), body));
        reader.config_mut().expand_empty_elements = true;
        Self { reader, buf: Vec::new(), state: BuildState::default(), finished: false }
    }

    fn read_step(&mut self) -> Result<()> {
        self.buf.clear();
        match self.reader.read_event_into(&mut self.buf)? {
            Event::Start(start) => self.state.on_start(&start)?,
            Event::End(end) => self.state.on_end(end.local_name().as_ref())?,
            Event::Text(text) => self.state.on_text(&text.unescape()?),
            Event::CData(cdata) => {
                let text = std::str::from_utf8(&cdata)
                    .map_err(|e| SparqlError::ParseError(e.to_string()))?;
                self.state.on_text(text);
            }
            Event::Eof => {
                self.finished = true;
                if !self.state.saw_results && !self.state.saw_boolean {
                    return Err(SparqlError::MalformedResponse(
                        "response contains neither <results> nor <boolean>".to_string(),
                    ));
                }
            }
            _ => {}
        }
        Ok(())
    }
}

impl<R: Read> Iterator for XmlResults<R> {
    type Item = Result<RawRow>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.state.pending.pop_front() {
                return Some(Ok(row));
            }
            if self.finished {
                return None;
            }
            if let Err(err) = self.read_step() {
                self.finished = true;
                return Some(Err(err));
            }
        }
    }
}
