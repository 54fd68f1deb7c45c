//! Decoder for SPARQL Results CSV and TSV.
//!
//! The first line names the columns; every following line is zipped against it.
//! The format carries no term types, so every value comes out as plain text.

use std::io::Read;

use csv::{ReaderBuilder, StringRecord};
use tracing::trace;

use super::{RawCell, RawRow, DEFAULT_CHUNK_SIZE};
use crate::error::Result;

pub struct DelimitedResults<R: Read> {
    reader: csv::Reader<R>,
    header: Option<Vec<String>>,
    record: StringRecord,
    finished: bool,
}

impl<R: Read> DelimitedResults<R> {
    pub fn new(body: R, separator: u8) -> Self {
        Self::with_chunk_size(body, separator, DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(body: R, separator: u8, chunk_size: usize) -> Self {
        let reader = ReaderBuilder::new()
            .delimiter(separator)
            .quote(b'"')
            .double_quote(true)
            .has_headers(false)
            .buffer_capacity(chunk_size.max(1))
            .from_reader(body);
        Self { reader, header: None, record: StringRecord::new(), finished: false }
    }

    fn read_row(&mut self) -> Result<Option<RawRow>> {
        if self.header.is_none() {
            if !self.reader.read_record(&mut self.record)? {
                return Ok(None);
            }
            self.header = Some(self.record.iter().map(str::to_string).collect());
        }
        if !self.reader.read_record(&mut self.record)? {
            return Ok(None);
        }
        let header = self.header.as_deref().unwrap_or_default();
        let row: Vec<(String, RawCell)> = header
            .iter()
            .zip(self.record.iter())
            .map(|(name, value)| (name.clone(), RawCell::Text(value.to_string())))
            .collect();
        trace!(columns = row.len(), "decoded delimited row");
        Ok(Some(RawRow::Bindings(row)))
    }
}

impl<R: Read> Iterator for DelimitedResults<R> {
    type Item = Result<RawRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_row() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}
