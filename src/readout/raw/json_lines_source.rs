//! Event source reading one JSON encoded `StreamEvent` per line.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::readout::common::error::{ReadoutError, Result};
use crate::readout::raw::reader::EventSource;
use crate::readout::raw::types::StreamEvent;

pub struct JsonLinesSource<R: BufRead> {
    reader: R,
    line: Vec<u8>,
    line_number: usize,
}

impl JsonLinesSource<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| ReadoutError::InputRead(format!("{}: {}", path.display(), e)))?;
        debug!("Reading events from {}", path.display());
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            line_number: 0,
        }
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

impl<R: BufRead> EventSource for JsonLinesSource<R> {
    /// Lines that are not valid events come back as `MalformedEvent`, so the
    /// caller can skip them and keep reading.
    fn next_event(&mut self) -> Result<Option<StreamEvent>> {
        loop {
            self.line.clear();
            if self.reader.read_until(b'\n', &mut self.line)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = self.line.trim_ascii();
            if line.is_empty() {
                continue;
            }

            // Invalid UTF-8 is reported by the JSON parser like any other bad line.
            return serde_json::from_slice(line).map(Some).map_err(|e| {
                ReadoutError::MalformedEvent(format!("line {}: {}", self.line_number, e))
            });
        }
    }
}
