//! Sink writing the run header and every output event as one JSON document
//! per line.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::readout::common::error::{ReadoutError, Result};
use crate::readout::run::RunDescriptor;
use crate::readout::sink::types::OutputEvent;
use crate::readout::sink::writer::EventSink;

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum SinkLine<'a> {
    RunHeader(&'a RunDescriptor),
    Event(&'a OutputEvent),
}

pub struct JsonLinesSink<W: Write> {
    writer: W,
    lines_written: usize,
}

impl JsonLinesSink<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|e| ReadoutError::OutputWrite(format!("{}: {}", path.display(), e)))?;
        debug!("Writing records to {}", path.display());
        Ok(Self::new(BufWriter::with_capacity(1 << 20, file)))
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            lines_written: 0,
        }
    }

    pub fn lines_written(&self) -> usize {
        self.lines_written
    }

    /// Flushes and hands back the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn write_line(&mut self, line: &SinkLine<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.writer, line)?;
        self.writer.write_all(b"\n")?;
        self.lines_written += 1;
        Ok(())
    }
}

impl<W: Write> EventSink for JsonLinesSink<W> {
    fn begin_run(&mut self, run: &RunDescriptor) -> Result<()> {
        self.write_line(&SinkLine::RunHeader(run))
    }

    fn process_event(&mut self, event: OutputEvent) -> Result<()> {
        self.write_line(&SinkLine::Event(&event))?;
        if matches!(event, OutputEvent::EndOfRun(_)) {
            self.writer.flush()?;
        }
        Ok(())
    }
}
