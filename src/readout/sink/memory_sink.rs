use crate::readout::common::error::Result;
use crate::readout::run::RunDescriptor;
use crate::readout::sink::types::{ConvertedEvent, OutputEvent};
use crate::readout::sink::writer::EventSink;

/// Keeps everything it receives, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub runs: Vec<RunDescriptor>,
    pub events: Vec<OutputEvent>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data_events(&self) -> impl Iterator<Item = &ConvertedEvent> {
        self.events.iter().filter_map(|event| match event {
            OutputEvent::Data(data) => Some(data),
            OutputEvent::EndOfRun(_) => None,
        })
    }

    pub fn end_of_run_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, OutputEvent::EndOfRun(_)))
            .count()
    }
}

impl EventSink for MemorySink {
    fn begin_run(&mut self, run: &RunDescriptor) -> Result<()> {
        self.runs.push(run.clone());
        Ok(())
    }

    fn process_event(&mut self, event: OutputEvent) -> Result<()> {
        self.events.push(event);
        Ok(())
    }
}
