use std::collections::VecDeque;

use crate::readout::common::error::Result;
use crate::readout::raw::reader::EventSource;
use crate::readout::raw::types::StreamEvent;

/// Event source backed by an in-memory queue.
#[derive(Debug, Default)]
pub struct MemorySource {
    events: VecDeque<StreamEvent>,
}

impl MemorySource {
    pub fn new(events: impl IntoIterator<Item = StreamEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    pub fn push(&mut self, event: StreamEvent) {
        self.events.push_back(event);
    }

    /// Events not yet handed out.
    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl EventSource for MemorySource {
    fn next_event(&mut self) -> Result<Option<StreamEvent>> {
        Ok(self.events.pop_front())
    }
}
