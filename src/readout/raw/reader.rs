use crate::readout::common::error::Result;
use crate::readout::raw::types::StreamEvent;

pub trait EventSource {
    /// Blocks until the next event is available. `Ok(None)` ends the stream.
    fn next_event(&mut self) -> Result<Option<StreamEvent>>;
}
