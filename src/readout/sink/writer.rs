use crate::readout::common::error::Result;
use crate::readout::run::RunDescriptor;
use crate::readout::sink::types::OutputEvent;

pub trait EventSink {
    fn begin_run(&mut self, run: &RunDescriptor) -> Result<()>;
    fn process_event(&mut self, event: OutputEvent) -> Result<()>;
}
