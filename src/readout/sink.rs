//! Output sink module
//!
//! Record types handed to the downstream consumer and the `EventSink` seam
//! that receives them.

mod writer;
mod memory_sink;
mod json_lines_sink;
pub mod types;

pub use writer::EventSink;
pub use memory_sink::MemorySink;
pub use json_lines_sink::JsonLinesSink;
pub use types::{
    ConvertedEvent, GroupRecords, OutputEvent, OutputGroup, RawFrameRecord, SparseFrameRecord,
};
