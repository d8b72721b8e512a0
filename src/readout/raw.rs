//! Raw stream reading module
//!
//! Event types delivered by the readout, the `EventSource` seam that
//! supplies them, and the per-board array decoder.

mod reader;
mod memory_source;
mod json_lines_source;
mod decoder;
pub mod types;

pub use reader::EventSource;
pub use memory_source::MemorySource;
pub use json_lines_source::JsonLinesSource;
pub use decoder::{BoardDecoder, DecodedBoard};
pub use types::{
    BoardPayload, DetectorBoardEvent, EventHeader, OtherProducerEvent, StreamEvent, SubEvent,
};
