//! Pipeline conversions module
//!
//! Orchestrates the conversion of a raw readout stream into per-sensor
//! records.

mod event_converter;
mod raw_to_records;


pub use event_converter::EventConverter;
pub use raw_to_records::{ConversionSummary, RawToRecordsPipeline, Termination};
