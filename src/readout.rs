//! Telescope readout conversion module
//!
//! This module turns the raw event stream of a MimoTel beam telescope into
//! per-sensor frame records, with separate modules for stream reading,
//! frame processing, run description, record writing and orchestration.

pub mod common;
pub mod config;
pub mod frame;
pub mod raw;
pub mod run;
pub mod sink;
pub mod conversions;

pub use common::{
    ReadoutError,
    Result,
};

pub use config::{
    OutputRole,
    ReaderConfig,
    ReaderConfigBuilder,
    load_config,
};

pub use frame::{
    Frame,
    MarkerColumns,
    SignalPolarity,
    SparsePixel,
};

pub use raw::{
    EventSource,
    JsonLinesSource,
    MemorySource,
    StreamEvent,
};

pub use run::{
    AcquisitionMode,
    RunDescriptor,
};

pub use sink::{
    EventSink,
    JsonLinesSink,
    MemorySink,
    OutputEvent,
};

pub use conversions::{
    ConversionSummary,
    RawToRecordsPipeline,
    Termination,
};
