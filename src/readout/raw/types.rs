//! Raw stream event types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Bookkeeping shared by every event of the stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventHeader {
    pub run_number: u32,
    pub event_number: u32,
    #[serde(default)]
    pub timestamp: u64,
}

/// Arrays read out from one board for one event.
///
/// Three-sample boards fill `adc` with three frames and `pivot` with one
/// 0/1 flag per pixel. Zero-suppressed boards fill `x`, `y` and a single
/// `adc` array with one entry per fired pixel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardPayload {
    pub adc: Vec<Vec<i16>>,
    pub pivot: Vec<u8>,
    pub x: Vec<u16>,
    pub y: Vec<u16>,
    pub pivot_pixel: u32,
}

/// Sub-event written by the detector board producer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorBoardEvent {
    pub tags: BTreeMap<String, String>,
    pub boards: Vec<BoardPayload>,
}

impl DetectorBoardEvent {
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }
}

/// Sub-event from any other producer, e.g. the trigger logic unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherProducerEvent {
    pub producer: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubEvent {
    Detector(DetectorBoardEvent),
    OtherProducer(OtherProducerEvent),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    BeginRun {
        header: EventHeader,
        #[serde(default)]
        sub_events: Vec<SubEvent>,
    },
    Data {
        header: EventHeader,
        #[serde(default)]
        sub_events: Vec<SubEvent>,
    },
    EndRun {
        header: EventHeader,
    },
}

impl StreamEvent {
    pub fn header(&self) -> &EventHeader {
        match self {
            StreamEvent::BeginRun { header, .. }
            | StreamEvent::Data { header, .. }
            | StreamEvent::EndRun { header } => header,
        }
    }
}
