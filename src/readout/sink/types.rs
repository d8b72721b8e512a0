//! Output record types

use serde::{Deserialize, Serialize};

use crate::readout::config::OutputRole;
use crate::readout::frame::{Frame, SparsePixel};
use crate::readout::raw::EventHeader;
use crate::readout::run::{BoardDescriptor, CoordinateBounds};

/// One dense frame of one sensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFrameRecord {
    pub sensor_id: u32,
    pub bounds: CoordinateBounds,
    /// Pixel index at which the readout of this event started.
    pub pivot_pixel: u32,
    /// Row-major samples, `bounds.width() × bounds.height()` of them.
    pub samples: Vec<i16>,
}

impl RawFrameRecord {
    pub fn new(board: &BoardDescriptor, pivot_pixel: u32, frame: Frame<i16>) -> Self {
        debug_assert_eq!(frame.width(), board.bounds.width());
        Self {
            sensor_id: board.sensor_id,
            bounds: board.bounds,
            pivot_pixel,
            samples: frame.into_data(),
        }
    }

    pub fn width(&self) -> usize {
        self.bounds.width()
    }
}

/// Zero-suppressed pixels of one sensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseFrameRecord {
    pub sensor_id: u32,
    pub bounds: CoordinateBounds,
    pub pixel_type: u32,
    pub pixels: Vec<SparsePixel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "records", rename_all = "snake_case")]
pub enum GroupRecords {
    Dense(Vec<RawFrameRecord>),
    Sparse(Vec<SparseFrameRecord>),
}

impl GroupRecords {
    pub fn len(&self) -> usize {
        match self {
            GroupRecords::Dense(records) => records.len(),
            GroupRecords::Sparse(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dense(&self) -> Option<&[RawFrameRecord]> {
        match self {
            GroupRecords::Dense(records) => Some(records),
            GroupRecords::Sparse(_) => None,
        }
    }

    pub fn sparse(&self) -> Option<&[SparseFrameRecord]> {
        match self {
            GroupRecords::Sparse(records) => Some(records),
            GroupRecords::Dense(_) => None,
        }
    }
}

/// Records of one role, registered under the configured collection name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputGroup {
    pub role: OutputRole,
    pub name: String,
    pub records: GroupRecords,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertedEvent {
    pub header: EventHeader,
    pub groups: Vec<OutputGroup>,
}

impl ConvertedEvent {
    pub fn group(&self, role: OutputRole) -> Option<&OutputGroup> {
        self.groups.iter().find(|group| group.role == role)
    }

    pub fn group_named(&self, name: &str) -> Option<&OutputGroup> {
        self.groups.iter().find(|group| group.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputEvent {
    Data(ConvertedEvent),
    EndOfRun(EventHeader),
}

impl OutputEvent {
    pub fn header(&self) -> &EventHeader {
        match self {
            OutputEvent::Data(event) => &event.header,
            OutputEvent::EndOfRun(header) => header,
        }
    }
}
