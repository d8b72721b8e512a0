//! Run-level description
//!
//! Built once from the begin-of-run event and read-only for the rest of
//! the stream: the global acquisition mode, one descriptor per board and
//! the coordinate bounds of the produced records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::readout::common::error::{ReadoutError, Result};
use crate::readout::config::ReaderConfig;
use crate::readout::frame::MarkerColumns;
use crate::readout::raw::{DetectorBoardEvent, EventHeader, SubEvent};

/// Begin-of-run tag holding the number of boards of a detector producer.
pub const BOARDS_TAG: &str = "BOARDS";
/// Begin-of-run tag holding the global acquisition mode.
pub const MODE_TAG: &str = "MODE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcquisitionMode {
    ThreeSample,
    ZeroSuppressed,
    /// Every board declares its own `BoardMode`.
    Mixed,
}

impl FromStr for AcquisitionMode {
    type Err = ReadoutError;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "RAW3" | "ThreeSample" => Ok(AcquisitionMode::ThreeSample),
            "ZS" | "ZeroSuppressed" => Ok(AcquisitionMode::ZeroSuppressed),
            "Mixed" => Ok(AcquisitionMode::Mixed),
            other => Err(ReadoutError::Configuration(format!(
                "unsupported acquisition mode '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for AcquisitionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AcquisitionMode::ThreeSample => "RAW3",
            AcquisitionMode::ZeroSuppressed => "ZS",
            AcquisitionMode::Mixed => "Mixed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardMode {
    ThreeSample,
    ZeroSuppressed,
}

impl FromStr for BoardMode {
    type Err = ReadoutError;

    fn from_str(name: &str) -> Result<Self> {
        match name.parse::<AcquisitionMode>()? {
            AcquisitionMode::ThreeSample => Ok(BoardMode::ThreeSample),
            AcquisitionMode::ZeroSuppressed => Ok(BoardMode::ZeroSuppressed),
            AcquisitionMode::Mixed => Err(ReadoutError::Configuration(
                "a single board cannot run in mixed mode".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateBounds {
    pub x_min: u32,
    pub x_max: u32,
    pub y_min: u32,
    pub y_max: u32,
}

impl CoordinateBounds {
    pub fn width(&self) -> usize {
        (self.x_max - self.x_min) as usize + 1
    }

    pub fn height(&self) -> usize {
        (self.y_max - self.y_min) as usize + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardDescriptor {
    pub sensor_id: u32,
    pub mode: BoardMode,
    /// Sensor columns as read out, markers included.
    pub width: usize,
    pub height: usize,
    /// Bounds of the produced records, after marker removal.
    pub bounds: CoordinateBounds,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunDescriptor {
    pub run_number: u32,
    pub detector_name: String,
    pub geo_id: i32,
    pub mode: AcquisitionMode,
    pub boards: Vec<BoardDescriptor>,
}

impl RunDescriptor {
    /// Reads board count and modes from the detector sub-events of a
    /// begin-of-run event. Boards are numbered consecutively across
    /// detector sub-events.
    pub fn from_begin_run(
        header: &EventHeader,
        sub_events: &[SubEvent],
        config: &ReaderConfig,
        markers: &MarkerColumns,
    ) -> Result<Self> {
        let bounds = CoordinateBounds {
            x_min: 0,
            x_max: (markers.stripped_width(config.sensor_width) - 1) as u32,
            y_min: 0,
            y_max: (config.sensor_height - 1) as u32,
        };

        let mut mode: Option<AcquisitionMode> = None;
        let mut boards = Vec::new();

        for detector in sub_events.iter().filter_map(|sub| match sub {
            SubEvent::Detector(detector) => Some(detector),
            SubEvent::OtherProducer(_) => None,
        }) {
            let detector_mode = global_mode(detector)?;
            if let Some(previous) = mode {
                if previous != detector_mode {
                    return Err(ReadoutError::Configuration(format!(
                        "detector producers disagree on acquisition mode: {} and {}",
                        previous, detector_mode
                    )));
                }
            }
            mode = Some(detector_mode);

            for (index, board_mode) in board_modes(detector, detector_mode)?.into_iter().enumerate() {
                let sensor_id = boards.len() as u32;
                debug!("Board {} (sensor {}) working in {:?}", index, sensor_id, board_mode);
                boards.push(BoardDescriptor {
                    sensor_id,
                    mode: board_mode,
                    width: config.sensor_width,
                    height: config.sensor_height,
                    bounds,
                });
            }
        }

        let mode = mode.ok_or_else(|| {
            ReadoutError::Configuration(format!(
                "begin-of-run of run {} has no detector sub-event",
                header.run_number
            ))
        })?;

        match mode {
            AcquisitionMode::ThreeSample => info!("All boards are working in RAW3 mode"),
            AcquisitionMode::ZeroSuppressed => info!("All boards are working in ZS mode"),
            AcquisitionMode::Mixed => info!("Boards running in mixed mode"),
        }

        Ok(Self {
            run_number: header.run_number,
            detector_name: config.detector_name.clone(),
            geo_id: config.geo_id,
            mode,
            boards,
        })
    }

    pub fn board(&self, sensor_id: usize) -> Option<&BoardDescriptor> {
        self.boards.get(sensor_id)
    }

    pub fn board_count(&self) -> usize {
        self.boards.len()
    }

    /// Whether data events carry the first/second/third and CDS groups.
    pub fn has_dense_groups(&self) -> bool {
        matches!(self.mode, AcquisitionMode::ThreeSample | AcquisitionMode::Mixed)
    }

    /// Whether data events carry the zero-suppressed group.
    pub fn has_sparse_group(&self) -> bool {
        matches!(self.mode, AcquisitionMode::ZeroSuppressed | AcquisitionMode::Mixed)
    }
}

fn global_mode(detector: &DetectorBoardEvent) -> Result<AcquisitionMode> {
    detector
        .tag(MODE_TAG)
        .ok_or_else(|| ReadoutError::Configuration(format!("missing {} tag", MODE_TAG)))?
        .parse()
}

fn board_modes(detector: &DetectorBoardEvent, mode: AcquisitionMode) -> Result<Vec<BoardMode>> {
    let count = match detector.tag(BOARDS_TAG) {
        Some(value) => value.trim().parse::<usize>().map_err(|e| {
            ReadoutError::Configuration(format!("invalid {} tag '{}': {}", BOARDS_TAG, value, e))
        })?,
        None => 0,
    };

    match mode {
        AcquisitionMode::ThreeSample => Ok(vec![BoardMode::ThreeSample; count]),
        AcquisitionMode::ZeroSuppressed => Ok(vec![BoardMode::ZeroSuppressed; count]),
        AcquisitionMode::Mixed => (0..count)
            .map(|board| {
                let tag = format!("{}{}", MODE_TAG, board);
                detector
                    .tag(&tag)
                    .ok_or_else(|| ReadoutError::Configuration(format!("missing {} tag", tag)))?
                    .parse()
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::readout::raw::OtherProducerEvent;

    fn detector(tags: &[(&str, &str)]) -> SubEvent {
        SubEvent::Detector(DetectorBoardEvent {
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
            boards: Vec::new(),
        })
    }

    fn tlu() -> SubEvent {
        SubEvent::OtherProducer(OtherProducerEvent {
            producer: "TLU".into(),
            tags: BTreeMap::new(),
        })
    }

    fn header() -> EventHeader {
        EventHeader {
            run_number: 42,
            event_number: 0,
            timestamp: 0,
        }
    }

    #[test]
    fn test_three_sample_run_with_marker_bounds() {
        let config = ReaderConfig::builder()
            .remove_markers(true)
            .marker_positions([0, 1, 66, 67])
            .geo_id(7)
            .build();
        let markers = config.marker_columns().unwrap();
        let subs = [tlu(), detector(&[("BOARDS", "3"), ("MODE", "RAW3"), ("DET", "MIMOTEL")])];

        let run = RunDescriptor::from_begin_run(&header(), &subs, &config, &markers).unwrap();

        assert_eq!(run.mode, AcquisitionMode::ThreeSample);
        assert_eq!(run.board_count(), 3);
        assert_eq!(run.run_number, 42);
        assert_eq!(run.geo_id, 7);
        assert_eq!(run.detector_name, "MimoTel");
        for (index, board) in run.boards.iter().enumerate() {
            assert_eq!(board.sensor_id as usize, index);
            assert_eq!(board.bounds.x_max, 259);
            assert_eq!(board.bounds.y_max, 255);
            assert_eq!(board.bounds.width(), 260);
        }
        assert!(run.has_dense_groups());
        assert!(!run.has_sparse_group());
    }

    #[test]
    fn test_mixed_run_reads_submodes() {
        let config = ReaderConfig::default();
        let subs = [detector(&[
            ("BOARDS", "2"),
            ("MODE", "Mixed"),
            ("MODE0", "ZS"),
            ("MODE1", "RAW3"),
        ])];

        let run = RunDescriptor::from_begin_run(&header(), &subs, &config, &MarkerColumns::empty())
            .unwrap();

        assert_eq!(run.mode, AcquisitionMode::Mixed);
        assert_eq!(run.boards[0].mode, BoardMode::ZeroSuppressed);
        assert_eq!(run.boards[1].mode, BoardMode::ThreeSample);
        assert_eq!(run.boards[1].bounds.x_max, 263);
        assert!(run.has_dense_groups() && run.has_sparse_group());
    }

    #[test]
    fn test_boards_numbered_across_producers() {
        let subs = [
            detector(&[("BOARDS", "2"), ("MODE", "ZS")]),
            detector(&[("BOARDS", "1"), ("MODE", "ZS")]),
        ];
        let run = RunDescriptor::from_begin_run(
            &header(),
            &subs,
            &ReaderConfig::default(),
            &MarkerColumns::empty(),
        )
        .unwrap();
        let ids: Vec<u32> = run.boards.iter().map(|b| b.sensor_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_configuration_errors() {
        let config = ReaderConfig::default();
        let markers = MarkerColumns::empty();
        let cases: Vec<Vec<SubEvent>> = vec![
            vec![detector(&[("BOARDS", "1"), ("MODE", "RAW2")])],
            vec![detector(&[("BOARDS", "1")])],
            vec![detector(&[("BOARDS", "two"), ("MODE", "RAW3")])],
            vec![detector(&[("BOARDS", "2"), ("MODE", "Mixed"), ("MODE0", "RAW3")])],
            vec![detector(&[("BOARDS", "1"), ("MODE", "Mixed"), ("MODE0", "Mixed")])],
            vec![
                detector(&[("BOARDS", "1"), ("MODE", "RAW3")]),
                detector(&[("BOARDS", "1"), ("MODE", "ZS")]),
            ],
            vec![tlu()],
        ];

        for subs in cases {
            let result = RunDescriptor::from_begin_run(&header(), &subs, &config, &markers);
            assert!(
                matches!(result, Err(ReadoutError::Configuration(_))),
                "expected configuration error for {:?}",
                subs
            );
        }
    }

    #[test]
    fn test_mode_names() {
        assert_eq!("ThreeSample".parse::<AcquisitionMode>().unwrap(), AcquisitionMode::ThreeSample);
        assert_eq!("ZeroSuppressed".parse::<BoardMode>().unwrap(), BoardMode::ZeroSuppressed);
        assert_eq!(AcquisitionMode::Mixed.to_string(), "Mixed");
    }
}
