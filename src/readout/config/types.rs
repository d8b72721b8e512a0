//! Reader configuration types

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::readout::common::error::{ReadoutError, Result};
use crate::readout::frame::{MarkerColumns, SignalPolarity};

/// Sparse pixel layout storing only `(x, y, signal)`.
pub const SIMPLE_SPARSE_PIXEL: u32 = 1;

/// MimoTel columns wired to the readout markers.
const DEFAULT_MARKER_POSITIONS: [usize; 8] = [0, 1, 66, 67, 132, 133, 198, 199];

/// Output groups produced per data event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputRole {
    FirstFrame,
    SecondFrame,
    ThirdFrame,
    Cds,
    ZeroSuppressed,
}

impl OutputRole {
    pub const ALL: [OutputRole; 5] = [
        OutputRole::FirstFrame,
        OutputRole::SecondFrame,
        OutputRole::ThirdFrame,
        OutputRole::Cds,
        OutputRole::ZeroSuppressed,
    ];

    /// Position of the role in `ALL`.
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Configuration for the raw to sensor record conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReaderConfig {
    /// Whether to compute the CDS frame of three-sample boards
    pub cds: bool,
    pub first_frame_collection: String,
    pub second_frame_collection: String,
    pub third_frame_collection: String,
    pub cds_collection: String,
    pub zs_collection: String,
    /// Whether marker columns are removed from the output
    pub remove_markers: bool,
    /// Marker column indices, counted from 0. Order does not matter.
    pub marker_positions: Vec<usize>,
    /// Sign of the signal (-1 for negative signals)
    pub polarity: SignalPolarity,
    /// Sensor columns including markers
    pub sensor_width: usize,
    pub sensor_height: usize,
    /// Stop after this many data events
    pub max_events: Option<usize>,
    pub geo_id: i32,
    pub detector_name: String,
    pub sparse_pixel_type: u32,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            cds: true,
            first_frame_collection: "firstFrame".to_string(),
            second_frame_collection: "secondFrame".to_string(),
            third_frame_collection: "thirdFrame".to_string(),
            cds_collection: "rawdata".to_string(),
            zs_collection: "zsdata".to_string(),
            remove_markers: false,
            marker_positions: DEFAULT_MARKER_POSITIONS.to_vec(),
            polarity: SignalPolarity::Negative,
            sensor_width: 264,
            sensor_height: 256,
            max_events: None,
            geo_id: 0,
            detector_name: "MimoTel".to_string(),
            sparse_pixel_type: SIMPLE_SPARSE_PIXEL,
        }
    }
}

impl ReaderConfig {
    pub fn builder() -> ReaderConfigBuilder {
        ReaderConfigBuilder::default()
    }

    pub fn collection_name(&self, role: OutputRole) -> &str {
        match role {
            OutputRole::FirstFrame => &self.first_frame_collection,
            OutputRole::SecondFrame => &self.second_frame_collection,
            OutputRole::ThirdFrame => &self.third_frame_collection,
            OutputRole::Cds => &self.cds_collection,
            OutputRole::ZeroSuppressed => &self.zs_collection,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.sensor_width == 0 || self.sensor_height == 0 {
            return Err(ReadoutError::Configuration(format!(
                "sensor size {}x{} is empty",
                self.sensor_width, self.sensor_height
            )));
        }

        if self.sensor_width > usize::from(u16::MAX) || self.sensor_height > usize::from(u16::MAX) {
            return Err(ReadoutError::Configuration(format!(
                "sensor size {}x{} exceeds 16-bit pixel coordinates",
                self.sensor_width, self.sensor_height
            )));
        }

        for (index, role) in OutputRole::ALL.iter().enumerate() {
            let name = self.collection_name(*role);
            if name.trim().is_empty() {
                return Err(ReadoutError::Configuration(format!(
                    "collection name for {:?} is empty",
                    role
                )));
            }
            if OutputRole::ALL[..index]
                .iter()
                .any(|other| self.collection_name(*other) == name)
            {
                return Err(ReadoutError::Configuration(format!(
                    "collection name '{}' used twice",
                    name
                )));
            }
        }

        if self.sparse_pixel_type != SIMPLE_SPARSE_PIXEL {
            return Err(ReadoutError::Configuration(format!(
                "unsupported sparse pixel type {}",
                self.sparse_pixel_type
            )));
        }

        if self.remove_markers {
            if let Some(&column) = self.marker_positions.iter().find(|&&c| c >= self.sensor_width) {
                return Err(ReadoutError::Configuration(format!(
                    "marker column {} outside sensor width {}",
                    column, self.sensor_width
                )));
            }
        }

        Ok(())
    }

    /// Marker set actually applied to the data. Empty when removal is off,
    /// and when removal is on but no position is configured.
    pub fn marker_columns(&self) -> Result<MarkerColumns> {
        if !self.remove_markers {
            debug!("Data conversion without marker removal");
            return Ok(MarkerColumns::empty());
        }

        if self.marker_positions.is_empty() {
            warn!("Marker removal selected but no marker position configured, disabling marker removal");
            return Ok(MarkerColumns::empty());
        }

        debug!("Data conversion with marker removal");
        MarkerColumns::new(self.marker_positions.iter().copied(), self.sensor_width)
    }
}

/// Builder for ReaderConfig
#[derive(Default)]
pub struct ReaderConfigBuilder {
    cds: Option<bool>,
    collections: Vec<(OutputRole, String)>,
    remove_markers: Option<bool>,
    marker_positions: Option<Vec<usize>>,
    polarity: Option<SignalPolarity>,
    sensor_size: Option<(usize, usize)>,
    max_events: Option<Option<usize>>,
    geo_id: Option<i32>,
    detector_name: Option<String>,
}

impl ReaderConfigBuilder {
    pub fn cds(mut self, enable: bool) -> Self {
        self.cds = Some(enable);
        self
    }

    pub fn collection_name(mut self, role: OutputRole, name: impl Into<String>) -> Self {
        self.collections.push((role, name.into()));
        self
    }

    pub fn remove_markers(mut self, enable: bool) -> Self {
        self.remove_markers = Some(enable);
        self
    }

    pub fn marker_positions(mut self, positions: impl IntoIterator<Item = usize>) -> Self {
        self.marker_positions = Some(positions.into_iter().collect());
        self
    }

    pub fn polarity(mut self, polarity: SignalPolarity) -> Self {
        self.polarity = Some(polarity);
        self
    }

    pub fn sensor_size(mut self, width: usize, height: usize) -> Self {
        self.sensor_size = Some((width, height));
        self
    }

    pub fn max_events(mut self, max: Option<usize>) -> Self {
        self.max_events = Some(max);
        self
    }

    pub fn geo_id(mut self, geo_id: i32) -> Self {
        self.geo_id = Some(geo_id);
        self
    }

    pub fn detector_name(mut self, name: impl Into<String>) -> Self {
        self.detector_name = Some(name.into());
        self
    }

    pub fn build(self) -> ReaderConfig {
        let default = ReaderConfig::default();
        let (sensor_width, sensor_height) = self
            .sensor_size
            .unwrap_or((default.sensor_width, default.sensor_height));

        let mut config = ReaderConfig {
            cds: self.cds.unwrap_or(default.cds),
            remove_markers: self.remove_markers.unwrap_or(default.remove_markers),
            marker_positions: self.marker_positions.unwrap_or(default.marker_positions),
            polarity: self.polarity.unwrap_or(default.polarity),
            sensor_width,
            sensor_height,
            max_events: self.max_events.unwrap_or(default.max_events),
            geo_id: self.geo_id.unwrap_or(default.geo_id),
            detector_name: self.detector_name.unwrap_or(default.detector_name),
            ..default
        };

        for (role, name) in self.collections {
            let slot = match role {
                OutputRole::FirstFrame => &mut config.first_frame_collection,
                OutputRole::SecondFrame => &mut config.second_frame_collection,
                OutputRole::ThirdFrame => &mut config.third_frame_collection,
                OutputRole::Cds => &mut config.cds_collection,
                OutputRole::ZeroSuppressed => &mut config.zs_collection,
            };
            *slot = name;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReaderConfig::default();
        assert!(config.cds);
        assert!(!config.remove_markers);
        assert_eq!(config.polarity, SignalPolarity::Negative);
        assert_eq!((config.sensor_width, config.sensor_height), (264, 256));
        assert_eq!(config.collection_name(OutputRole::Cds), "rawdata");
        assert_eq!(config.collection_name(OutputRole::ZeroSuppressed), "zsdata");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_role_index_matches_all() {
        for (position, role) in OutputRole::ALL.into_iter().enumerate() {
            assert_eq!(role.index(), position);
        }
    }

    #[test]
    fn test_builder() {
        let config = ReaderConfig::builder()
            .cds(false)
            .remove_markers(true)
            .marker_positions([67, 66, 1, 0])
            .polarity(SignalPolarity::Positive)
            .max_events(Some(5))
            .collection_name(OutputRole::FirstFrame, "raw1")
            .build();

        assert!(!config.cds);
        assert!(config.remove_markers);
        assert_eq!(config.max_events, Some(5));
        assert_eq!(config.first_frame_collection, "raw1");
        assert_eq!(config.second_frame_collection, "secondFrame");
        assert_eq!(config.marker_columns().unwrap().as_slice(), &[0, 1, 66, 67]);
    }

    #[test]
    fn test_removal_disabled_clears_markers() {
        let config = ReaderConfig::builder().remove_markers(false).build();
        assert!(config.marker_columns().unwrap().is_empty());
    }

    #[test]
    fn test_removal_without_positions_downgrades() {
        let config = ReaderConfig::builder()
            .remove_markers(true)
            .marker_positions(Vec::new())
            .build();
        assert!(config.validate().is_ok());
        assert!(config.marker_columns().unwrap().is_empty());
    }

    #[test]
    fn test_validation_failures() {
        let duplicated = ReaderConfig::builder()
            .collection_name(OutputRole::Cds, "firstFrame")
            .build();
        assert!(matches!(duplicated.validate(), Err(ReadoutError::Configuration(_))));

        let empty_name = ReaderConfig::builder()
            .collection_name(OutputRole::ZeroSuppressed, " ")
            .build();
        assert!(empty_name.validate().is_err());

        let no_size = ReaderConfig::builder().sensor_size(0, 256).build();
        assert!(no_size.validate().is_err());

        let marker_outside = ReaderConfig::builder()
            .remove_markers(true)
            .marker_positions([0, 300])
            .build();
        assert!(marker_outside.validate().is_err());

        let pixel_type = ReaderConfig {
            sparse_pixel_type: 2,
            ..ReaderConfig::default()
        };
        assert!(pixel_type.validate().is_err());
    }
}
