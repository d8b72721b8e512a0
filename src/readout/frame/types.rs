//! Frame data types

use serde::{Deserialize, Serialize};

use crate::readout::common::error::{ReadoutError, Result};

/// A row-major flattened sensor snapshot of `width × height` samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T> Frame<T> {
    pub fn new(width: usize, height: usize, data: Vec<T>) -> Result<Self> {
        if width == 0 || height == 0 || data.len() != width * height {
            return Err(ReadoutError::InvalidDimensions {
                width,
                height,
                samples: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    pub(crate) fn from_parts_unchecked(width: usize, height: usize, data: Vec<T>) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self { width, height, data }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    pub fn pixel_count(&self) -> usize {
        self.data.len()
    }
}

/// Per-pixel rolling-shutter indicator.
///
/// `true` marks pixels whose reset fell between the first and second
/// sample, `false` those whose reset fell between the second and third.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotMap(Vec<bool>);

impl PivotMap {
    /// Builds a pivot map from the 0/1 values delivered by the board.
    pub fn from_raw(values: &[u8]) -> Result<Self> {
        values
            .iter()
            .enumerate()
            .map(|(pixel, &value)| match value {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(ReadoutError::Decode(format!(
                    "pivot value {} at pixel {} is not binary",
                    other, pixel
                ))),
            })
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.iter().copied()
    }
}

impl From<Vec<bool>> for PivotMap {
    fn from(values: Vec<bool>) -> Self {
        Self(values)
    }
}

/// Sign applied to the CDS combination. MimoTel signals are negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum SignalPolarity {
    Positive,
    #[default]
    Negative,
}

impl SignalPolarity {
    pub fn factor(self) -> i32 {
        match self {
            SignalPolarity::Positive => 1,
            SignalPolarity::Negative => -1,
        }
    }
}

impl TryFrom<i32> for SignalPolarity {
    type Error = ReadoutError;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            1 => Ok(SignalPolarity::Positive),
            -1 => Ok(SignalPolarity::Negative),
            other => Err(ReadoutError::Configuration(format!(
                "signal polarity must be +1 or -1, got {}",
                other
            ))),
        }
    }
}

impl From<SignalPolarity> for i32 {
    fn from(polarity: SignalPolarity) -> Self {
        polarity.factor()
    }
}

/// One zero-suppressed pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparsePixel {
    pub x: u16,
    pub y: u16,
    pub signal: i16,
}

impl SparsePixel {
    pub fn new(x: u16, y: u16, signal: i16) -> Self {
        Self { x, y, signal }
    }
}

/// The three raw samples of one board plus its pivot information.
///
/// All frames share one shape and the pivot map covers every pixel.
#[derive(Debug, Clone)]
pub struct ThreeSampleFrames {
    pub first: Frame<i16>,
    pub second: Frame<i16>,
    pub third: Frame<i16>,
    pub pivot: PivotMap,
    /// Pixel index at which the readout started, as reported by the board.
    pub pivot_pixel: u32,
}

impl ThreeSampleFrames {
    pub fn new(
        first: Frame<i16>,
        second: Frame<i16>,
        third: Frame<i16>,
        pivot: PivotMap,
        pivot_pixel: u32,
    ) -> Result<Self> {
        let shape = (first.width(), first.height());
        for (name, frame) in [("second", &second), ("third", &third)] {
            if (frame.width(), frame.height()) != shape {
                return Err(ReadoutError::Decode(format!(
                    "{} frame is {}x{}, expected {}x{}",
                    name,
                    frame.width(),
                    frame.height(),
                    shape.0,
                    shape.1
                )));
            }
        }
        if pivot.len() != first.pixel_count() {
            return Err(ReadoutError::Decode(format!(
                "pivot map has {} entries for {} pixels",
                pivot.len(),
                first.pixel_count()
            )));
        }
        Ok(Self {
            first,
            second,
            third,
            pivot,
            pivot_pixel,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_rejects_wrong_length() {
        let result = Frame::new(4, 3, vec![0i16; 11]);
        assert!(matches!(
            result,
            Err(ReadoutError::InvalidDimensions { width: 4, height: 3, samples: 11 })
        ));
    }

    #[test]
    fn test_frame_rejects_zero_dimension() {
        assert!(Frame::<i16>::new(0, 3, Vec::new()).is_err());
    }

    #[test]
    fn test_pivot_map_rejects_non_binary() {
        assert!(PivotMap::from_raw(&[0, 1, 1, 0]).is_ok());
        let err = PivotMap::from_raw(&[0, 2]).unwrap_err();
        assert!(matches!(err, ReadoutError::Decode(_)));
    }

    #[test]
    fn test_polarity_conversion() {
        assert_eq!(SignalPolarity::try_from(-1).unwrap(), SignalPolarity::Negative);
        assert_eq!(SignalPolarity::try_from(1).unwrap(), SignalPolarity::Positive);
        assert!(SignalPolarity::try_from(0).is_err());
        assert_eq!(i32::from(SignalPolarity::Negative), -1);
    }

    #[test]
    fn test_three_sample_frames_shape_mismatch() {
        let first = Frame::new(2, 2, vec![0i16; 4]).unwrap();
        let second = Frame::new(4, 1, vec![0i16; 4]).unwrap();
        let third = first.clone();
        let pivot = PivotMap::from(vec![false; 4]);
        let result = ThreeSampleFrames::new(first, second, third, pivot, 0);
        assert!(matches!(result, Err(ReadoutError::Decode(_))));
    }

    #[test]
    fn test_three_sample_frames_pivot_mismatch() {
        let first = Frame::new(2, 2, vec![0i16; 4]).unwrap();
        let pivot = PivotMap::from(vec![false; 3]);
        let result =
            ThreeSampleFrames::new(first.clone(), first.clone(), first, pivot, 0);
        assert!(matches!(result, Err(ReadoutError::Decode(_))));
    }
}
