use tracing::{debug, warn};

use crate::readout::common::error::{ReadoutError, Result};
use crate::readout::frame::{Frame, PivotMap, SparsePixel, ThreeSampleFrames};
use crate::readout::raw::types::BoardPayload;
use crate::readout::run::{BoardDescriptor, BoardMode};

/// Sample arrays a three-sample board delivers per event.
const THREE_SAMPLE_FRAMES: usize = 3;

#[derive(Debug, Clone)]
pub enum DecodedBoard {
    ThreeSample(ThreeSampleFrames),
    ZeroSuppressed(Vec<SparsePixel>),
}

/// Turns one board payload into frames or sparse pixels, checking that the
/// arrays are consistent with the board mode and the sensor geometry.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoardDecoder;

impl BoardDecoder {
    pub fn new() -> Self {
        Self
    }

    pub fn decode(&self, board: &BoardDescriptor, payload: BoardPayload) -> Result<DecodedBoard> {
        match board.mode {
            BoardMode::ThreeSample => self.decode_three_sample(board, payload).map(DecodedBoard::ThreeSample),
            BoardMode::ZeroSuppressed => self.decode_sparse(board, payload).map(DecodedBoard::ZeroSuppressed),
        }
    }

    fn decode_three_sample(&self, board: &BoardDescriptor, payload: BoardPayload) -> Result<ThreeSampleFrames> {
        let BoardPayload {
            adc,
            pivot,
            pivot_pixel,
            ..
        } = payload;

        let [first, second, third]: [Vec<i16>; THREE_SAMPLE_FRAMES] =
            adc.try_into().map_err(|arrays: Vec<Vec<i16>>| {
                ReadoutError::Decode(format!(
                    "sensor {}: expected {} sample arrays, found {}",
                    board.sensor_id,
                    THREE_SAMPLE_FRAMES,
                    arrays.len()
                ))
            })?;

        if first.len() != second.len() || first.len() != third.len() {
            return Err(ReadoutError::Decode(format!(
                "sensor {}: sample arrays have different sizes ({}, {}, {})",
                board.sensor_id,
                first.len(),
                second.len(),
                third.len()
            )));
        }

        let expected = board.width * board.height;
        if first.len() != expected {
            return Err(ReadoutError::Decode(format!(
                "sensor {}: {} samples per frame, expected {}x{}",
                board.sensor_id,
                first.len(),
                board.width,
                board.height
            )));
        }

        let pivot = PivotMap::from_raw(&pivot)?;
        debug!(
            sensor_id = board.sensor_id,
            pivot_pixel, "Decoded three-sample board"
        );

        ThreeSampleFrames::new(
            Frame::new(board.width, board.height, first)?,
            Frame::new(board.width, board.height, second)?,
            Frame::new(board.width, board.height, third)?,
            pivot,
            pivot_pixel,
        )
    }

    fn decode_sparse(&self, board: &BoardDescriptor, payload: BoardPayload) -> Result<Vec<SparsePixel>> {
        let BoardPayload { adc, x, y, .. } = payload;
        let signal = adc.into_iter().next().unwrap_or_default();

        if x.len() != y.len() || x.len() != signal.len() {
            return Err(ReadoutError::Decode(format!(
                "sensor {}: sparse arrays have different sizes (x {}, y {}, signal {})",
                board.sensor_id,
                x.len(),
                y.len(),
                signal.len()
            )));
        }

        let pixels = x
            .into_iter()
            .zip(y)
            .zip(signal)
            .filter_map(|((x, y), signal)| {
                if usize::from(x) >= board.width || usize::from(y) >= board.height {
                    warn!(
                        sensor_id = board.sensor_id,
                        x,
                        y,
                        "Found a sparse pixel outside the {}x{} sensor, discarding it",
                        board.width,
                        board.height
                    );
                    return None;
                }
                Some(SparsePixel::new(x, y, signal))
            })
            .collect::<Vec<_>>();

        debug!(
            sensor_id = board.sensor_id,
            "Board contains {} sparse pixels",
            pixels.len()
        );
        Ok(pixels)
    }
}
