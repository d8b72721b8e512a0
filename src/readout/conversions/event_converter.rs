use tracing::{debug, instrument};

use crate::readout::common::error::{ReadoutError, Result};
use crate::readout::config::{OutputRole, ReaderConfig};
use crate::readout::frame::{MarkerColumns, SignalPolarity, ThreeSampleFrames};
use crate::readout::frame::remap_sparse_pixels;
use crate::readout::raw::{BoardDecoder, BoardPayload, DecodedBoard, EventHeader, SubEvent};
use crate::readout::run::{BoardDescriptor, RunDescriptor};
use crate::readout::sink::{ConvertedEvent, GroupRecords, OutputGroup, RawFrameRecord, SparseFrameRecord};

/// Per-event records, one vector per output role.
#[derive(Default)]
struct EventRecords {
    first: Vec<RawFrameRecord>,
    second: Vec<RawFrameRecord>,
    third: Vec<RawFrameRecord>,
    cds: Vec<RawFrameRecord>,
    sparse: Vec<SparseFrameRecord>,
}

/// Converts the detector sub-events of one data event into output groups.
///
/// Either every board of the event converts or the whole event fails, so
/// no partial output reaches the sink.
#[derive(Debug, Clone)]
pub struct EventConverter {
    decoder: BoardDecoder,
    markers: MarkerColumns,
    polarity: SignalPolarity,
    cds: bool,
    pixel_type: u32,
    /// Collection names indexed by `OutputRole::index`.
    names: [String; 5],
}

impl EventConverter {
    pub fn new(config: &ReaderConfig, markers: MarkerColumns) -> Self {
        Self {
            decoder: BoardDecoder::new(),
            markers,
            polarity: config.polarity,
            cds: config.cds,
            pixel_type: config.sparse_pixel_type,
            names: OutputRole::ALL.map(|role| config.collection_name(role).to_string()),
        }
    }

    pub fn markers(&self) -> &MarkerColumns {
        &self.markers
    }

    #[instrument(skip_all, fields(event = header.event_number))]
    pub fn convert(
        &self,
        run: &RunDescriptor,
        header: EventHeader,
        sub_events: Vec<SubEvent>,
    ) -> Result<ConvertedEvent> {
        let mut records = EventRecords::default();
        let mut detector_seen = false;
        let mut sensor_offset = 0;

        for (producer, sub_event) in sub_events.into_iter().enumerate() {
            debug!("Processing producer number {}", producer);
            let detector = match sub_event {
                SubEvent::Detector(detector) => detector,
                SubEvent::OtherProducer(other) => {
                    debug!("Not a detector event, very likely a {} event", other.producer);
                    continue;
                }
            };
            detector_seen = true;

            let board_count = detector.boards.len();
            for (index, payload) in detector.boards.into_iter().enumerate() {
                let sensor = sensor_offset + index;
                let board = run.board(sensor).ok_or_else(|| {
                    ReadoutError::Decode(format!(
                        "board {} not declared at begin-of-run ({} boards)",
                        sensor,
                        run.board_count()
                    ))
                })?;
                self.convert_board(board, payload, &mut records)?;
            }
            sensor_offset += board_count;
        }

        if !detector_seen {
            return Err(ReadoutError::MalformedEvent(format!(
                "event {} does not contain any detector data",
                header.event_number
            )));
        }

        Ok(ConvertedEvent {
            header,
            groups: self.assemble_groups(run, records),
        })
    }

    fn convert_board(
        &self,
        board: &BoardDescriptor,
        payload: BoardPayload,
        records: &mut EventRecords,
    ) -> Result<()> {
        let _span = tracing::debug_span!("board", sensor_id = board.sensor_id).entered();

        match self.decoder.decode(board, payload)? {
            DecodedBoard::ThreeSample(frames) => self.convert_three_sample(board, frames, records),
            DecodedBoard::ZeroSuppressed(pixels) => {
                let pixels = remap_sparse_pixels(pixels, &self.markers);
                records.sparse.push(SparseFrameRecord {
                    sensor_id: board.sensor_id,
                    bounds: board.bounds,
                    pixel_type: self.pixel_type,
                    pixels,
                });
            }
        }
        Ok(())
    }

    fn convert_three_sample(
        &self,
        board: &BoardDescriptor,
        frames: ThreeSampleFrames,
        records: &mut EventRecords,
    ) {
        // The pivot map counts marker columns, so CDS runs on the full frames.
        let cds = self.cds.then(|| frames.cds(self.polarity));

        let ThreeSampleFrames {
            first,
            second,
            third,
            pivot_pixel,
            ..
        } = frames;
        let record = |frame| RawFrameRecord::new(board, pivot_pixel, frame);

        records.first.push(record(first.strip_markers(&self.markers)));
        records.second.push(record(second.strip_markers(&self.markers)));
        records.third.push(record(third.strip_markers(&self.markers)));
        if let Some(cds) = cds {
            records.cds.push(record(cds.strip_markers(&self.markers)));
        }
    }

    fn assemble_groups(&self, run: &RunDescriptor, records: EventRecords) -> Vec<OutputGroup> {
        let EventRecords {
            first,
            second,
            third,
            cds,
            sparse,
        } = records;

        let mut groups = Vec::with_capacity(OutputRole::ALL.len());
        if run.has_dense_groups() {
            groups.push(self.group(OutputRole::FirstFrame, GroupRecords::Dense(first)));
            groups.push(self.group(OutputRole::SecondFrame, GroupRecords::Dense(second)));
            groups.push(self.group(OutputRole::ThirdFrame, GroupRecords::Dense(third)));
            if self.cds {
                groups.push(self.group(OutputRole::Cds, GroupRecords::Dense(cds)));
            }
        }
        if run.has_sparse_group() {
            groups.push(self.group(OutputRole::ZeroSuppressed, GroupRecords::Sparse(sparse)));
        }
        groups
    }

    fn group(&self, role: OutputRole, records: GroupRecords) -> OutputGroup {
        OutputGroup {
            role,
            name: self.names[role.index()].clone(),
            records,
        }
    }
}
