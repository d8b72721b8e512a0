use tracing::{debug, error, info, instrument, warn};

use crate::readout::common::error::{ReadoutError, Result};
use crate::readout::config::ReaderConfig;
use crate::readout::conversions::event_converter::EventConverter;
use crate::readout::frame::MarkerColumns;
use crate::readout::raw::{EventHeader, EventSource, StreamEvent, SubEvent};
use crate::readout::run::RunDescriptor;
use crate::readout::sink::{EventSink, OutputEvent};

/// Data events between two progress messages.
const PROGRESS_INTERVAL: usize = 10;

/// Why the pipeline stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Termination {
    #[default]
    StreamExhausted,
    EndOfRun,
    EventCap,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    /// Data events taken from the stream, converted or not.
    pub data_events_read: usize,
    pub events_converted: usize,
    pub events_skipped: usize,
    pub termination: Termination,
}

enum PipelineState {
    AwaitingRun,
    InRun(RunDescriptor),
    Finished,
}

/// Pulls events from `S`, converts them and forwards the results to `K`.
pub struct RawToRecordsPipeline<S: EventSource, K: EventSink> {
    source: S,
    sink: K,
    config: ReaderConfig,
    converter: EventConverter,
    state: PipelineState,
    summary: ConversionSummary,
}

impl<S: EventSource, K: EventSink> RawToRecordsPipeline<S, K> {
    pub fn new(source: S, sink: K, config: ReaderConfig) -> Result<Self> {
        config.validate()?;
        let converter = EventConverter::new(&config, config.marker_columns()?);

        Ok(Self {
            source,
            sink,
            config,
            converter,
            state: PipelineState::AwaitingRun,
            summary: ConversionSummary::default(),
        })
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn markers(&self) -> &MarkerColumns {
        self.converter.markers()
    }

    pub fn run_descriptor(&self) -> Option<&RunDescriptor> {
        match &self.state {
            PipelineState::InRun(run) => Some(run),
            PipelineState::AwaitingRun | PipelineState::Finished => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, PipelineState::Finished)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn into_sink(self) -> K {
        self.sink
    }

    /// Processes events until end-of-run, the event cap or the end of the
    /// stream. Only fatal errors are returned; events that fail to decode
    /// are logged and counted as skipped.
    #[instrument(skip(self))]
    pub fn run(&mut self) -> Result<ConversionSummary> {
        info!(
            max_events = ?self.config.max_events,
            markers = self.converter.markers().len(),
            "Starting readout conversion"
        );

        while !self.is_finished() {
            let event = match self.source.next_event() {
                Ok(Some(event)) => event,
                Ok(None) => {
                    warn!("Input stream ended without an end-of-run event");
                    self.finish(Termination::StreamExhausted);
                    break;
                }
                Err(e) if e.is_recoverable() => {
                    warn!("Skipping unreadable event: {}", e);
                    self.summary.events_skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            self.handle_event(event)?;
        }

        info!(
            read = self.summary.data_events_read,
            converted = self.summary.events_converted,
            skipped = self.summary.events_skipped,
            termination = ?self.summary.termination,
            "Readout conversion finished"
        );
        Ok(self.summary.clone())
    }

    fn handle_event(&mut self, event: StreamEvent) -> Result<()> {
        match event {
            StreamEvent::BeginRun { header, sub_events } => self.begin_run(header, &sub_events),
            StreamEvent::Data { header, sub_events } => self.data_event(header, sub_events),
            StreamEvent::EndRun { header } => {
                if matches!(self.state, PipelineState::AwaitingRun) {
                    warn!(
                        "End-of-run of run {} arrived before any begin-of-run, stopping",
                        header.run_number
                    );
                    self.finish(Termination::EndOfRun);
                    return Ok(());
                }
                debug!("Found an end-of-run, forwarding the terminal event");
                self.end_run(header, Termination::EndOfRun)
            }
        }
    }

    fn begin_run(&mut self, header: EventHeader, sub_events: &[SubEvent]) -> Result<()> {
        if let PipelineState::InRun(run) = &self.state {
            warn!(
                "Ignoring begin-of-run of run {} while run {} is being converted",
                header.run_number, run.run_number
            );
            return Ok(());
        }

        debug!("Found a begin-of-run, processing the run header");
        let run = {
            let _span = tracing::info_span!("describe_run", run_number = header.run_number).entered();
            RunDescriptor::from_begin_run(
                &header,
                sub_events,
                &self.config,
                self.converter.markers(),
            )?
        };
        info!(
            run_number = run.run_number,
            boards = run.board_count(),
            mode = %run.mode,
            "Run started"
        );

        self.sink.begin_run(&run)?;
        self.state = PipelineState::InRun(run);
        Ok(())
    }

    fn data_event(&mut self, header: EventHeader, sub_events: Vec<SubEvent>) -> Result<()> {
        let PipelineState::InRun(run) = &self.state else {
            warn!(
                "Event number {} arrived before the begin-of-run, skipping it",
                header.event_number
            );
            self.summary.events_skipped += 1;
            return Ok(());
        };

        if self.cap_reached() {
            return self.end_run(header, Termination::EventCap);
        }

        self.summary.data_events_read += 1;
        if self.summary.data_events_read % PROGRESS_INTERVAL == 0 {
            info!(
                "Processing event {:>6} in run {:06} (Total = {:>10})",
                header.event_number, header.run_number, self.summary.data_events_read
            );
        }

        match self.converter.convert(run, header, sub_events) {
            Ok(event) => {
                let _span = tracing::info_span!("write_event").entered();
                self.sink.process_event(OutputEvent::Data(event))?;
                self.summary.events_converted += 1;
            }
            Err(e @ ReadoutError::MalformedEvent(_)) => {
                warn!("{}. Skipping event {}", e, header.event_number);
                self.summary.events_skipped += 1;
            }
            Err(e) if e.is_recoverable() => {
                error!("{}. Skipping event {}", e, header.event_number);
                self.summary.events_skipped += 1;
            }
            Err(e) => return Err(e),
        }

        if self.cap_reached() {
            debug!("Event cap reached, closing the run");
            return self.end_run(header, Termination::EventCap);
        }
        Ok(())
    }

    fn end_run(&mut self, header: EventHeader, termination: Termination) -> Result<()> {
        self.sink.process_event(OutputEvent::EndOfRun(header))?;
        self.finish(termination);
        Ok(())
    }

    fn finish(&mut self, termination: Termination) {
        self.summary.termination = termination;
        self.state = PipelineState::Finished;
    }

    fn cap_reached(&self) -> bool {
        self.config
            .max_events
            .is_some_and(|max| self.summary.data_events_read >= max)
    }
}
