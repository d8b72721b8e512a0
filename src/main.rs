use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mimotel_readout_rs::logger;
use mimotel_readout_rs::readout::{
    ConversionSummary, EventSink, EventSource, JsonLinesSink, JsonLinesSource, RawToRecordsPipeline,
    ReaderConfig, load_config,
};

use tracing::info;

#[derive(Parser)]
#[command(name = "mimotel-readout")]
#[command(about = "Convert a MimoTel raw readout stream into per-sensor records", long_about = None)]
struct Args {
    /// Raw event stream, one JSON event per line
    #[arg(long)]
    input: PathBuf,

    /// Record stream to write; only the summary is logged when omitted
    #[arg(long)]
    output: Option<PathBuf>,

    /// Reader configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stop after this many data events, overriding the configuration
    #[arg(long)]
    max_events: Option<usize>,

    /// Default log level when RUST_LOG is unset
    #[arg(long, env = "MIMOTEL_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init(&args.log_level);

    info!("Starting mimotel-readout...");

    let mut config = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => ReaderConfig::default(),
    };
    if args.max_events.is_some() {
        config.max_events = args.max_events;
    }

    info!("CDS calculation: {}", if config.cds { "enabled" } else { "disabled" });
    info!(
        "Marker removal: {}",
        if config.remove_markers { "enabled" } else { "disabled" }
    );

    let source = JsonLinesSource::open(&args.input)
        .with_context(|| format!("opening input {}", args.input.display()))?;

    let summary = match &args.output {
        Some(path) => {
            let sink = JsonLinesSink::create(path)
                .with_context(|| format!("creating output {}", path.display()))?;
            let (summary, sink) = convert(source, sink, config)?;
            sink.into_inner().context("flushing output")?;
            summary
        }
        None => convert(source, JsonLinesSink::new(std::io::sink()), config)?.0,
    };

    info!(
        read = summary.data_events_read,
        converted = summary.events_converted,
        skipped = summary.events_skipped,
        termination = ?summary.termination,
        "Conversion finished"
    );

    Ok(())
}

fn convert<S, K>(source: S, sink: K, config: ReaderConfig) -> Result<(ConversionSummary, K)>
where
    S: EventSource,
    K: EventSink,
{
    let mut pipeline =
        RawToRecordsPipeline::new(source, sink, config).context("invalid reader configuration")?;
    let summary = pipeline.run().context("conversion failed")?;
    Ok((summary, pipeline.into_sink()))
}
