//! Serial-Scope - Main Entry Point
//!
//! Headless render driver: polls the acquisition pipeline on the configured
//! period and prints each snapshot, while stdin lines are forwarded to the
//! device as commands.
//!
//! ```text
//! serial-scope [CONFIG] [--format text|json] [--json] [--mock] [--list-ports]
//! ```
//!
//! Type `quit` or close stdin to stop.

use anyhow::Context;
use clap::Parser;
use crossbeam_channel::{select, tick, unbounded};
use serial_scope::{
    backend::SerialTransport,
    config::ScopeConfig,
    frontend::{ConsoleRenderer, OutputFormat, PollClock},
    logging,
    pipeline::AcquisitionPipeline,
    AcquisitionState, ScopeError,
};
use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;

/// Command-line options
#[derive(Parser, Debug)]
#[command(
    name = "serial-scope",
    author,
    version,
    about = "Live multi-channel readout of a serial data stream"
)]
struct Args {
    /// Config file; the platform config directory is used when omitted
    config: Option<PathBuf>,

    /// Snapshot output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Shorthand for `--format json`
    #[arg(long, conflicts_with = "format")]
    json: bool,

    /// Use the synthetic mock transport instead of a serial port
    #[arg(long)]
    mock: bool,

    /// List available serial ports and exit
    #[arg(long)]
    list_ports: bool,
}

impl Args {
    fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.list_ports {
        for port in SerialTransport::list_ports() {
            println!("{}", port);
        }
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => ScopeConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ScopeConfig::load_or_default(None),
    };

    // Held until exit so buffered file logs are flushed
    let _log_guard = logging::init(&config.logging).context("Failed to initialize logging")?;

    tracing::info!("Starting serial-scope");

    let mut pipeline = open_pipeline(&config, args.mock)?;
    match pipeline.start() {
        Ok(()) => {}
        Err(ScopeError::Timeout(msg)) => {
            tracing::warn!("{}; still waiting for the device", msg);
        }
        Err(e) => {
            let _ = pipeline.stop();
            return Err(e).context("Failed to start acquisition");
        }
    }

    let result = run_consumer(&mut pipeline, &config, args.output_format());

    tracing::info!("Shutting down...");
    match pipeline.stop() {
        Ok(stats) => tracing::info!(
            "Decoded {} frames ({} bytes, {} idle timeouts)",
            stats.frames_decoded,
            stats.bytes_read,
            stats.idle_timeouts
        ),
        Err(e) => tracing::warn!("Acquisition ended with error: {}", e),
    }

    result
}

fn open_pipeline(config: &ScopeConfig, mock: bool) -> anyhow::Result<AcquisitionPipeline> {
    if mock {
        return open_mock_pipeline(config);
    }
    AcquisitionPipeline::open(config)
        .with_context(|| format!("Failed to open {}", config.serial.port))
}

#[cfg(feature = "mock-transport")]
fn open_mock_pipeline(config: &ScopeConfig) -> anyhow::Result<AcquisitionPipeline> {
    use serial_scope::backend::{FrameDecoder, MockPattern, MockTransport};

    let width = config.acquisition.validate()?;
    let decoder = FrameDecoder::with_width(width, config.acquisition.num_channels);
    let transport = MockTransport::new(decoder, Duration::from_millis(10))
        .with_pattern(
            1,
            MockPattern::Counter {
                step: 1.0,
                min: -100.0,
                max: 100.0,
            },
        )
        .with_pattern(
            2,
            MockPattern::Square {
                period: 2.0,
                amplitude: 50.0,
            },
        );
    tracing::info!("Using mock transport");
    Ok(AcquisitionPipeline::with_transport(
        &config.acquisition,
        Box::new(transport),
    )?)
}

#[cfg(not(feature = "mock-transport"))]
fn open_mock_pipeline(_config: &ScopeConfig) -> anyhow::Result<AcquisitionPipeline> {
    anyhow::bail!("--mock requires building with the `mock-transport` feature")
}

/// Render on every tick and forward stdin lines until `quit` or EOF
fn run_consumer(
    pipeline: &mut AcquisitionPipeline,
    config: &ScopeConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let (line_tx, line_rx) = unbounded::<String>();
    std::thread::Builder::new()
        .name("stdin".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if line_tx.send(line).is_err() {
                    break;
                }
            }
        })
        .context("Failed to spawn stdin reader")?;

    let ticker = tick(Duration::from_millis(config.display.poll_interval_ms.max(1)));
    let mut clock = PollClock::new();
    let mut renderer = ConsoleRenderer::new(std::io::stdout(), format, config.display.clone());
    let mut reported_stop = false;

    loop {
        select! {
            recv(ticker) -> _ => {
                let interval = clock.tick();
                renderer.render(&pipeline.take_snapshot(), interval)?;

                if !reported_stop && pipeline.state() == AcquisitionState::Stopped {
                    reported_stop = true;
                    let reason = pipeline.last_error().unwrap_or_else(|| "stopped".to_string());
                    tracing::warn!("Acquisition is no longer running ({}); showing last data", reason);
                }
            }
            recv(line_rx) -> line => {
                let Ok(line) = line else { break };
                let command = line.trim_end_matches(['\r', '\n']);
                if command.trim() == "quit" {
                    break;
                }
                if !command.is_empty() {
                    if let Err(e) = pipeline.send_command(command) {
                        tracing::warn!("Command {:?} not sent: {}", command, e);
                    }
                }
            }
        }
    }

    Ok(())
}
