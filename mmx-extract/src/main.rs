//! MultiMix capture extractor (mmx-extract) - Main entry point
//!
//! Splits a captured bulk-transfer stream into ten mono 24-bit WAV files.
//!
//! ```bash
//! tshark -r capture.pcap -Y 'usb.endpoint_address == 0x86 and usb.dst == host' \
//!     -T fields -e usb.capdata | mmx-extract take1_
//! ```
//!
//! Writes `take1_0.wav` .. `take1_9.wav` and prints the running frame counter
//! after each transfer line.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use mmx_common::config::{ChannelNaming, ConfigOverrides, ExtractConfig, LoggingConfig};
use mmx_common::SampleFormat;
use mmx_extract::pipeline::{extract_to_wav, write_summary};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for mmx-extract
#[derive(Parser, Debug)]
#[command(name = "mmx-extract")]
#[command(about = "Split a MultiMix bulk capture into per-channel WAV files")]
#[command(version)]
struct Args {
    /// Base name for the channel files (<base><n>.wav)
    base: String,

    /// Capture file with one hex transfer per line (standard input if omitted)
    input: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, env = "MMX_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for the channel files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Sample rate written to the WAV headers
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Channel file naming: index (0..9) or mixer (ch1, ch3, ..., mixR)
    #[arg(long, value_name = "SCHEME")]
    naming: Option<ChannelNaming>,

    /// Output sample format: pcm24 or float32
    #[arg(long)]
    format: Option<SampleFormat>,

    /// Write a JSON run summary to this file
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,

    /// Do not print the frame counter
    #[arg(short, long)]
    quiet: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            sample_rate: self.sample_rate,
            output_dir: self.output_dir.clone(),
            channel_naming: self.naming,
            sample_format: self.format,
            progress: self.quiet.then_some(false),
            log_level: self.log_level.clone(),
        }
    }
}

/// Initialize tracing to stderr or the configured log file
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "mmx_extract={level},mmx_common={level}",
            level = logging.level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        None => {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ExtractConfig::load(args.config.as_deref(), args.overrides())
        .context("Failed to load configuration")?;
    init_tracing(&config.logging)?;

    info!(
        "mmx-extract {} ({} {}, built {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_PROFILE"),
        env!("BUILD_TIMESTAMP")
    );
    if let Some(path) = &config.config_file {
        info!("Config file: {}", path.display());
    }
    info!("Output directory: {}", config.output_dir.display());

    let stop = Arc::new(AtomicBool::new(false));
    tokio::spawn(shutdown_signal(Arc::clone(&stop)));

    let base = args.base.clone();
    let input = args.input.clone();
    let run_config = config.clone();
    let summary = tokio::task::spawn_blocking(move || -> Result<_> {
        let reader: Box<dyn BufRead> = match &input {
            Some(path) => {
                info!("Reading capture from {}", path.display());
                Box::new(BufReader::new(File::open(path).with_context(|| {
                    format!("Failed to open capture {}", path.display())
                })?))
            }
            None => {
                info!("Reading capture from standard input");
                Box::new(io::stdin().lock())
            }
        };

        let mut stdout = io::stdout().lock();
        let summary = extract_to_wav(reader, &base, &run_config, Some(stop), |progress| {
            if run_config.progress {
                writeln!(stdout, "{}", progress.frames).ok();
            }
        })
        .context("Extraction failed")?;
        Ok(summary)
    })
    .await
    .context("Extraction task failed")??;

    if summary.interrupted {
        warn!("Capture interrupted after {} frames", summary.frames);
    }

    if let Some(path) = &args.summary {
        write_summary(&summary, path)
            .with_context(|| format!("Failed to write summary {}", path.display()))?;
        info!("Summary written to {}", path.display());
    }

    Ok(())
}

/// Interrupt handler: request a stop at the next line boundary
///
/// A second Ctrl+C exits immediately.
async fn shutdown_signal(stop: Arc<AtomicBool>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, finishing current transfer");
        },
        _ = terminate => {
            info!("Received terminate signal, finishing current transfer");
        },
    }

    stop.store(true, Ordering::SeqCst);

    // A blocked stdin read only sees the stop flag at the next line
    if signal::ctrl_c().await.is_ok() {
        warn!("Second interrupt, exiting without finalizing outputs");
        std::process::exit(130);
    }
}
