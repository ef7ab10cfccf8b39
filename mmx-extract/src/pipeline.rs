//! Extraction driver
//!
//! Reads capture lines, feeds their bytes to the frame assembler and flushes
//! all ten channels at every transfer boundary. Strictly sequential: frame
//! order, parity alternation and flush order all depend on it.

use std::io::BufRead;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use mmx_common::config::ExtractConfig;
use mmx_common::pcm::CHANNELS;
use mmx_common::PcmSpec;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::decode::FrameAssembler;
use crate::sink::{ChannelSink, WavChannelSink};
use crate::source::{HexDumpReader, HexLine};
use crate::Result;

/// Progress after one transfer line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineProgress {
    /// 1-based line number in the capture
    pub line_number: usize,

    /// Payload bytes on this line
    pub bytes: usize,

    /// Running count of completed frames
    pub frames: u64,
}

/// Totals for one extraction run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractSummary {
    /// Transfer lines processed (comments excluded)
    pub lines: usize,

    /// Comment lines skipped
    pub comment_lines: usize,

    /// Payload bytes read
    pub bytes: u64,

    /// Complete frames decoded
    pub frames: u64,

    /// Trailing bytes dropped at end of input
    pub discarded_bytes: usize,

    /// Samples delivered to each channel
    pub samples_per_channel: Vec<u64>,

    /// Run stopped early by a stop request
    pub interrupted: bool,
}

/// Drives one capture through the assembler into a sink
pub struct Extractor<S: ChannelSink> {
    assembler: FrameAssembler,
    sink: S,
    stop: Option<Arc<AtomicBool>>,
}

impl<S: ChannelSink> Extractor<S> {
    pub fn new(sink: S) -> Self {
        Self {
            assembler: FrameAssembler::new(),
            sink,
            stop: None,
        }
    }

    /// Stop at the next line boundary once `flag` is set
    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop = Some(flag);
        self
    }

    fn stop_requested(&self) -> bool {
        self.stop
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Process the whole capture
    ///
    /// `on_line` runs after every transfer line has been flushed. The sink is
    /// closed on normal end of input and on a stop request; any error aborts
    /// the run immediately.
    ///
    /// Returns the run summary and the closed sink.
    pub fn run<R, F>(mut self, reader: R, mut on_line: F) -> Result<(ExtractSummary, S)>
    where
        R: BufRead,
        F: FnMut(&LineProgress),
    {
        let mut lines = HexDumpReader::new(reader);
        let mut summary = ExtractSummary {
            lines: 0,
            comment_lines: 0,
            bytes: 0,
            frames: 0,
            discarded_bytes: 0,
            samples_per_channel: vec![0; CHANNELS],
            interrupted: false,
        };

        loop {
            if self.stop_requested() {
                warn!("Stop requested, finishing after line {}", lines.lines_read());
                summary.interrupted = true;
                break;
            }

            let Some(item) = lines.next() else {
                break;
            };
            let source_line = item?;

            let bytes = match source_line.line {
                HexLine::Comment => {
                    summary.comment_lines += 1;
                    continue;
                }
                HexLine::Data(bytes) => bytes,
            };

            let completed = self.assembler.push_bytes(&bytes);
            for (channel, count) in summary.samples_per_channel.iter_mut().enumerate() {
                *count += self.assembler.buffers().pending_samples(channel) as u64;
            }
            self.assembler.end_line(&mut self.sink)?;

            summary.lines += 1;
            summary.bytes += bytes.len() as u64;

            debug!(
                line = source_line.number,
                bytes = bytes.len(),
                frames = completed,
                "Transfer flushed"
            );

            on_line(&LineProgress {
                line_number: source_line.number,
                bytes: bytes.len(),
                frames: self.assembler.frame_count(),
            });
        }

        let stats = self.assembler.finish(&mut self.sink)?;
        summary.frames = stats.frames;
        summary.discarded_bytes = stats.discarded_bytes;

        info!(
            "Extraction complete: {} lines, {} frames, {} trailing bytes discarded",
            summary.lines, summary.frames, summary.discarded_bytes
        );

        Ok((summary, self.sink))
    }
}

/// Extract a capture into ten WAV files as configured
///
/// Files are named from `base` inside `config.output_dir`, which is created
/// if missing.
pub fn extract_to_wav<R, F>(
    reader: R,
    base: &str,
    config: &ExtractConfig,
    stop: Option<Arc<AtomicBool>>,
    on_line: F,
) -> Result<ExtractSummary>
where
    R: BufRead,
    F: FnMut(&LineProgress),
{
    std::fs::create_dir_all(&config.output_dir)?;

    let spec = PcmSpec::mono(config.sample_rate, config.sample_format);
    let sink = WavChannelSink::create(&config.output_dir, base, config.channel_naming, spec)?;

    let mut extractor = Extractor::new(sink);
    if let Some(flag) = stop {
        extractor = extractor.with_stop_flag(flag);
    }

    let (summary, _sink) = extractor.run(reader, on_line)?;
    Ok(summary)
}

/// Write the summary as pretty-printed JSON
pub fn write_summary(summary: &ExtractSummary, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), summary)
        .map_err(std::io::Error::from)?;
    Ok(())
}
