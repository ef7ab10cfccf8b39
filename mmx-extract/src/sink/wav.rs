//! WAV file channel sink
//!
//! One mono WAV file per channel. Every non-empty append is followed by a
//! writer flush so the header on disk matches the data after each transfer;
//! an interrupted run still leaves playable files.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use hound::{WavSpec, WavWriter};
use mmx_common::config::ChannelNaming;
use mmx_common::pcm::{CHANNELS, SAMPLE_BYTES};
use mmx_common::{PcmSpec, Sample24, SampleFormat};
use tracing::{debug, info};

use super::{channel_path, ChannelSink};
use crate::{Error, Result};

type FileWriter = WavWriter<BufWriter<File>>;

/// Ten WAV writers, one per absolute channel
pub struct WavChannelSink {
    writers: Vec<FileWriter>,
    paths: Vec<PathBuf>,
    format: SampleFormat,
    closed: bool,
}

impl std::fmt::Debug for WavChannelSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WavChannelSink")
            .field("paths", &self.paths)
            .field("format", &self.format)
            .field("closed", &self.closed)
            .finish()
    }
}

fn wav_spec(spec: &PcmSpec) -> WavSpec {
    WavSpec {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample(),
        sample_format: match spec.format {
            SampleFormat::Pcm24 => hound::SampleFormat::Int,
            SampleFormat::Float32 => hound::SampleFormat::Float,
        },
    }
}

impl WavChannelSink {
    /// Create `<dir>/<base>...wav` for all ten channels
    pub fn create(dir: &Path, base: &str, naming: ChannelNaming, spec: PcmSpec) -> Result<Self> {
        let paths = (0..CHANNELS)
            .map(|channel| channel_path(dir, base, channel, naming))
            .collect::<Result<Vec<_>>>()?;
        Self::create_at(paths, spec)
    }

    /// Create one writer per path, in channel order
    pub fn create_at(paths: Vec<PathBuf>, spec: PcmSpec) -> Result<Self> {
        if paths.len() != CHANNELS {
            return Err(Error::InvalidInput(format!(
                "Expected {} channel paths, got {}",
                CHANNELS,
                paths.len()
            )));
        }

        let wav_spec = wav_spec(&spec);
        let writers = paths
            .iter()
            .enumerate()
            .map(|(channel, path)| {
                debug!("Opening channel {} output {}", channel, path.display());
                WavWriter::create(path, wav_spec).map_err(|e| {
                    Error::sink(channel, format!("cannot create {}: {}", path.display(), e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            "Writing {} channels: {} Hz, {} bit {}",
            CHANNELS,
            spec.sample_rate,
            spec.bits_per_sample(),
            spec.format
        );

        Ok(Self {
            writers,
            paths,
            format: spec.format,
            closed: false,
        })
    }

    /// Output paths in channel order
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl ChannelSink for WavChannelSink {
    fn append(&mut self, channel: usize, bytes: &[u8]) -> Result<()> {
        if self.closed {
            return Err(Error::sink(channel, "sink already closed"));
        }
        if bytes.len() % SAMPLE_BYTES != 0 {
            return Err(Error::sink(
                channel,
                format!("{} bytes is not a whole number of samples", bytes.len()),
            ));
        }

        let format = self.format;
        let writer = self
            .writers
            .get_mut(channel)
            .ok_or_else(|| Error::sink(channel, "no such channel"))?;

        if bytes.is_empty() {
            return Ok(());
        }

        for chunk in bytes.chunks_exact(SAMPLE_BYTES) {
            let sample = Sample24::from_le_bytes([chunk[0], chunk[1], chunk[2]]);
            let written = match format {
                SampleFormat::Pcm24 => writer.write_sample(sample.to_i32()),
                SampleFormat::Float32 => writer.write_sample(sample.to_f32()),
            };
            written.map_err(|e| Error::sink(channel, e))?;
        }

        writer.flush().map_err(|e| Error::sink(channel, e))
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        for (channel, writer) in self.writers.drain(..).enumerate() {
            let samples = writer.len();
            writer.finalize().map_err(|e| Error::sink(channel, e))?;
            debug!("Closed channel {} ({} samples)", channel, samples);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_creates_ten_files() {
        let temp_dir = TempDir::new().unwrap();
        let mut sink =
            WavChannelSink::create(temp_dir.path(), "t", ChannelNaming::Index, PcmSpec::default())
                .unwrap();
        sink.close().unwrap();

        assert_eq!(sink.paths().len(), CHANNELS);
        for path in sink.paths() {
            assert!(path.exists(), "{} missing", path.display());
        }
    }

    #[test]
    fn test_rejects_partial_sample() {
        let temp_dir = TempDir::new().unwrap();
        let mut sink =
            WavChannelSink::create(temp_dir.path(), "t", ChannelNaming::Index, PcmSpec::default())
                .unwrap();
        let result = sink.append(1, &[0, 0, 0, 0]);
        assert!(matches!(result, Err(Error::Sink { channel: 1, .. })));
    }

    #[test]
    fn test_wrong_path_count() {
        let result = WavChannelSink::create_at(vec![PathBuf::from("a.wav")], PcmSpec::default());
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_open_failure_names_channel() {
        let temp_dir = TempDir::new().unwrap();
        let mut paths: Vec<PathBuf> = (0..CHANNELS)
            .map(|c| temp_dir.path().join(format!("t{}.wav", c)))
            .collect();
        paths[4] = temp_dir.path().join("missing").join("t4.wav");

        let result = WavChannelSink::create_at(paths, PcmSpec::default());
        assert!(matches!(result, Err(Error::Sink { channel: 4, .. })));
    }

    #[test]
    fn test_close_is_idempotent_and_final() {
        let temp_dir = TempDir::new().unwrap();
        let mut sink =
            WavChannelSink::create(temp_dir.path(), "t", ChannelNaming::Mixer, PcmSpec::default())
                .unwrap();
        sink.append(0, &[1, 2, 3]).unwrap();
        sink.close().unwrap();
        sink.close().unwrap();
        assert!(sink.append(0, &[]).is_err());
    }
}
