//! Per-channel sample buffers
//!
//! Ten append-only byte buffers holding little-endian 24-bit samples decoded
//! since the last flush. A flush hands every buffer to the sink in channel
//! order and truncates it, keeping the allocation for the next transfer.

use mmx_common::pcm::{CHANNELS, SAMPLE_BYTES};
use mmx_common::Sample24;

use super::frame::DecodedFrame;
use crate::sink::ChannelSink;
use crate::{Error, Result};

/// Encoded samples awaiting delivery, one buffer per absolute channel
#[derive(Debug, Clone, Default)]
pub struct ChannelBuffers {
    buffers: [Vec<u8>; CHANNELS],
}

impl ChannelBuffers {
    /// Ten empty buffers
    pub fn new() -> Self {
        Self::default()
    }

    /// Ten empty buffers, each reserving room for `samples` samples
    pub fn with_capacity(samples: usize) -> Self {
        Self {
            buffers: std::array::from_fn(|_| Vec::with_capacity(samples * SAMPLE_BYTES)),
        }
    }

    /// Append one sample to `channel`
    pub fn push_sample(&mut self, channel: usize, sample: Sample24) -> Result<()> {
        let buffer = self.buffers.get_mut(channel).ok_or_else(|| {
            Error::InvalidInput(format!("Channel {} out of range 0..{}", channel, CHANNELS))
        })?;
        buffer.extend_from_slice(&sample.to_le_bytes());
        Ok(())
    }

    /// Append all five lanes of a decoded frame to their channels
    pub fn push_frame(&mut self, frame: &DecodedFrame) {
        // Parity routing always lands inside 0..CHANNELS
        for (channel, sample) in frame.samples() {
            self.buffers[channel].extend_from_slice(&sample.to_le_bytes());
        }
    }

    /// Bytes pending for `channel`
    pub fn pending(&self, channel: usize) -> Option<&[u8]> {
        self.buffers.get(channel).map(Vec::as_slice)
    }

    /// Number of samples pending for `channel` (0 when out of range)
    pub fn pending_samples(&self, channel: usize) -> usize {
        self.pending(channel).map_or(0, |b| b.len() / SAMPLE_BYTES)
    }

    /// Total bytes pending across all channels
    pub fn pending_bytes(&self) -> usize {
        self.buffers.iter().map(Vec::len).sum()
    }

    /// True when no channel has pending samples
    pub fn is_empty(&self) -> bool {
        self.buffers.iter().all(Vec::is_empty)
    }

    /// Remove and return the pending bytes of `channel`
    pub fn take(&mut self, channel: usize) -> Result<Vec<u8>> {
        let buffer = self.buffers.get_mut(channel).ok_or_else(|| {
            Error::InvalidInput(format!("Channel {} out of range 0..{}", channel, CHANNELS))
        })?;
        Ok(std::mem::take(buffer))
    }

    /// Deliver every channel's pending bytes to `sink`, then clear them
    ///
    /// Channels are delivered in order 0..9, including empty ones. A sink
    /// failure stops the flush; the failing channel keeps its bytes.
    pub fn flush_into<S: ChannelSink + ?Sized>(&mut self, sink: &mut S) -> Result<()> {
        for (channel, buffer) in self.buffers.iter_mut().enumerate() {
            sink.append(channel, buffer)?;
            buffer.clear();
        }
        Ok(())
    }
}
