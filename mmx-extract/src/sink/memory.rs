//! In-memory channel sink

use mmx_common::pcm::{CHANNELS, SAMPLE_BYTES};
use mmx_common::Sample24;

use super::ChannelSink;
use crate::{Error, Result};

/// Collects every channel's bytes in memory
#[derive(Debug, Clone)]
pub struct MemorySink {
    channels: Vec<Vec<u8>>,
    appends: Vec<usize>,
    closed: bool,
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            channels: vec![Vec::new(); CHANNELS],
            appends: vec![0; CHANNELS],
            closed: false,
        }
    }

    /// All bytes delivered to `channel` (empty when out of range)
    pub fn channel(&self, channel: usize) -> &[u8] {
        self.channels.get(channel).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Delivered bytes of `channel` decoded as sample words
    pub fn samples(&self, channel: usize) -> Vec<Sample24> {
        self.channel(channel)
            .chunks_exact(SAMPLE_BYTES)
            .map(|c| Sample24::from_le_bytes([c[0], c[1], c[2]]))
            .collect()
    }

    /// Number of append calls received for `channel`, including empty ones
    pub fn append_count(&self, channel: usize) -> usize {
        self.appends.get(channel).copied().unwrap_or(0)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl ChannelSink for MemorySink {
    fn append(&mut self, channel: usize, bytes: &[u8]) -> Result<()> {
        if self.closed {
            return Err(Error::sink(channel, "sink already closed"));
        }
        let buffer = self
            .channels
            .get_mut(channel)
            .ok_or_else(|| Error::sink(channel, "no such channel"))?;
        buffer.extend_from_slice(bytes);
        self.appends[channel] += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut sink = MemorySink::new();
        sink.append(2, &[1, 2, 3]).unwrap();
        sink.append(2, &[4, 5, 6]).unwrap();
        assert_eq!(sink.channel(2), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(
            sink.samples(2),
            vec![Sample24::new(0x030201), Sample24::new(0x060504)]
        );
    }

    #[test]
    fn test_append_after_close_fails() {
        let mut sink = MemorySink::new();
        sink.close().unwrap();
        assert!(matches!(sink.append(0, &[]), Err(Error::Sink { channel: 0, .. })));
    }

    #[test]
    fn test_unknown_channel_fails() {
        let mut sink = MemorySink::new();
        assert!(sink.append(CHANNELS, &[0, 0, 0]).is_err());
        assert!(sink.channel(CHANNELS).is_empty());
    }
}
