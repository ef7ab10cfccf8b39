//! Streaming frame assembler
//!
//! Collects bytes into 32-byte frames, decodes each complete frame with the
//! parity of its position in the stream and routes the samples into the
//! channel buffers. The pending bytes and the frame counter survive transfer
//! boundaries: a frame may start in one line and finish in the next.

use mmx_common::pcm::FRAME_BYTES;
use tracing::{debug, trace, warn};

use super::channels::ChannelBuffers;
use super::frame::{decode_into, Frame, Parity};
use crate::sink::ChannelSink;
use crate::Result;

/// Final counters of an assembler run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AssemblerStats {
    /// Complete frames decoded
    pub frames: u64,

    /// Trailing bytes that never formed a complete frame
    pub discarded_bytes: usize,
}

/// Frame assembler state for one extraction run
#[derive(Debug, Clone)]
pub struct FrameAssembler {
    /// Bytes of the frame currently being collected
    pending: Frame,

    /// Number of valid bytes in `pending`
    pending_len: usize,

    /// Frames completed so far (never reset)
    frame_count: u64,

    /// Decoded samples awaiting the next flush
    buffers: ChannelBuffers,
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameAssembler {
    /// Fresh assembler: no pending bytes, frame counter at 0 (even parity)
    pub fn new() -> Self {
        Self {
            pending: [0u8; FRAME_BYTES],
            pending_len: 0,
            frame_count: 0,
            buffers: ChannelBuffers::new(),
        }
    }

    /// Feed one byte
    ///
    /// Returns the parity of the frame this byte completed, if any.
    pub fn push_byte(&mut self, byte: u8) -> Option<Parity> {
        self.pending[self.pending_len] = byte;
        self.pending_len += 1;

        if self.pending_len < FRAME_BYTES {
            return None;
        }

        let parity = Parity::from_frame_index(self.frame_count);
        let decoded = decode_into(&self.pending, parity, &mut self.buffers);
        trace!(frame = self.frame_count, ?parity, lanes = ?decoded.lanes, "Decoded frame");

        self.frame_count += 1;
        self.pending_len = 0;
        Some(parity)
    }

    /// Feed a run of bytes, returning the number of frames completed
    pub fn push_bytes(&mut self, bytes: &[u8]) -> usize {
        let mut completed = 0;
        for &byte in bytes {
            if self.push_byte(byte).is_some() {
                completed += 1;
            }
        }
        completed
    }

    /// Transfer boundary: hand all ten channel buffers to the sink
    ///
    /// Runs whether or not the line completed a frame. Pending frame bytes
    /// are kept for the next line.
    pub fn end_line<S: ChannelSink + ?Sized>(&mut self, sink: &mut S) -> Result<()> {
        self.buffers.flush_into(sink)
    }

    /// End of stream: flush what is buffered, drop the partial frame and
    /// close the sink
    pub fn finish<S: ChannelSink + ?Sized>(mut self, sink: &mut S) -> Result<AssemblerStats> {
        self.buffers.flush_into(sink)?;

        if self.pending_len > 0 {
            if self.frame_count == 0 {
                warn!(
                    "Input ended before the first complete frame ({} bytes discarded)",
                    self.pending_len
                );
            } else {
                debug!(
                    "Discarding {} trailing bytes after frame {}",
                    self.pending_len, self.frame_count
                );
            }
        }

        sink.close()?;

        Ok(AssemblerStats {
            frames: self.frame_count,
            discarded_bytes: self.pending_len,
        })
    }

    /// Frames completed so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Parity the next completed frame will use
    pub fn parity(&self) -> Parity {
        Parity::from_frame_index(self.frame_count)
    }

    /// Bytes collected toward the next frame
    pub fn pending_len(&self) -> usize {
        self.pending_len
    }

    /// Decoded samples awaiting the next flush
    pub fn buffers(&self) -> &ChannelBuffers {
        &self.buffers
    }
}
