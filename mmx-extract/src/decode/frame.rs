//! Bit-plane frame decoder
//!
//! Each byte of a frame carries one bit of five different samples: bit `b`
//! belongs to lane `b`. A sample is spread over the first 24 bytes of the
//! frame, most significant bit first. Reassembling a lane means reading its
//! bit-plane down the frame:
//!
//! ```text
//! byte:    0     1     2    ...   23    24..31
//! lane 0:  b0    b0    b0   ...   b0    (unused)
//! lane 1:  b1    b1    b1   ...   b1
//! ...
//! lane 4:  b4    b4    b4   ...   b4
//!          MSB                    LSB
//! ```
//!
//! Bits 5..7 of every byte and bytes 24..31 are not interpreted. Their
//! meaning is unknown from captures, so they are dropped as the device
//! layout was observed.

use mmx_common::pcm::{FRAME_BYTES, LANES, SAMPLE_BITS};
use mmx_common::Sample24;

use super::channels::ChannelBuffers;

/// One transport frame
pub type Frame = [u8; FRAME_BYTES];

/// Which half of the ten channels a frame feeds
///
/// Alternates with every completed frame, starting at `Even`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parity {
    /// Lanes map to channels 0..4
    Even,

    /// Lanes map to channels 5..9
    Odd,
}

impl Parity {
    /// Parity of the `n`-th completed frame (counting from 0)
    pub fn from_frame_index(n: u64) -> Self {
        if n & 1 == 0 {
            Parity::Even
        } else {
            Parity::Odd
        }
    }

    /// Parity of the following frame
    pub fn toggled(self) -> Self {
        match self {
            Parity::Even => Parity::Odd,
            Parity::Odd => Parity::Even,
        }
    }

    /// First absolute channel fed by this parity
    pub fn channel_base(self) -> usize {
        match self {
            Parity::Even => 0,
            Parity::Odd => LANES,
        }
    }

    /// Absolute channel for `lane`
    pub fn channel_for_lane(self, lane: usize) -> usize {
        self.channel_base() + lane
    }
}

/// Transpose the low five bit-planes of bytes 0..23 into five 24-bit words
///
/// Pure function of the frame contents.
pub fn decode_lanes(frame: &Frame) -> [Sample24; LANES] {
    let mut words = [0u32; LANES];

    for &byte in &frame[..SAMPLE_BITS] {
        for (lane, word) in words.iter_mut().enumerate() {
            *word = (*word << 1) | u32::from((byte >> lane) & 1);
        }
    }

    words.map(Sample24::new)
}

/// Five decoded lanes together with the parity that routes them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedFrame {
    pub parity: Parity,
    pub lanes: [Sample24; LANES],
}

impl DecodedFrame {
    /// `(absolute channel, sample)` pairs in lane order
    pub fn samples(&self) -> impl Iterator<Item = (usize, Sample24)> + '_ {
        self.lanes
            .iter()
            .enumerate()
            .map(move |(lane, &sample)| (self.parity.channel_for_lane(lane), sample))
    }
}

/// Decode one frame for the given parity
pub fn decode_frame(frame: &Frame, parity: Parity) -> DecodedFrame {
    DecodedFrame {
        parity,
        lanes: decode_lanes(frame),
    }
}

/// Decode one frame and append its samples to the owning channels
///
/// Every lane appends three little-endian bytes to channel
/// `lane + parity.channel_base()`.
pub fn decode_into(frame: &Frame, parity: Parity, buffers: &mut ChannelBuffers) -> DecodedFrame {
    let decoded = decode_frame(frame, parity);
    buffers.push_frame(&decoded);
    decoded
}
