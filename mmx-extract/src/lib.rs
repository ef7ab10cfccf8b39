//! # MultiMix Capture Extractor Library (mmx-extract)
//!
//! Splits a bulk-endpoint capture of the MultiMix USB interface into ten
//! independent mono 24-bit PCM streams.
//!
//! **Pipeline:** hex capture lines → byte frames (32 bytes) → bit-plane
//! transpose (5 lanes per frame) → per-channel buffers → channel sinks,
//! flushed once per transfer line.
//!
//! Frames alternate between the two channel halves: even frames carry
//! channels 0..4, odd frames channels 5..9.

pub mod decode;
pub mod error;
pub mod pipeline;
pub mod sink;
pub mod source;

pub use decode::{ChannelBuffers, DecodedFrame, FrameAssembler, Parity};
pub use error::{Error, Result};
pub use pipeline::{ExtractSummary, Extractor, LineProgress};
pub use sink::{ChannelSink, MemorySink, WavChannelSink};
