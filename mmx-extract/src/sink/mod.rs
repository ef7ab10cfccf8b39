//! Channel sinks
//!
//! A sink receives each channel's encoded samples at every transfer boundary
//! and is closed once the source is exhausted.

pub mod memory;
pub mod naming;
pub mod wav;

pub use memory::MemorySink;
pub use naming::{channel_file_name, channel_path};
pub use wav::WavChannelSink;

use crate::Result;

/// Destination for the ten decoded channels
pub trait ChannelSink {
    /// Append little-endian 24-bit sample bytes to `channel`
    ///
    /// Bytes must be persisted in exactly the order given. An empty slice is
    /// allowed and must not fail.
    fn append(&mut self, channel: usize, bytes: &[u8]) -> Result<()>;

    /// Finish all channel outputs
    fn close(&mut self) -> Result<()>;
}
