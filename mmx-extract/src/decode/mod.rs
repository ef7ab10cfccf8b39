//! Frame decoding
//!
//! - `frame`: bit-plane transpose of one 32-byte frame into five sample words
//! - `channels`: per-channel buffers of encoded samples awaiting a flush
//! - `assembler`: chunks the byte stream into frames and routes the results

pub mod assembler;
pub mod channels;
pub mod frame;

pub use assembler::{AssemblerStats, FrameAssembler};
pub use channels::ChannelBuffers;
pub use frame::{decode_frame, decode_into, decode_lanes, DecodedFrame, Frame, Parity};
