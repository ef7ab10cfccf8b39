//! # MultiMix Common Library
//!
//! Shared code for the MultiMix capture tools including:
//! - 24-bit sample word and PCM stream parameters
//! - Fixed channel layout of the bulk capture stream
//! - Configuration loading (CLI > environment > TOML > defaults)
//! - Common error type

pub mod config;
pub mod error;
pub mod pcm;

pub use error::{Error, Result};
pub use pcm::{PcmSpec, Sample24, SampleFormat};
