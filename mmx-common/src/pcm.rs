//! PCM sample word and stream parameters
//!
//! The MultiMix bulk endpoint carries 10 channels of 24-bit audio at 96 kHz.
//! Each transport frame is 32 bytes; the low five bit-planes of the first 24
//! bytes hold one sample for each of five channels.
//!
//! **Format:**
//! - Samples are 24-bit two's complement, stored little-endian (3 bytes)
//! - One mono stream per channel
//! - Sample rate fixed by the device (96000 Hz)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Size of one transport frame in bytes
pub const FRAME_BYTES: usize = 32;

/// Bits per sample word (also the number of frame bytes that carry sample bits)
pub const SAMPLE_BITS: usize = 24;

/// Bytes per encoded sample word
pub const SAMPLE_BYTES: usize = 3;

/// Sample words (lanes) decoded from every frame
pub const LANES: usize = 5;

/// Absolute channels in one synchronized capture
pub const CHANNELS: usize = LANES * 2;

/// Device sample rate
pub const DEFAULT_SAMPLE_RATE: u32 = 96_000;

/// Mixer strip names for absolute channels 0..9
///
/// Even frames carry the odd-numbered strips plus the left mix bus,
/// odd frames the even-numbered strips plus the right mix bus.
pub const MIXER_CHANNEL_NAMES: [&str; CHANNELS] = [
    "ch1", "ch3", "ch5", "ch7", "mixL", "ch2", "ch4", "ch6", "ch8", "mixR",
];

const SAMPLE_MASK: u32 = 0x00FF_FFFF;

/// One 24-bit sample word
///
/// The value is always masked to 24 bits. The raw word is what the bit-plane
/// transpose produces; [`Sample24::to_i32`] and [`Sample24::to_f32`] give the
/// signed views without touching the encoded bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Sample24(u32);

impl Sample24 {
    /// Smallest word (all bits clear)
    pub const ZERO: Sample24 = Sample24(0);

    /// Largest word (all 24 bits set)
    pub const MAX: Sample24 = Sample24(SAMPLE_MASK);

    /// Create a sample word, discarding anything above bit 23
    pub const fn new(value: u32) -> Self {
        Sample24(value & SAMPLE_MASK)
    }

    /// Raw unsigned 24-bit value
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Encode as three bytes, least significant first
    pub const fn to_le_bytes(self) -> [u8; SAMPLE_BYTES] {
        [
            (self.0 & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            ((self.0 >> 16) & 0xFF) as u8,
        ]
    }

    /// Decode three little-endian bytes
    pub const fn from_le_bytes(bytes: [u8; SAMPLE_BYTES]) -> Self {
        Sample24(bytes[0] as u32 | (bytes[1] as u32) << 8 | (bytes[2] as u32) << 16)
    }

    /// Signed value (sign-extended from bit 23)
    pub const fn to_i32(self) -> i32 {
        ((self.0 << 8) as i32) >> 8
    }

    /// Normalized float in [-1.0, 1.0]
    ///
    /// Scales the word into the top of an i32 and divides by `i32::MAX`,
    /// the same conversion a float audio graph expects.
    pub fn to_f32(self) -> f32 {
        (self.0 << 8) as i32 as f32 / i32::MAX as f32
    }
}

impl From<Sample24> for u32 {
    fn from(sample: Sample24) -> Self {
        sample.0
    }
}

impl fmt::Display for Sample24 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:06X}", self.0)
    }
}

/// Sample encoding written by file sinks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    /// 24-bit integer PCM, bytes written exactly as decoded
    #[default]
    Pcm24,

    /// 32-bit float PCM, converted with [`Sample24::to_f32`]
    Float32,
}

impl SampleFormat {
    /// Bits per sample in the output container
    pub fn bits_per_sample(self) -> u16 {
        match self {
            SampleFormat::Pcm24 => 24,
            SampleFormat::Float32 => 32,
        }
    }
}

impl FromStr for SampleFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pcm24" | "s24" | "int24" => Ok(SampleFormat::Pcm24),
            "float32" | "f32" => Ok(SampleFormat::Float32),
            other => Err(Error::Config(format!(
                "Unknown sample format '{}' (expected pcm24 or float32)",
                other
            ))),
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleFormat::Pcm24 => f.write_str("pcm24"),
            SampleFormat::Float32 => f.write_str("float32"),
        }
    }
}

/// Parameters of one per-channel output stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmSpec {
    /// Always 1: every capture channel is written as its own mono stream
    pub channels: u16,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Output encoding
    pub format: SampleFormat,
}

impl PcmSpec {
    /// Mono stream at the given rate and format
    pub fn mono(sample_rate: u32, format: SampleFormat) -> Self {
        Self {
            channels: 1,
            sample_rate,
            format,
        }
    }

    /// Bits per sample of the output encoding
    pub fn bits_per_sample(&self) -> u16 {
        self.format.bits_per_sample()
    }
}

impl Default for PcmSpec {
    fn default() -> Self {
        Self::mono(DEFAULT_SAMPLE_RATE, SampleFormat::Pcm24)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_masks_to_24_bits() {
        assert_eq!(Sample24::new(0xFF12_3456).value(), 0x12_3456);
        assert_eq!(Sample24::new(u32::MAX), Sample24::MAX);
    }

    #[test]
    fn test_le_bytes_order() {
        let sample = Sample24::new(0x12_3456);
        assert_eq!(sample.to_le_bytes(), [0x56, 0x34, 0x12]);
        assert_eq!(Sample24::from_le_bytes([0x56, 0x34, 0x12]), sample);
    }

    #[test]
    fn test_le_bytes_reconstructs_boundary_values() {
        for value in [0u32, 1, 0x7F_FFFF, 0x80_0000, 0xFF_FFFF] {
            let sample = Sample24::new(value);
            assert_eq!(Sample24::from_le_bytes(sample.to_le_bytes()).value(), value);
        }
    }

    #[test]
    fn test_sign_extension() {
        assert_eq!(Sample24::new(0x7F_FFFF).to_i32(), 8_388_607);
        assert_eq!(Sample24::new(0x80_0000).to_i32(), -8_388_608);
        assert_eq!(Sample24::MAX.to_i32(), -1);
        assert_eq!(Sample24::ZERO.to_i32(), 0);
    }

    #[test]
    fn test_to_f32_range() {
        assert_eq!(Sample24::ZERO.to_f32(), 0.0);
        let max = Sample24::new(0x7F_FFFF).to_f32();
        let min = Sample24::new(0x80_0000).to_f32();
        assert!(max > 0.99 && max <= 1.0, "max was {}", max);
        assert!(min >= -1.0001 && min < -0.99, "min was {}", min);
    }

    #[test]
    fn test_sample_format_parse() {
        assert_eq!("pcm24".parse::<SampleFormat>().unwrap(), SampleFormat::Pcm24);
        assert_eq!("Float32".parse::<SampleFormat>().unwrap(), SampleFormat::Float32);
        assert!("mp3".parse::<SampleFormat>().is_err());
    }

    #[test]
    fn test_mixer_names_cover_all_channels() {
        assert_eq!(MIXER_CHANNEL_NAMES.len(), CHANNELS);
        assert_eq!(MIXER_CHANNEL_NAMES[4], "mixL");
        assert_eq!(MIXER_CHANNEL_NAMES[9], "mixR");
    }

    #[test]
    fn test_default_spec() {
        let spec = PcmSpec::default();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 96_000);
        assert_eq!(spec.bits_per_sample(), 24);
    }
}
