//! Shared test helpers
//!
//! Builds transport frames from known lane values so tests can state the
//! samples they expect instead of raw bit patterns.

#![allow(dead_code)]

use mmx_common::pcm::{FRAME_BYTES, LANES, SAMPLE_BITS};

/// Spread five 24-bit lane values over the bit-planes of a frame
///
/// Bit 23 of lane `b` lands in bit `b` of byte 0, bit 0 in byte 23.
/// Bytes 24..31 are filled with `tail`.
pub fn frame_from_lanes(lanes: [u32; LANES], tail: u8) -> [u8; FRAME_BYTES] {
    let mut frame = [tail; FRAME_BYTES];
    for (i, byte) in frame[..SAMPLE_BITS].iter_mut().enumerate() {
        let bit = SAMPLE_BITS - 1 - i;
        *byte = lanes
            .iter()
            .enumerate()
            .fold(0u8, |acc, (lane, value)| acc | ((((value >> bit) & 1) as u8) << lane));
    }
    frame
}

/// Frame whose first 24 bytes are `head` and last 8 bytes `tail`
pub fn uniform_frame(head: u8, tail: u8) -> [u8; FRAME_BYTES] {
    let mut frame = [tail; FRAME_BYTES];
    frame[..SAMPLE_BITS].fill(head);
    frame
}

/// Lowercase hex text for a byte run (capdata form)
pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Hex-dump form: address field followed by 2-byte groups
pub fn to_hexdump_line(address: usize, bytes: &[u8]) -> String {
    let groups: Vec<String> = bytes.chunks(2).map(to_hex).collect();
    format!("{:08x} {}", address, groups.join(" "))
}
