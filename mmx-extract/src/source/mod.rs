//! Byte frame sources
//!
//! Captures arrive as text: one USB bulk transfer per line, hex encoded, as
//! printed by `tshark -T fields -e usb.capdata` or a hex-dump tool.

pub mod hexdump;

pub use hexdump::{parse_line, HexDumpReader, HexLine, SourceLine, COMMENT_MARKER};
