//! Hex capture line normalizer
//!
//! Each text line is one bulk transfer. Accepted forms:
//!
//! ```text
//! # comment                       ignored entirely (no transfer boundary)
//! 0001ff...                       bare capdata hex
//! 00000010 0001 ff03 ...          address field, then hex groups
//! ```
//!
//! When a line holds more than one whitespace-separated token, the first one
//! is an address and is dropped. The remaining tokens are joined and read as
//! consecutive 2-digit hex bytes. Anything else is a fatal parse error.

use std::io::BufRead;

use crate::{Error, Result};

/// Lines starting with this marker are comments
pub const COMMENT_MARKER: char = '#';

/// One normalized capture line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HexLine {
    /// Comment line, skipped without marking a transfer boundary
    Comment,

    /// Transfer payload (possibly empty)
    Data(Vec<u8>),
}

/// A parsed line with its 1-based line number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub number: usize,
    pub line: HexLine,
}

/// Whitespace-separated tokens with their byte offsets
fn tokens(text: &str) -> Vec<(usize, &str)> {
    let mut tokens = Vec::new();
    let mut start = None;

    for (offset, c) in text.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                tokens.push((s, &text[s..offset]));
                start = None;
            }
            (false, None) => start = Some(offset),
            _ => {}
        }
    }
    if let Some(s) = start {
        tokens.push((s, &text[s..]));
    }

    tokens
}

/// Normalize one capture line into payload bytes
///
/// `line_no` is only used for error reporting.
pub fn parse_line(text: &str, line_no: usize) -> Result<HexLine> {
    if text.trim_start().starts_with(COMMENT_MARKER) {
        return Ok(HexLine::Comment);
    }

    let tokens = tokens(text);
    let payload = if tokens.len() > 1 { &tokens[1..] } else { &tokens[..] };

    let mut digits = Vec::with_capacity(text.len());
    let mut columns = Vec::with_capacity(text.len());
    for &(offset, token) in payload {
        digits.extend_from_slice(token.as_bytes());
        columns.extend((0..token.len()).map(|i| offset + i + 1));
    }

    let invalid = |start: usize| {
        let end = (start + 2).min(digits.len());
        Error::Parse {
            line: line_no,
            column: columns[start],
            token: String::from_utf8_lossy(&digits[start..end]).into_owned(),
        }
    };

    // Report a bad digit before a dangling one
    let even = digits.len() & !1;
    let bytes = hex::decode(&digits[..even]).map_err(|e| match e {
        hex::FromHexError::InvalidHexCharacter { index, .. } => invalid(index & !1),
        other => Error::InvalidInput(format!("line {}: {}", line_no, other)),
    })?;
    if even < digits.len() {
        return Err(invalid(even));
    }

    Ok(HexLine::Data(bytes))
}

/// Iterator over the parsed lines of a capture
pub struct HexDumpReader<R> {
    reader: R,
    line_no: usize,
    buf: String,
}

impl<R: BufRead> HexDumpReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_no: 0,
            buf: String::new(),
        }
    }

    /// Number of lines read so far
    pub fn lines_read(&self) -> usize {
        self.line_no
    }
}

impl<R: BufRead> Iterator for HexDumpReader<R> {
    type Item = Result<SourceLine>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_line(&mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                self.line_no += 1;
                let text = self.buf.trim_end_matches(&['\n', '\r'][..]);
                Some(parse_line(text, self.line_no).map(|line| SourceLine {
                    number: self.line_no,
                    line,
                }))
            }
            Err(e) => Some(Err(Error::Io(e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_bare_hex() {
        assert_eq!(
            parse_line("0001fFA0", 1).unwrap(),
            HexLine::Data(vec![0x00, 0x01, 0xFF, 0xA0])
        );
    }

    #[test]
    fn test_comment_line() {
        assert_eq!(parse_line("# capture 3", 1).unwrap(), HexLine::Comment);
        assert_eq!(parse_line("   #indented", 1).unwrap(), HexLine::Comment);
    }

    #[test]
    fn test_address_field_stripped() {
        assert_eq!(
            parse_line("00000010 0102 0304", 1).unwrap(),
            HexLine::Data(vec![0x01, 0x02, 0x03, 0x04])
        );
        assert_eq!(
            parse_line("  0000\t0a0b\t0c  ", 1).unwrap(),
            HexLine::Data(vec![0x0A, 0x0B, 0x0C])
        );
    }

    #[test]
    fn test_groups_joined_across_tokens() {
        // Odd-length groups still pair up once joined
        assert_eq!(
            parse_line("addr 012 345", 1).unwrap(),
            HexLine::Data(vec![0x01, 0x23, 0x45])
        );
    }

    #[test]
    fn test_empty_line_is_empty_transfer() {
        assert_eq!(parse_line("", 1).unwrap(), HexLine::Data(vec![]));
        assert_eq!(parse_line("   ", 1).unwrap(), HexLine::Data(vec![]));
    }

    #[test]
    fn test_invalid_digit_reports_position() {
        match parse_line("0102zz04", 7) {
            Err(Error::Parse { line, column, token }) => {
                assert_eq!(line, 7);
                assert_eq!(column, 5);
                assert_eq!(token, "zz");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_dangling_nibble_is_error() {
        match parse_line("01020", 2) {
            Err(Error::Parse { column, token, .. }) => {
                assert_eq!(column, 5);
                assert_eq!(token, "0");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_digit_after_address_reports_line_column() {
        match parse_line("0010 01 0g", 3) {
            Err(Error::Parse { column, token, .. }) => {
                assert_eq!(column, 9);
                assert_eq!(token, "0g");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_digit_wins_over_odd_length() {
        match parse_line("zz0", 1) {
            Err(Error::Parse { column, token, .. }) => {
                assert_eq!(column, 1);
                assert_eq!(token, "zz");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_reader_numbers_lines_and_handles_crlf() {
        let input = "# header\r\n0102\r\n\r\n0304\n";
        let lines: Vec<SourceLine> = HexDumpReader::new(Cursor::new(input))
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(
            lines,
            vec![
                SourceLine { number: 1, line: HexLine::Comment },
                SourceLine { number: 2, line: HexLine::Data(vec![1, 2]) },
                SourceLine { number: 3, line: HexLine::Data(vec![]) },
                SourceLine { number: 4, line: HexLine::Data(vec![3, 4]) },
            ]
        );
    }

    #[test]
    fn test_reader_surfaces_parse_error() {
        let mut reader = HexDumpReader::new(Cursor::new("0102\nxx\n"));
        assert!(reader.next().unwrap().is_ok());
        assert!(matches!(reader.next(), Some(Err(Error::Parse { line: 2, .. }))));
        assert_eq!(reader.lines_read(), 2);
    }
}
