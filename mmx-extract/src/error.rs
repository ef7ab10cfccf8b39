//! Error types for mmx-extract
//!
//! Every error is fatal to an extraction run: parse failures mean the capture
//! text is malformed, sink failures mean one of the ten synchronized outputs
//! is unavailable.

use thiserror::Error;

/// Main error type for mmx-extract
#[derive(Error, Debug)]
pub enum Error {
    /// Capture text contained something other than a 2-digit hex byte
    #[error("Parse error at line {line}, column {column}: invalid hex byte '{token}'")]
    Parse {
        line: usize,
        column: usize,
        token: String,
    },

    /// A channel output could not be opened, written or closed
    #[error("Channel {channel} sink error: {reason}")]
    Sink { channel: usize, reason: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] mmx_common::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid request
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Sink error for `channel` from any displayable cause
    pub fn sink(channel: usize, reason: impl std::fmt::Display) -> Self {
        Error::Sink {
            channel,
            reason: reason.to_string(),
        }
    }
}

/// Convenience Result type using mmx-extract Error
pub type Result<T> = std::result::Result<T, Error>;
