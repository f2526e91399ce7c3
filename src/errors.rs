/*!
 * Error types for the bisub library.
 *
 * Format errors come from the SubRip parser and are always recoverable by the
 * caller (for example by decoding the input with another encoding and parsing
 * again). Application errors wrap them together with file and configuration
 * failures, using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur while parsing SubRip text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The first line of a block is not a decimal sequence number
    #[error("Invalid sequence number at line {line}: '{value}'")]
    InvalidSequenceNumber {
        /// 1-based line number in the input
        line: usize,
        /// The offending line
        value: String,
    },

    /// The second line of a block is not a `start --> end` time range
    #[error("Invalid time range at line {line}: {reason} ('{value}')")]
    InvalidTimeRange {
        /// 1-based line number in the input
        line: usize,
        /// The offending line
        value: String,
        /// What was wrong with it
        reason: String,
    },

    /// A timestamp does not follow the `HH:MM:SS,mmm` pattern
    #[error("Invalid timestamp: '{0}'")]
    InvalidTimestamp(String),

    /// The input ended in the middle of a block
    #[error("Unexpected end of input at line {line}: block is missing its {missing}")]
    UnexpectedEndOfInput {
        /// Number of lines read before the input ended
        line: usize,
        /// The block part that never arrived
        missing: &'static str,
    },
}

impl FormatError {
    /// True when the input was structurally incomplete (truncated final block)
    pub fn is_truncation(&self) -> bool {
        matches!(self, Self::UnexpectedEndOfInput { .. })
    }

    /// True when a field was present but could not be parsed
    pub fn is_malformed_field(&self) -> bool {
        !self.is_truncation()
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from subtitle parsing
    #[error("Subtitle format error: {0}")]
    Format(#[from] FormatError),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
