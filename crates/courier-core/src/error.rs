//! Error types for the Courier codec stack.

use thiserror::Error;

/// Errors that can occur while encoding or decoding transmissions.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Compressed stream is malformed, truncated, or inflates past the limit.
    #[error("corrupt data: {0}")]
    CorruptData(String),

    /// Text contains a character outside the alphabet or has bad padding.
    #[error("invalid encoding at position {position}: {reason}")]
    InvalidEncoding { position: usize, reason: String },

    /// Encoded text does not fit into the channel's character budget.
    #[error("payload too large: {len} characters exceeds budget of {budget}")]
    PayloadTooLarge { len: usize, budget: usize },

    /// Fewer bytes were available than the integer width requires.
    #[error("buffer underrun: needed {needed} bytes, got {got}")]
    BufferUnderrun { needed: usize, got: usize },

    /// Payload bytes could not be turned into the requested transmission.
    #[error("malformed transmission: {0}")]
    MalformedTransmission(String),
}

impl CoreError {
    pub(crate) fn invalid_encoding(position: usize, reason: impl Into<String>) -> Self {
        CoreError::InvalidEncoding {
            position,
            reason: reason.into(),
        }
    }
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CoreError>;
