//! Error types for the unified API.

use courier_actuation::ActuationError;
use courier_core::CoreError;
use courier_keys::KeysError;
use thiserror::Error;

/// Errors that can occur sending or receiving transmissions.
#[derive(Debug, Error)]
pub enum CourierError {
    /// Codec error.
    #[error("codec error: {0}")]
    Core(#[from] CoreError),

    /// Key or encryption error.
    #[error("key error: {0}")]
    Keys(#[from] KeysError),

    /// Queue or discovery error.
    #[error("actuation error: {0}")]
    Actuation(#[from] ActuationError),

    /// The channel adapter found no medium to read or write.
    #[error("no channel medium available")]
    MediumUnavailable,

    /// The channel adapter failed to read the medium.
    #[error("channel error: {0}")]
    Channel(String),
}

impl CourierError {
    /// Message safe to show the end user.
    ///
    /// Never includes key names, fingerprints, or decoder detail.
    pub fn user_message(&self) -> &'static str {
        match self {
            CourierError::MediumUnavailable => "no message block available",
            CourierError::Core(CoreError::PayloadTooLarge { .. }) => "message too long",
            CourierError::Keys(KeysError::KeyNotFound(_)) => "unknown key",
            CourierError::Actuation(_) => "could not schedule action",
            _ => "could not read message",
        }
    }
}

/// Result type for Courier operations.
pub type Result<T> = std::result::Result<T, CourierError>;
