//! Error types for the key store and payload encryption.

use thiserror::Error;

use crate::key::KeyRole;

/// Errors that can occur during key management and encryption.
#[derive(Debug, Error)]
pub enum KeysError {
    /// The key did not authenticate the ciphertext.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// A key with this name already exists with a different role.
    #[error("duplicate key name: {name} (existing role {existing:?}, requested {requested:?})")]
    DuplicateName {
        name: String,
        existing: KeyRole,
        requested: KeyRole,
    },

    /// No key with this name.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// The key's role does not allow the operation.
    #[error("key {name} with role {role:?} cannot {operation}")]
    RoleMismatch {
        name: String,
        role: KeyRole,
        operation: &'static str,
    },

    /// Key material is inconsistent with the requested role.
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// Envelope bytes are too short or carry an unknown mode.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Every known key was tried and none authenticated.
    #[error("no key could decrypt the payload ({tried} tried)")]
    NoKeyMatched { tried: usize },

    /// Encryption failed.
    #[error("encryption error: {0}")]
    EncryptionError(String),

    /// Signature did not verify.
    #[error("invalid signature")]
    SignatureInvalid,

    /// Signature is valid but the signer is not trusted.
    #[error("untrusted signer: {0}")]
    UntrustedSigner(String),

    /// Codec error.
    #[error("core error: {0}")]
    CoreError(#[from] courier_core::CoreError),
}

/// Result type for key operations.
pub type Result<T> = std::result::Result<T, KeysError>;
