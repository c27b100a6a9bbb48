//! # Courier Core
//!
//! The codec stack for Courier: compression, text encodings, integer
//! framing, and the transmission contract.
//!
//! This crate contains no I/O, no keys, no scheduling. It is pure
//! computation over byte sequences.
//!
//! ## Pipeline
//!
//! ```text
//! outbound: payload -> compress -> (encrypt) -> frame(id) -> encode -> text
//! inbound:  text -> decode -> unframe -> (decrypt) -> decompress -> payload
//! ```
//!
//! Encryption lives in `courier-keys`; this crate provides every other stage.
//!
//! ## Key Types
//!
//! - [`Transmission`] - Anything with an id that serializes to payload bytes
//! - [`TransmissionId`] - Opaque 64-bit nonce carried in the frame header
//! - [`Encoding`] - Selects [`Base64`] or the dense [`Base32768`] alphabet
//! - [`BeInt`] - Fixed-width big-endian integer framing

pub mod compression;
pub mod encoding;
pub mod error;
pub mod framing;
pub mod transmission;
pub mod types;

pub use compression::{compress, compress_with_level, decompress, decompress_bounded};
pub use encoding::{Base32768, Base64, Encoding, TextEncoding};
pub use error::{CoreError, Result};
pub use framing::{frame, from_bytes, peek_id, to_bytes, unframe, BeInt, FrameReader};
pub use transmission::{
    FromWire, MessageTransmission, RawTransmission, RecordTransmission, SeenIds, Transmission,
};
pub use types::TransmissionId;

/// Fail with [`CoreError::PayloadTooLarge`] if `text` exceeds `budget`
/// characters.
pub fn check_budget(text: &str, budget: usize) -> Result<()> {
    let len = text.chars().count();
    if len > budget {
        return Err(CoreError::PayloadTooLarge { len, budget });
    }
    Ok(())
}
