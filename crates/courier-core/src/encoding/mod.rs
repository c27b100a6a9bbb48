//! Text encodings for carrying binary frames through a text-only channel.
//!
//! Two encodings are exposed side by side:
//!
//! - [`Base64`]: the standard RFC 4648 alphabet with `=` padding. Byte-safe,
//!   easy to eyeball, compatible with anything.
//! - [`Base32768`]: a dense alphabet of 32768 CJK and Hangul code points,
//!   15 bits per character. Used for production payloads where the channel
//!   caps the number of characters rather than bytes.
//!
//! Both are exact inverses: `decode(encode(b)) == b` for every byte length,
//! including zero.

mod base32768;
mod base64;

pub use self::base32768::Base32768;
pub use self::base64::Base64;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A reversible bytes-to-text encoding.
pub trait TextEncoding {
    /// Encode bytes as text.
    fn encode(&self, bytes: &[u8]) -> String;

    /// Decode text produced by [`TextEncoding::encode`].
    ///
    /// Fails with `InvalidEncoding` on characters outside the alphabet or a
    /// truncated final group.
    fn decode(&self, text: &str) -> Result<Vec<u8>>;

    /// Number of characters `encode` produces for `len` input bytes.
    fn encoded_len(&self, len: usize) -> usize;
}

/// Selects one of the built-in encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// Standard base64, for debugging and compatibility.
    Base64,
    /// High-density 15-bit alphabet.
    #[default]
    Base32768,
}

impl TextEncoding for Encoding {
    fn encode(&self, bytes: &[u8]) -> String {
        match self {
            Encoding::Base64 => Base64.encode(bytes),
            Encoding::Base32768 => Base32768.encode(bytes),
        }
    }

    fn decode(&self, text: &str) -> Result<Vec<u8>> {
        match self {
            Encoding::Base64 => Base64.decode(text),
            Encoding::Base32768 => Base32768.decode(text),
        }
    }

    fn encoded_len(&self, len: usize) -> usize {
        match self {
            Encoding::Base64 => Base64.encoded_len(len),
            Encoding::Base32768 => Base32768.encoded_len(len),
        }
    }
}
