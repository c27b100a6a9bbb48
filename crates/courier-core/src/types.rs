//! Strong type definitions for Courier.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 64-bit transmission identifier.
///
/// This is an opaque nonce, not a content hash: two transmissions with the
/// same payload get different ids, and equal ids mean "same logical message"
/// for deduplication.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransmissionId(pub u64);

impl TransmissionId {
    /// Generate a fresh random id.
    pub fn random() -> Self {
        Self(rand::thread_rng().gen())
    }

    /// Get the raw value.
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0.to_be_bytes())
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        let arr: [u8; 8] = bytes
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Self(u64::from_be_bytes(arr)))
    }
}

impl fmt::Debug for TransmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransmissionId({})", self.to_hex())
    }
}

impl fmt::Display for TransmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<u64> for TransmissionId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
