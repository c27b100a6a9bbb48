//! Sealing envelope for the payload portion of a wire frame.
//!
//! The first byte selects the mode; the rest is mode specific:
//!
//! ```text
//! 0x00 Plain      [payload...]
//! 0x01 Symmetric  [nonce 12][ciphertext + tag...]
//! 0x02 Sealed     [ephemeral public 32][nonce 12][ciphertext + tag...]
//! ```
//!
//! A receiver inspects the mode before trying any key, so unencrypted
//! traffic never pays for key trial.

use crate::crypto::{EncryptionNonce, X25519PublicKey};
use crate::error::{KeysError, Result};

/// Size of the Poly1305 authentication tag.
pub const TAG_LEN: usize = 16;

const NONCE_LEN: usize = 12;
const PUBLIC_LEN: usize = 32;

/// Envelope mode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EnvelopeMode {
    /// Not encrypted.
    Plain = 0,
    /// ChaCha20-Poly1305 under a shared symmetric key.
    Symmetric = 1,
    /// ChaCha20-Poly1305 under a key agreed with the recipient's X25519 key.
    Sealed = 2,
}

impl EnvelopeMode {
    /// Parse the mode byte.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Plain),
            1 => Some(Self::Symmetric),
            2 => Some(Self::Sealed),
            _ => None,
        }
    }
}

/// A possibly-encrypted payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    /// Payload carried in the clear.
    Plain(Vec<u8>),

    /// Payload encrypted with a symmetric key.
    Symmetric {
        nonce: EncryptionNonce,
        ciphertext: Vec<u8>,
    },

    /// Payload sealed to an X25519 public key.
    Sealed {
        ephemeral_public: X25519PublicKey,
        nonce: EncryptionNonce,
        ciphertext: Vec<u8>,
    },
}

impl Envelope {
    /// The envelope's mode.
    pub fn mode(&self) -> EnvelopeMode {
        match self {
            Envelope::Plain(_) => EnvelopeMode::Plain,
            Envelope::Symmetric { .. } => EnvelopeMode::Symmetric,
            Envelope::Sealed { .. } => EnvelopeMode::Sealed,
        }
    }

    /// Whether a key is needed to open this envelope.
    pub fn is_encrypted(&self) -> bool {
        self.mode() != EnvelopeMode::Plain
    }

    /// Serialize to the compact binary layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![self.mode() as u8];
        match self {
            Envelope::Plain(payload) => out.extend_from_slice(payload),
            Envelope::Symmetric { nonce, ciphertext } => {
                out.extend_from_slice(nonce.as_bytes());
                out.extend_from_slice(ciphertext);
            }
            Envelope::Sealed {
                ephemeral_public,
                nonce,
                ciphertext,
            } => {
                out.extend_from_slice(ephemeral_public.as_bytes());
                out.extend_from_slice(nonce.as_bytes());
                out.extend_from_slice(ciphertext);
            }
        }
        out
    }

    /// Parse the compact binary layout.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (&mode, rest) = bytes
            .split_first()
            .ok_or_else(|| KeysError::MalformedEnvelope("empty envelope".into()))?;

        let mode = EnvelopeMode::from_u8(mode)
            .ok_or_else(|| KeysError::MalformedEnvelope(format!("unknown mode {mode:#04x}")))?;

        match mode {
            EnvelopeMode::Plain => Ok(Envelope::Plain(rest.to_vec())),
            EnvelopeMode::Symmetric => {
                let (nonce, ciphertext) = split_nonce(rest)?;
                Ok(Envelope::Symmetric { nonce, ciphertext })
            }
            EnvelopeMode::Sealed => {
                if rest.len() < PUBLIC_LEN {
                    return Err(KeysError::MalformedEnvelope(
                        "sealed envelope too short".into(),
                    ));
                }
                let mut public = [0u8; PUBLIC_LEN];
                public.copy_from_slice(&rest[..PUBLIC_LEN]);
                let (nonce, ciphertext) = split_nonce(&rest[PUBLIC_LEN..])?;
                Ok(Envelope::Sealed {
                    ephemeral_public: X25519PublicKey::from_bytes(public),
                    nonce,
                    ciphertext,
                })
            }
        }
    }

    /// Bytes of overhead this mode adds on top of the payload.
    pub fn overhead(mode: EnvelopeMode) -> usize {
        match mode {
            EnvelopeMode::Plain => 1,
            EnvelopeMode::Symmetric => 1 + NONCE_LEN + TAG_LEN,
            EnvelopeMode::Sealed => 1 + PUBLIC_LEN + NONCE_LEN + TAG_LEN,
        }
    }
}

fn split_nonce(bytes: &[u8]) -> Result<(EncryptionNonce, Vec<u8>)> {
    if bytes.len() < NONCE_LEN + TAG_LEN {
        return Err(KeysError::MalformedEnvelope(
            "ciphertext shorter than nonce and tag".into(),
        ));
    }
    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(&bytes[..NONCE_LEN]);
    Ok((EncryptionNonce::from_bytes(nonce), bytes[NONCE_LEN..].to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_layout() {
        let envelope = Envelope::Plain(b"abc".to_vec());
        assert_eq!(envelope.to_bytes(), vec![0, b'a', b'b', b'c']);
        assert_eq!(Envelope::from_bytes(&envelope.to_bytes()).unwrap(), envelope);
        assert!(!envelope.is_encrypted());
    }

    #[test]
    fn test_sealed_layout() {
        let envelope = Envelope::Sealed {
            ephemeral_public: X25519PublicKey::from_bytes([9; 32]),
            nonce: EncryptionNonce::from_bytes([3; 12]),
            ciphertext: vec![7; 20],
        };
        let bytes = envelope.to_bytes();
        assert_eq!(bytes.len(), 1 + 32 + 12 + 20);
        assert_eq!(bytes[0], EnvelopeMode::Sealed as u8);
        assert_eq!(Envelope::from_bytes(&bytes).unwrap(), envelope);
    }

    #[test]
    fn test_rejects_unknown_mode() {
        assert!(matches!(
            Envelope::from_bytes(&[0x7f, 1, 2]),
            Err(KeysError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn test_rejects_short_ciphertext() {
        let mut bytes = vec![EnvelopeMode::Symmetric as u8];
        bytes.extend_from_slice(&[0; 20]);
        assert!(Envelope::from_bytes(&bytes).is_err());
        assert!(Envelope::from_bytes(&[]).is_err());
    }
}
