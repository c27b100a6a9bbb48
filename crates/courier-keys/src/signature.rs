//! Ed25519 signatures over transmissions.
//!
//! A [`SignatureTransmission`] travels as its own transmission next to the one
//! it signs. Its payload is fixed-size:
//!
//! ```text
//! [target id 8][timestamp ms 8][signer public key 32][signature 64]
//! ```
//!
//! The signed message binds the target id, the timestamp, and a blake3
//! digest of the target's serialized payload.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use std::fmt;

use courier_core::{to_bytes, CoreError, FrameReader, FromWire, Transmission, TransmissionId};

use crate::error::{KeysError, Result};

const SIGNATURE_DOMAIN: &str = "courier-keys v1 signature";

/// Payload length of a [`SignatureTransmission`].
pub const SIGNATURE_PAYLOAD_LEN: usize = 8 + 8 + 32 + 64;

/// An Ed25519 verifying key (32 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignerKey(pub [u8; 32]);

impl SignerKey {
    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for SignerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignerKey({})", &self.to_hex()[..16])
    }
}

/// Our signing identity.
#[derive(Clone)]
pub struct Identity {
    signing_key: SigningKey,
}

impl Identity {
    /// Generate a new random identity.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            signing_key: SigningKey::generate(&mut rng),
        }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// The public half.
    pub fn public_key(&self) -> SignerKey {
        SignerKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign `target` at `timestamp_ms`.
    pub fn sign(&self, target: &dyn Transmission, timestamp_ms: u64) -> SignatureTransmission {
        let message = signed_message(target.id(), timestamp_ms, &target.serialize());
        SignatureTransmission {
            id: TransmissionId::random(),
            target: target.id(),
            timestamp_ms,
            signer: self.public_key(),
            signature: self.signing_key.sign(&message).to_bytes(),
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({:?})", self.public_key())
    }
}

fn signed_message(target: TransmissionId, timestamp_ms: u64, payload: &[u8]) -> Vec<u8> {
    let mut hasher = blake3::Hasher::new_derive_key(SIGNATURE_DOMAIN);
    hasher.update(payload);

    let mut message = Vec::with_capacity(8 + 8 + 32);
    message.extend_from_slice(&to_bytes(target.get()));
    message.extend_from_slice(&to_bytes(timestamp_ms));
    message.extend_from_slice(hasher.finalize().as_bytes());
    message
}

/// A detached signature over another transmission.
#[derive(Clone, PartialEq, Eq)]
pub struct SignatureTransmission {
    id: TransmissionId,
    target: TransmissionId,
    timestamp_ms: u64,
    signer: SignerKey,
    signature: [u8; 64],
}

impl SignatureTransmission {
    /// Id of the signed transmission.
    pub fn target(&self) -> TransmissionId {
        self.target
    }

    /// When the signature was made, in milliseconds.
    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }

    /// Who claims to have signed.
    pub fn signer(&self) -> SignerKey {
        self.signer
    }

    /// Check the signature against `target`.
    pub fn verify(&self, target: &dyn Transmission) -> Result<()> {
        if target.id() != self.target {
            return Err(KeysError::SignatureInvalid);
        }

        let verifying_key =
            VerifyingKey::from_bytes(&self.signer.0).map_err(|_| KeysError::SignatureInvalid)?;
        let message = signed_message(self.target, self.timestamp_ms, &target.serialize());

        verifying_key
            .verify(&message, &Signature::from_bytes(&self.signature))
            .map_err(|_| KeysError::SignatureInvalid)
    }
}

impl fmt::Debug for SignatureTransmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureTransmission")
            .field("id", &self.id)
            .field("target", &self.target)
            .field("timestamp_ms", &self.timestamp_ms)
            .field("signer", &self.signer)
            .finish()
    }
}

impl Transmission for SignatureTransmission {
    fn id(&self) -> TransmissionId {
        self.id
    }

    fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(SIGNATURE_PAYLOAD_LEN);
        out.extend_from_slice(&to_bytes(self.target.get()));
        out.extend_from_slice(&to_bytes(self.timestamp_ms));
        out.extend_from_slice(self.signer.as_bytes());
        out.extend_from_slice(&self.signature);
        out
    }
}

impl FromWire for SignatureTransmission {
    fn from_wire(payload: &[u8], id: TransmissionId) -> courier_core::Result<Self> {
        if payload.len() != SIGNATURE_PAYLOAD_LEN {
            return Err(CoreError::MalformedTransmission(format!(
                "signature payload must be {SIGNATURE_PAYLOAD_LEN} bytes, got {}",
                payload.len()
            )));
        }

        let mut reader = FrameReader::new(payload);
        let target = TransmissionId(reader.read::<u64>()?);
        let timestamp_ms = reader.read::<u64>()?;
        let signer = SignerKey(reader.read_array::<32>()?);
        let signature = reader.read_array::<64>()?;

        Ok(Self {
            id,
            target,
            timestamp_ms,
            signer,
            signature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::MessageTransmission;

    #[test]
    fn test_sign_and_verify() {
        let identity = Identity::from_seed(&[7; 32]);
        let message = MessageTransmission::new("signed text");
        let signature = identity.sign(&message, 1_700_000_000_000);

        assert_eq!(signature.target(), message.id());
        assert_eq!(signature.signer(), identity.public_key());
        assert!(signature.verify(&message).is_ok());
    }

    #[test]
    fn test_tampered_payload_fails() {
        let identity = Identity::generate();
        let message = MessageTransmission::new("original");
        let signature = identity.sign(&message, 1);

        let forged = MessageTransmission::from_wire(b"forged", message.id()).unwrap();
        assert!(matches!(
            signature.verify(&forged),
            Err(KeysError::SignatureInvalid)
        ));
    }

    #[test]
    fn test_wrong_target_fails() {
        let identity = Identity::generate();
        let signature = identity.sign(&MessageTransmission::new("a"), 1);
        assert!(signature.verify(&MessageTransmission::new("a")).is_err());
    }

    #[test]
    fn test_wire_roundtrip_still_verifies() {
        let identity = Identity::generate();
        let message = MessageTransmission::new("hello");
        let signature = identity.sign(&message, 42);

        let bytes = signature.serialize();
        assert_eq!(bytes.len(), SIGNATURE_PAYLOAD_LEN);

        let rebuilt = SignatureTransmission::from_wire(&bytes, signature.id()).unwrap();
        assert_eq!(rebuilt, signature);
        assert!(rebuilt.verify(&message).is_ok());
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert!(SignatureTransmission::from_wire(&[0; 10], TransmissionId(1)).is_err());
    }

    #[test]
    fn test_deterministic_identity() {
        assert_eq!(
            Identity::from_seed(&[1; 32]).public_key(),
            Identity::from_seed(&[1; 32]).public_key()
        );
    }
}
