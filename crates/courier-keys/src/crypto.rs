//! Cryptographic primitives for payload encryption.
//!
//! ChaCha20-Poly1305 for content, X25519 plus blake3 for sealed content keys.
//! Authentication failure is always reported, never papered over, so a
//! caller can move on to the next candidate key.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use x25519_dalek::{EphemeralSecret, PublicKey, StaticSecret};

use crate::error::{KeysError, Result};

/// Domain string for deriving sealing keys from X25519 shared secrets.
const SEAL_DOMAIN: &str = "courier-keys v1 seal";

/// Domain string for key fingerprints.
const FINGERPRINT_DOMAIN: &str = "courier-keys v1 fingerprint";

/// Short, non-reversible identifier for key material.
pub(crate) fn fingerprint(material: &[u8]) -> String {
    let mut hasher = blake3::Hasher::new_derive_key(FINGERPRINT_DOMAIN);
    hasher.update(material);
    hex::encode(&hasher.finalize().as_bytes()[..8])
}

/// An X25519 public key (32 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct X25519PublicKey(pub [u8; 32]);

impl X25519PublicKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Agree a one-time content key for a sealed envelope to this key.
    ///
    /// Returns the ephemeral public key the recipient needs to recover it.
    pub fn seal_key(&self) -> (X25519PublicKey, EncryptionKey) {
        let ephemeral = EphemeralSecret::random_from_rng(rand::thread_rng());
        let ephemeral_public = Self(*PublicKey::from(&ephemeral).as_bytes());
        let shared = ephemeral.diffie_hellman(&PublicKey::from(self.0));
        let key = derive_seal_key(shared.as_bytes(), &ephemeral_public, self);
        (ephemeral_public, key)
    }
}

impl fmt::Debug for X25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X25519Pub({})", &hex::encode(self.0)[..16])
    }
}

/// An X25519 static secret key.
#[derive(Clone)]
pub struct X25519StaticSecret(StaticSecret);

impl X25519StaticSecret {
    /// Generate a new random secret.
    pub fn generate() -> Self {
        Self(StaticSecret::random_from_rng(rand::thread_rng()))
    }

    /// Create from seed bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(StaticSecret::from(bytes))
    }

    /// Derive the public key.
    pub fn public_key(&self) -> X25519PublicKey {
        X25519PublicKey(*PublicKey::from(&self.0).as_bytes())
    }

    /// Recover the content key of an envelope sealed to us under
    /// `ephemeral_public`.
    pub fn open_key(&self, ephemeral_public: &X25519PublicKey) -> EncryptionKey {
        let shared = self.0.diffie_hellman(&PublicKey::from(ephemeral_public.0));
        derive_seal_key(shared.as_bytes(), ephemeral_public, &self.public_key())
    }
}

impl fmt::Debug for X25519StaticSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X25519Secret(pub {:?})", self.public_key())
    }
}

/// Both public keys are bound in, so a ciphertext cannot be replayed under a
/// different ephemeral key.
fn derive_seal_key(
    shared: &[u8; 32],
    ephemeral_public: &X25519PublicKey,
    recipient_public: &X25519PublicKey,
) -> EncryptionKey {
    let mut hasher = blake3::Hasher::new_derive_key(SEAL_DOMAIN);
    hasher.update(shared);
    hasher.update(ephemeral_public.as_bytes());
    hasher.update(recipient_public.as_bytes());
    EncryptionKey(*hasher.finalize().as_bytes())
}

/// A 256-bit symmetric key for ChaCha20-Poly1305.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionKey([u8; 32]);

impl EncryptionKey {
    /// Generate a new random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    fn cipher(&self) -> ChaCha20Poly1305 {
        ChaCha20Poly1305::new(Key::from_slice(&self.0))
    }

    /// Encrypt `plaintext` under `nonce`.
    pub fn encrypt(&self, plaintext: &[u8], nonce: &EncryptionNonce) -> Result<Vec<u8>> {
        self.cipher()
            .encrypt(Nonce::from_slice(&nonce.0), plaintext)
            .map_err(|e| KeysError::EncryptionError(e.to_string()))
    }

    /// Decrypt and authenticate.
    ///
    /// Fails with [`KeysError::AuthenticationFailed`] if the tag does not
    /// verify.
    pub fn decrypt(&self, ciphertext: &[u8], nonce: &EncryptionNonce) -> Result<Vec<u8>> {
        self.cipher()
            .decrypt(Nonce::from_slice(&nonce.0), ciphertext)
            .map_err(|_| KeysError::AuthenticationFailed)
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncryptionKey({})", fingerprint(&self.0))
    }
}

/// Per-message ChaCha20-Poly1305 nonce, drawn at random.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionNonce(pub [u8; 12]);

impl EncryptionNonce {
    /// Draw a fresh nonce.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 12];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }
}
