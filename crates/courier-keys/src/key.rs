//! Named keys and their roles.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::{
    fingerprint, EncryptionKey, EncryptionNonce, X25519PublicKey, X25519StaticSecret,
};
use crate::envelope::Envelope;
use crate::error::{KeysError, Result};

/// What a key may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyRole {
    /// Only encrypt to this key (e.g. a recipient's public key).
    EncryptOnly,
    /// Only decrypt with this key.
    DecryptOnly,
    /// Encrypt and decrypt.
    Both,
}

impl KeyRole {
    /// Whether the role permits encryption.
    pub fn can_encrypt(self) -> bool {
        matches!(self, KeyRole::EncryptOnly | KeyRole::Both)
    }

    /// Whether the role permits decryption.
    pub fn can_decrypt(self) -> bool {
        matches!(self, KeyRole::DecryptOnly | KeyRole::Both)
    }
}

/// Raw key material.
#[derive(Clone)]
pub enum KeyMaterial {
    /// A shared symmetric key.
    Symmetric(EncryptionKey),
    /// Our X25519 secret; encrypting with it seals to our own public key.
    Secret(X25519StaticSecret),
    /// Someone else's X25519 public key.
    Public(X25519PublicKey),
}

impl KeyMaterial {
    fn fingerprint(&self) -> String {
        match self {
            KeyMaterial::Symmetric(key) => fingerprint(key.as_bytes()),
            KeyMaterial::Secret(secret) => fingerprint(secret.public_key().as_bytes()),
            KeyMaterial::Public(public) => fingerprint(public.as_bytes()),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            KeyMaterial::Symmetric(_) => "symmetric",
            KeyMaterial::Secret(_) => "x25519-secret",
            KeyMaterial::Public(_) => "x25519-public",
        }
    }
}

/// A named key.
#[derive(Clone)]
pub struct Key {
    name: String,
    material: KeyMaterial,
    role: KeyRole,
}

impl Key {
    /// Create a key, checking the role against the material.
    ///
    /// A bare public key can only encrypt.
    pub fn new(name: impl Into<String>, material: KeyMaterial, role: KeyRole) -> Result<Self> {
        let name = name.into();
        if matches!(material, KeyMaterial::Public(_)) && role != KeyRole::EncryptOnly {
            return Err(KeysError::InvalidKeyMaterial(format!(
                "public key {name} can only have role EncryptOnly"
            )));
        }
        Ok(Self {
            name,
            material,
            role,
        })
    }

    /// A symmetric key usable both ways.
    pub fn symmetric(name: impl Into<String>, bytes: [u8; 32]) -> Self {
        Self {
            name: name.into(),
            material: KeyMaterial::Symmetric(EncryptionKey::from_bytes(bytes)),
            role: KeyRole::Both,
        }
    }

    /// The key's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The key's role.
    pub fn role(&self) -> KeyRole {
        self.role
    }

    /// The key's material.
    pub fn material(&self) -> &KeyMaterial {
        &self.material
    }

    pub(crate) fn set_material(&mut self, material: KeyMaterial) {
        self.material = material;
    }

    /// Non-reversible short identifier, safe to log.
    pub fn fingerprint(&self) -> String {
        self.material.fingerprint()
    }

    /// Encrypt `plaintext` into an envelope addressed by this key.
    pub fn seal(&self, plaintext: &[u8]) -> Result<Envelope> {
        if !self.role.can_encrypt() {
            return Err(self.role_mismatch("encrypt"));
        }

        match &self.material {
            KeyMaterial::Symmetric(key) => {
                let nonce = EncryptionNonce::generate();
                let ciphertext = key.encrypt(plaintext, &nonce)?;
                Ok(Envelope::Symmetric { nonce, ciphertext })
            }
            KeyMaterial::Secret(secret) => seal_to(&secret.public_key(), plaintext),
            KeyMaterial::Public(public) => seal_to(public, plaintext),
        }
    }

    /// Open an encrypted envelope.
    ///
    /// Fails with [`KeysError::AuthenticationFailed`] when this key is not the
    /// one the envelope was made for.
    pub fn open(&self, envelope: &Envelope) -> Result<Vec<u8>> {
        if !self.role.can_decrypt() {
            return Err(self.role_mismatch("decrypt"));
        }

        match (&self.material, envelope) {
            (KeyMaterial::Symmetric(key), Envelope::Symmetric { nonce, ciphertext }) => {
                key.decrypt(ciphertext, nonce)
            }
            (
                KeyMaterial::Secret(secret),
                Envelope::Sealed {
                    ephemeral_public,
                    nonce,
                    ciphertext,
                },
            ) => {
                secret.open_key(ephemeral_public).decrypt(ciphertext, nonce)
            }
            (_, Envelope::Plain(_)) => Err(KeysError::MalformedEnvelope(
                "envelope is not encrypted".into(),
            )),
            _ => Err(KeysError::AuthenticationFailed),
        }
    }

    fn role_mismatch(&self, operation: &'static str) -> KeysError {
        KeysError::RoleMismatch {
            name: self.name.clone(),
            role: self.role,
            operation,
        }
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("name", &self.name)
            .field("kind", &self.material.kind())
            .field("role", &self.role)
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

fn seal_to(recipient: &X25519PublicKey, plaintext: &[u8]) -> Result<Envelope> {
    let (ephemeral_public, key) = recipient.seal_key();
    let nonce = EncryptionNonce::generate();
    let ciphertext = key.encrypt(plaintext, &nonce)?;

    Ok(Envelope::Sealed {
        ephemeral_public,
        nonce,
        ciphertext,
    })
}

/// Encrypt `plaintext` under `key`, returning envelope bytes.
pub fn encrypt(plaintext: &[u8], key: &Key) -> Result<Vec<u8>> {
    Ok(key.seal(plaintext)?.to_bytes())
}

/// Decrypt envelope bytes produced by [`encrypt`].
pub fn decrypt(bytes: &[u8], key: &Key) -> Result<Vec<u8>> {
    key.open(&Envelope::from_bytes(bytes)?)
}
