//! The key store.
//!
//! An ordered collection of named keys. Decryption walks the keys in
//! insertion order because the receiver does not know who sent a payload;
//! the first key that authenticates wins.

use tracing::{debug, warn};

use crate::envelope::Envelope;
use crate::error::{KeysError, Result};
use crate::key::{Key, KeyMaterial, KeyRole};
use crate::signature::{SignatureTransmission, SignerKey};
use courier_core::Transmission;

/// What happened when one key was tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The key opened the envelope.
    Opened,
    /// The key did not authenticate the ciphertext.
    AuthenticationFailed,
    /// The key cannot decrypt (its role is encrypt-only).
    Skipped,
}

/// One entry of the decryption attempt log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyAttempt {
    /// Name of the key tried.
    pub key: String,
    /// What happened.
    pub outcome: KeyOutcome,
}

/// Result of trying every known key against an envelope.
#[derive(Debug, Clone, Default)]
pub struct DecryptReport {
    /// Attempts in the order they were made.
    pub attempts: Vec<KeyAttempt>,
    /// The recovered plaintext, if any key worked.
    pub plaintext: Option<Vec<u8>>,
    /// Name of the key that worked.
    pub key: Option<String>,
}

impl DecryptReport {
    /// Whether a key opened the envelope.
    pub fn is_opened(&self) -> bool {
        self.plaintext.is_some()
    }

    /// Number of keys that failed to authenticate.
    pub fn failures(&self) -> usize {
        self.attempts
            .iter()
            .filter(|a| a.outcome == KeyOutcome::AuthenticationFailed)
            .count()
    }

    /// Convert into the plaintext and key name, or `NoKeyMatched`.
    pub fn into_result(self) -> Result<(Vec<u8>, String)> {
        match (self.plaintext, self.key) {
            (Some(plaintext), Some(key)) => Ok((plaintext, key)),
            _ => Err(KeysError::NoKeyMatched {
                tried: self
                    .attempts
                    .iter()
                    .filter(|a| a.outcome != KeyOutcome::Skipped)
                    .count(),
            }),
        }
    }
}

/// Named keys plus trusted signers.
///
/// Empty at startup. Mutated only through explicit calls; [`KeyStore::clear`]
/// is the session-reload hook.
#[derive(Debug, Default)]
pub struct KeyStore {
    keys: Vec<Key>,
    signers: Vec<(String, SignerKey)>,
}

impl KeyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key built from parts.
    pub fn add_key(
        &mut self,
        name: impl Into<String>,
        material: KeyMaterial,
        role: KeyRole,
    ) -> Result<()> {
        self.add(Key::new(name, material, role)?)
    }

    /// Add a key.
    ///
    /// A key whose name is taken with the same role replaces the existing
    /// material and keeps its position; a different role is `DuplicateName`.
    pub fn add(&mut self, key: Key) -> Result<()> {
        if let Some(existing) = self.keys.iter_mut().find(|k| k.name() == key.name()) {
            if existing.role() != key.role() {
                return Err(KeysError::DuplicateName {
                    name: key.name().to_owned(),
                    existing: existing.role(),
                    requested: key.role(),
                });
            }
            debug!(key = key.name(), fingerprint = %key.fingerprint(), "replacing key material");
            existing.set_material(key.material().clone());
            return Ok(());
        }

        debug!(key = key.name(), role = ?key.role(), fingerprint = %key.fingerprint(), "adding key");
        self.keys.push(key);
        Ok(())
    }

    /// Look up a key by name.
    pub fn find_by_name(&self, name: &str) -> Option<&Key> {
        self.keys.iter().find(|k| k.name() == name)
    }

    /// Remove a key by name, returning it.
    pub fn remove_key(&mut self, name: &str) -> Option<Key> {
        let index = self.keys.iter().position(|k| k.name() == name)?;
        Some(self.keys.remove(index))
    }

    /// All keys in insertion order.
    pub fn all_keys(&self) -> impl Iterator<Item = &Key> {
        self.keys.iter()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Drop every key and trusted signer.
    pub fn clear(&mut self) {
        self.keys.clear();
        self.signers.clear();
    }

    /// Seal `plaintext` for the key called `name`.
    pub fn encrypt_for(&self, name: &str, plaintext: &[u8]) -> Result<Envelope> {
        self.find_by_name(name)
            .ok_or_else(|| KeysError::KeyNotFound(name.to_owned()))?
            .seal(plaintext)
    }

    /// Try every key, in insertion order, against `envelope`.
    ///
    /// Stops at the first key that authenticates.
    pub fn decrypt_with_any(&self, envelope: &Envelope) -> DecryptReport {
        let mut report = DecryptReport::default();

        for key in &self.keys {
            let outcome = match key.open(envelope) {
                Ok(plaintext) => {
                    report.plaintext = Some(plaintext);
                    report.key = Some(key.name().to_owned());
                    KeyOutcome::Opened
                }
                Err(KeysError::RoleMismatch { .. }) => KeyOutcome::Skipped,
                Err(_) => KeyOutcome::AuthenticationFailed,
            };
            report.attempts.push(KeyAttempt {
                key: key.name().to_owned(),
                outcome,
            });
            if outcome == KeyOutcome::Opened {
                return report;
            }
        }

        warn!(tried = report.attempts.len(), "no key opened envelope");
        report
    }

    /// Open `envelope`: plain payloads pass through, encrypted ones go through
    /// [`KeyStore::decrypt_with_any`].
    ///
    /// Returns the payload and the name of the key that opened it.
    pub fn open(&self, envelope: Envelope) -> Result<(Vec<u8>, Option<String>)> {
        match envelope {
            Envelope::Plain(payload) => Ok((payload, None)),
            encrypted => {
                let (plaintext, key) = self.decrypt_with_any(&encrypted).into_result()?;
                Ok((plaintext, Some(key)))
            }
        }
    }

    /// Trust signatures from `key` under `name`.
    pub fn trust_signer(&mut self, name: impl Into<String>, key: SignerKey) {
        let name = name.into();
        self.signers.retain(|(n, _)| *n != name);
        self.signers.push((name, key));
    }

    /// Name of a trusted signer.
    pub fn find_signer(&self, key: &SignerKey) -> Option<&str> {
        self.signers
            .iter()
            .find(|(_, k)| k == key)
            .map(|(name, _)| name.as_str())
    }

    /// Verify `signature` over `target` and return the trusted signer's name.
    pub fn verify_signature(
        &self,
        signature: &SignatureTransmission,
        target: &dyn Transmission,
    ) -> Result<&str> {
        signature.verify(target)?;
        self.find_signer(&signature.signer())
            .ok_or_else(|| KeysError::UntrustedSigner(signature.signer().to_hex()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{EncryptionKey, X25519StaticSecret};
    use crate::signature::Identity;
    use courier_core::MessageTransmission;

    fn symmetric(byte: u8) -> KeyMaterial {
        KeyMaterial::Symmetric(EncryptionKey::from_bytes([byte; 32]))
    }

    #[test]
    fn test_add_and_find() {
        let mut store = KeyStore::new();
        store.add_key("a", symmetric(1), KeyRole::Both).unwrap();
        store.add_key("b", symmetric(2), KeyRole::Both).unwrap();

        assert_eq!(store.len(), 2);
        assert!(store.find_by_name("a").is_some());
        assert!(store.find_by_name("c").is_none());

        let names: Vec<_> = store.all_keys().map(|k| k.name().to_owned()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_duplicate_name_with_conflicting_role() {
        let mut store = KeyStore::new();
        store.add_key("a", symmetric(1), KeyRole::Both).unwrap();

        let err = store
            .add_key("a", symmetric(2), KeyRole::DecryptOnly)
            .unwrap_err();
        assert!(matches!(err, KeysError::DuplicateName { .. }));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_same_role_replaces_in_place() {
        let mut store = KeyStore::new();
        store.add_key("a", symmetric(1), KeyRole::Both).unwrap();
        store.add_key("b", symmetric(2), KeyRole::Both).unwrap();
        let before = store.find_by_name("a").unwrap().fingerprint();

        store.add_key("a", symmetric(3), KeyRole::Both).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.all_keys().next().unwrap().name(), "a");
        assert_ne!(store.find_by_name("a").unwrap().fingerprint(), before);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut store = KeyStore::new();
        store.add_key("a", symmetric(1), KeyRole::Both).unwrap();
        store.add_key("b", symmetric(2), KeyRole::Both).unwrap();

        assert!(store.remove_key("a").is_some());
        assert!(store.remove_key("a").is_none());
        assert_eq!(store.len(), 1);

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_decrypt_with_any_reports_attempts() {
        let mut store = KeyStore::new();
        store.add_key("a", symmetric(1), KeyRole::Both).unwrap();
        store.add_key("b", symmetric(2), KeyRole::Both).unwrap();
        store.add_key("c", symmetric(3), KeyRole::Both).unwrap();

        let envelope = store.encrypt_for("b", b"payload").unwrap();
        let report = store.decrypt_with_any(&envelope);

        assert!(report.is_opened());
        assert_eq!(report.key.as_deref(), Some("b"));
        assert_eq!(report.plaintext.as_deref(), Some(&b"payload"[..]));
        assert_eq!(
            report.attempts,
            vec![
                KeyAttempt {
                    key: "a".into(),
                    outcome: KeyOutcome::AuthenticationFailed
                },
                KeyAttempt {
                    key: "b".into(),
                    outcome: KeyOutcome::Opened
                },
            ]
        );
    }

    #[test]
    fn test_exhaustion_is_no_key_matched() {
        let mut sender = KeyStore::new();
        sender.add_key("secret", symmetric(9), KeyRole::Both).unwrap();
        let envelope = sender.encrypt_for("secret", b"hidden").unwrap();

        let mut receiver = KeyStore::new();
        receiver.add_key("a", symmetric(1), KeyRole::Both).unwrap();
        receiver
            .add_key(
                "pub",
                KeyMaterial::Public(X25519StaticSecret::generate().public_key()),
                KeyRole::EncryptOnly,
            )
            .unwrap();

        let report = receiver.decrypt_with_any(&envelope);
        assert!(!report.is_opened());
        assert_eq!(report.failures(), 1);
        assert_eq!(report.attempts[1].outcome, KeyOutcome::Skipped);

        assert!(matches!(
            receiver.open(envelope),
            Err(KeysError::NoKeyMatched { tried: 1 })
        ));
    }

    #[test]
    fn test_open_passes_plain_through() {
        let store = KeyStore::new();
        let (payload, key) = store.open(Envelope::Plain(b"clear".to_vec())).unwrap();
        assert_eq!(payload, b"clear");
        assert!(key.is_none());
    }

    #[test]
    fn test_encrypt_for_unknown_key() {
        let store = KeyStore::new();
        assert!(matches!(
            store.encrypt_for("nobody", b"x"),
            Err(KeysError::KeyNotFound(_))
        ));
    }

    #[test]
    fn test_trusted_signatures() {
        let identity = Identity::from_seed(&[4; 32]);
        let message = MessageTransmission::new("orders");
        let signature = identity.sign(&message, 10);

        let mut store = KeyStore::new();
        assert!(matches!(
            store.verify_signature(&signature, &message),
            Err(KeysError::UntrustedSigner(_))
        ));

        store.trust_signer("captain", identity.public_key());
        assert_eq!(store.verify_signature(&signature, &message).unwrap(), "captain");
        assert_eq!(store.find_signer(&identity.public_key()), Some("captain"));
    }
}
