//! # Courier Keys
//!
//! Named keys, payload encryption, and transmission signatures.
//!
//! ## Overview
//!
//! Keys are addressed by name. A sender picks a recipient's key by name; the
//! receiver does not know the sender, so it tries every key it holds in
//! insertion order and keeps the first that authenticates.
//!
//! ## Encryption Model
//!
//! - **Symmetric** keys (ChaCha20-Poly1305) are shared ahead of time
//! - **Public** keys (X25519) receive payloads sealed with an ephemeral key
//!   agreement; the matching **Secret** key opens them
//!
//! The result is wrapped in an [`Envelope`] whose first byte tells the
//! receiver whether any key is needed at all.
//!
//! ## Usage
//!
//! ```rust
//! use courier_keys::{KeyStore, KeyMaterial, KeyRole, EncryptionKey};
//!
//! let mut store = KeyStore::new();
//! store
//!     .add_key("team", KeyMaterial::Symmetric(EncryptionKey::generate()), KeyRole::Both)
//!     .unwrap();
//!
//! let envelope = store.encrypt_for("team", b"rally at the core").unwrap();
//! let (plaintext, key) = store.open(envelope).unwrap();
//! assert_eq!(plaintext, b"rally at the core");
//! assert_eq!(key.as_deref(), Some("team"));
//! ```

pub mod crypto;
pub mod envelope;
pub mod error;
pub mod key;
pub mod signature;
pub mod store;

pub use crypto::{EncryptionKey, EncryptionNonce, X25519PublicKey, X25519StaticSecret};
pub use envelope::{Envelope, EnvelopeMode};
pub use error::{KeysError, Result};
pub use key::{decrypt, encrypt, Key, KeyMaterial, KeyRole};
pub use signature::{Identity, SignatureTransmission, SignerKey, SIGNATURE_PAYLOAD_LEN};
pub use store::{DecryptReport, KeyAttempt, KeyOutcome, KeyStore};
