//! The outbound and inbound pipelines.
//!
//! ```text
//! outbound: serialize -> compress -> seal -> frame(id) -> encode -> budget check
//! inbound:  decode -> unframe -> open (try every key) -> decompress
//! ```
//!
//! The frame id sits in front of the envelope unencrypted, so a receiver can
//! drop repeats before spending any work on keys.

use bytes::Bytes;
use tracing::debug;

use courier_core::{
    check_budget, compression, frame, peek_id, unframe, FromWire, SeenIds, TextEncoding,
    Transmission, TransmissionId,
};
use courier_keys::{Envelope, KeyStore};

use crate::config::CodecConfig;
use crate::error::Result;

/// A transmission recovered from the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    /// Id carried in the frame.
    pub id: TransmissionId,
    /// Decompressed payload bytes.
    pub payload: Bytes,
    /// Name of the key that opened the envelope; `None` if it was plain.
    pub key: Option<String>,
}

impl Inbound {
    /// Rebuild a concrete transmission, keeping the frame id.
    pub fn into_transmission<T: FromWire>(&self) -> Result<T> {
        Ok(T::from_wire(&self.payload, self.id)?)
    }

    /// Whether the payload arrived encrypted.
    pub fn was_encrypted(&self) -> bool {
        self.key.is_some()
    }
}

/// Stateless codec pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct Courier {
    config: CodecConfig,
}

impl Courier {
    /// Create a pipeline with the given settings.
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    /// The pipeline's settings.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Turn a transmission into channel text.
    ///
    /// With `key` set, the compressed payload is sealed for the named key.
    /// Fails with `PayloadTooLarge` when the text exceeds `budget` characters;
    /// nothing is ever truncated.
    pub fn encode_transmission(
        &self,
        keys: &KeyStore,
        transmission: &dyn Transmission,
        key: Option<&str>,
        budget: usize,
    ) -> Result<String> {
        let compressed =
            compression::compress_with_level(&transmission.serialize(), self.config.compression_level)?;

        let envelope = match key {
            Some(name) => keys.encrypt_for(name, &compressed)?,
            None => Envelope::Plain(compressed),
        };

        let framed = frame(transmission.id(), &envelope.to_bytes());
        let text = self.config.encoding.encode(&framed);
        check_budget(&text, budget)?;

        debug!(
            id = %transmission.id(),
            encrypted = key.is_some(),
            chars = text.chars().count(),
            budget,
            "encoded transmission"
        );
        Ok(text)
    }

    /// Turn channel text back into a payload.
    pub fn decode_text(&self, keys: &KeyStore, text: &str) -> Result<Inbound> {
        let bytes = self.config.encoding.decode(text)?;
        self.open_frame(keys, &bytes)
    }

    /// Like [`Courier::decode_text`], but returns `None` for an id already in
    /// `seen` without opening the envelope.
    ///
    /// The id is remembered only once the payload has been recovered.
    pub fn decode_new(
        &self,
        keys: &KeyStore,
        text: &str,
        seen: &mut SeenIds,
    ) -> Result<Option<Inbound>> {
        let bytes = self.config.encoding.decode(text)?;
        let id = peek_id(&bytes)?;
        if seen.contains(&id) {
            debug!(%id, "skipping already seen transmission");
            return Ok(None);
        }

        let inbound = self.open_frame(keys, &bytes)?;
        seen.insert(inbound.id);
        Ok(Some(inbound))
    }

    fn open_frame(&self, keys: &KeyStore, bytes: &[u8]) -> Result<Inbound> {
        let (id, body) = unframe(bytes)?;
        let envelope = Envelope::from_bytes(body)?;
        let (compressed, key) = keys.open(envelope)?;
        let payload =
            compression::decompress_bounded(&compressed, self.config.max_decompressed_len)?;

        Ok(Inbound {
            id,
            payload: Bytes::from(payload),
            key,
        })
    }
}
