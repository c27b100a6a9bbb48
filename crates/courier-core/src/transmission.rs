//! Transmissions: uniquely identified units of payload.
//!
//! A transmission carries an opaque [`TransmissionId`] and serializes to its
//! raw payload bytes only. The id travels in the wire frame, never inside the
//! payload, so payloads round-trip byte-for-byte.
//!
//! The codec pipeline and the actuation queue only see the [`Transmission`]
//! trait; concrete payload shapes live in the variants below.

use std::collections::{HashSet, VecDeque};

use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{CoreError, Result};
use crate::types::TransmissionId;

/// A unit of payload with an identifier.
pub trait Transmission {
    /// The transmission's identifier.
    fn id(&self) -> TransmissionId;

    /// The raw payload bytes (without the id).
    fn serialize(&self) -> Vec<u8>;
}

/// Reconstruction of a transmission from received payload bytes.
pub trait FromWire: Sized {
    /// Rebuild from payload bytes and the id carried in the frame.
    fn from_wire(payload: &[u8], id: TransmissionId) -> Result<Self>;
}

/// A plain UTF-8 text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTransmission {
    id: TransmissionId,
    content: String,
}

impl MessageTransmission {
    /// Create a message with a fresh random id.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: TransmissionId::random(),
            content: content.into(),
        }
    }

    /// The message text.
    pub fn content(&self) -> &str {
        &self.content
    }
}

impl Transmission for MessageTransmission {
    fn id(&self) -> TransmissionId {
        self.id
    }

    fn serialize(&self) -> Vec<u8> {
        self.content.as_bytes().to_vec()
    }
}

impl FromWire for MessageTransmission {
    fn from_wire(payload: &[u8], id: TransmissionId) -> Result<Self> {
        let content = std::str::from_utf8(payload)
            .map_err(|e| CoreError::MalformedTransmission(format!("message is not UTF-8: {e}")))?;
        Ok(Self {
            id,
            content: content.to_owned(),
        })
    }
}

/// Opaque bytes with no interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTransmission {
    id: TransmissionId,
    payload: Bytes,
}

impl RawTransmission {
    /// Wrap payload bytes under a fresh random id.
    pub fn from_payload(payload: impl Into<Bytes>) -> Self {
        Self {
            id: TransmissionId::random(),
            payload: payload.into(),
        }
    }

    /// The payload bytes.
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }
}

impl Transmission for RawTransmission {
    fn id(&self) -> TransmissionId {
        self.id
    }

    fn serialize(&self) -> Vec<u8> {
        self.payload.to_vec()
    }
}

impl FromWire for RawTransmission {
    fn from_wire(payload: &[u8], id: TransmissionId) -> Result<Self> {
        Ok(Self {
            id,
            payload: Bytes::copy_from_slice(payload),
        })
    }
}

/// A structured record, serialized as CBOR.
///
/// The record is encoded once at construction so `serialize` stays
/// infallible and returns identical bytes every time.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordTransmission<T> {
    id: TransmissionId,
    record: T,
    encoded: Vec<u8>,
}

impl<T: Serialize + DeserializeOwned> RecordTransmission<T> {
    /// Encode a record under a fresh random id.
    pub fn new(record: T) -> Result<Self> {
        let mut encoded = Vec::new();
        ciborium::into_writer(&record, &mut encoded)
            .map_err(|e| CoreError::MalformedTransmission(e.to_string()))?;
        Ok(Self {
            id: TransmissionId::random(),
            record,
            encoded,
        })
    }

    /// The decoded record.
    pub fn record(&self) -> &T {
        &self.record
    }

    /// Consume and return the record.
    pub fn into_record(self) -> T {
        self.record
    }
}

impl<T> Transmission for RecordTransmission<T> {
    fn id(&self) -> TransmissionId {
        self.id
    }

    fn serialize(&self) -> Vec<u8> {
        self.encoded.clone()
    }
}

impl<T: Serialize + DeserializeOwned> FromWire for RecordTransmission<T> {
    fn from_wire(payload: &[u8], id: TransmissionId) -> Result<Self> {
        let record: T = ciborium::from_reader(payload)
            .map_err(|e| CoreError::MalformedTransmission(e.to_string()))?;
        Ok(Self {
            id,
            record,
            encoded: payload.to_vec(),
        })
    }
}

/// Bounded memory of recently seen transmission ids.
///
/// Used by consumers to drop repeats: the channel is a single shared slot
/// that is read many times between writes.
#[derive(Debug, Clone)]
pub struct SeenIds {
    capacity: usize,
    order: VecDeque<TransmissionId>,
    set: HashSet<TransmissionId>,
}

impl SeenIds {
    /// Remember at most `capacity` ids, forgetting the oldest first.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            order: VecDeque::new(),
            set: HashSet::new(),
        }
    }

    /// Record `id`. Returns `true` if it had not been seen before.
    pub fn insert(&mut self, id: TransmissionId) -> bool {
        if !self.set.insert(id) {
            return false;
        }
        self.order.push_back(id);
        if self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.set.remove(&oldest);
            }
        }
        true
    }

    /// Whether `id` is currently remembered.
    pub fn contains(&self, id: &TransmissionId) -> bool {
        self.set.contains(id)
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.order.clear();
        self.set.clear();
    }
}

impl Default for SeenIds {
    fn default() -> Self {
        Self::new(256)
    }
}
