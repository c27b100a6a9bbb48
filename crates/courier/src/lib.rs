//! # Courier
//!
//! Data exchange and deferred actuation for an automated game client.
//!
//! ## Overview
//!
//! Courier carries binary payloads through a narrow text channel: a world
//! object that holds one short string and can be overwritten by anyone.
//! Payloads are compressed, optionally sealed for a named key, framed with an
//! id, and encoded into a dense alphabet to fit the channel's character
//! budget.
//!
//! Writing to the channel mutates the world, so it is not done directly.
//! Every write becomes an actuation request on a rate-limited queue that
//! fires at most one request per tick and never exceeds the server's
//! interaction budget.
//!
//! ## Usage
//!
//! ```rust
//! use courier::{Courier, KeyStore, MessageTransmission};
//!
//! let courier = Courier::default();
//! let keys = KeyStore::new();
//!
//! let message = MessageTransmission::new("hello");
//! let text = courier.encode_transmission(&keys, &message, None, 220).unwrap();
//!
//! let inbound = courier.decode_text(&keys, &text).unwrap();
//! assert_eq!(&inbound.payload[..], b"hello");
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `courier::core` - Codec stack, framing, transmissions
//! - `courier::keys` - Key store, encryption, signatures
//! - `courier::actuation` - Rate limiter, actuation queue, discovery

pub mod channel;
pub mod config;
pub mod courier;
pub mod error;
pub mod session;

// Re-export component crates
pub use courier_actuation as actuation;
pub use courier_core as core;
pub use courier_keys as keys;

// Re-export main types for convenience
pub use channel::{ChannelAdapter, MediumHandle};
pub use config::{CodecConfig, CourierConfig};
pub use courier::{Courier, Inbound};
pub use error::{CourierError, Result};
pub use session::{init_session, reset_session, with_session, Session};

// Re-export commonly used component types
pub use courier_actuation::{
    Actuation, ActuationQueue, ActuationRequest, Actuator, ConfigValue, RateLimitConfig,
    TickOutcome,
};
pub use courier_core::{
    Encoding, FromWire, MessageTransmission, RawTransmission, RecordTransmission, Transmission,
    TransmissionId,
};
pub use courier_keys::{Identity, Key, KeyMaterial, KeyRole, KeyStore};
