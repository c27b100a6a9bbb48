//! Proptest generators for property-based testing.

use bytes::Bytes;
use proptest::prelude::*;

use courier_actuation::{ActuationRequest, ConfigValue, RateLimitConfig};
use courier_core::{Encoding, MessageTransmission, RawTransmission, TransmissionId};
use courier_keys::Key;

/// Generate payload bytes of specified max length.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate a random TransmissionId.
pub fn transmission_id() -> impl Strategy<Value = TransmissionId> {
    any::<u64>().prop_map(TransmissionId)
}

/// Generate a text message.
pub fn message(max_len: usize) -> impl Strategy<Value = MessageTransmission> {
    prop::collection::vec(any::<char>(), 0..=max_len)
        .prop_map(|chars| MessageTransmission::new(chars.into_iter().collect::<String>()))
}

/// Generate a raw transmission.
pub fn raw(max_len: usize) -> impl Strategy<Value = RawTransmission> {
    payload(max_len).prop_map(RawTransmission::from_payload)
}

/// Generate either encoding.
pub fn encoding() -> impl Strategy<Value = Encoding> {
    prop_oneof![Just(Encoding::Base64), Just(Encoding::Base32768)]
}

/// Generate a symmetric key with the given name.
pub fn symmetric_key(name: &'static str) -> impl Strategy<Value = Key> {
    any::<[u8; 32]>().prop_map(move |bytes| Key::symmetric(name, bytes))
}

/// Generate an opaque configuration value.
pub fn config_value() -> impl Strategy<Value = ConfigValue> {
    prop_oneof![
        any::<i64>().prop_map(ConfigValue::Int),
        (any::<i32>(), any::<i32>()).prop_map(|(x, y)| ConfigValue::Pos { x, y }),
        "[a-z ]{0,32}".prop_map(ConfigValue::Text),
        payload(16).prop_map(|b| ConfigValue::Bytes(Bytes::from(b))),
        Just(ConfigValue::Unset),
    ]
}

/// Generate an actuation request near the origin.
pub fn actuation_request() -> impl Strategy<Value = ActuationRequest> {
    (-500i32..500, -500i32..500, config_value())
        .prop_map(|(x, y, value)| ActuationRequest::new(x, y, value))
}

/// Generate a small limiter configuration.
pub fn rate_limit_config() -> impl Strategy<Value = RateLimitConfig> {
    (1u64..10_000, 1u32..64).prop_map(|(window_ms, capacity)| RateLimitConfig {
        window_ms,
        capacity,
    })
}
