//! Actuation requests.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// An opaque configuration value.
///
/// The queue never inspects it; the host's [`Actuator`](crate::Actuator)
/// decides what each shape means for its interaction model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfigValue {
    /// An integer setting (item id, rotation, toggle state).
    Int(i64),
    /// A world position (link target).
    Pos { x: i32, y: i32 },
    /// A string (sign or message block text).
    Text(String),
    /// Raw bytes.
    Bytes(Bytes),
    /// Clear the setting.
    Unset,
}

/// A deferred world-mutating action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActuationRequest {
    /// Target tile x.
    pub x: i32,
    /// Target tile y.
    pub y: i32,
    /// Value to apply.
    pub value: ConfigValue,
}

impl ActuationRequest {
    /// Create a request.
    pub fn new(x: i32, y: i32, value: ConfigValue) -> Self {
        Self { x, y, value }
    }

    /// Request that writes `text` to the object at `(x, y)`.
    pub fn write_text(x: i32, y: i32, text: impl Into<String>) -> Self {
        Self::new(x, y, ConfigValue::Text(text.into()))
    }
}
