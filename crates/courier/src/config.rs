//! Configuration.
//!
//! Plain structs with defaults. The host may load them from its own settings
//! store through serde; nothing here reads files.

use serde::{Deserialize, Serialize};

use courier_actuation::{DiscoveryConfig, RateLimitConfig};
use courier_core::compression::{DEFAULT_COMPRESSION_LEVEL, DEFAULT_MAX_DECOMPRESSED_LEN};
use courier_core::Encoding;

/// Codec pipeline settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Text encoding for the wire.
    pub encoding: Encoding,
    /// zstd compression level.
    pub compression_level: i32,
    /// Refuse to inflate inbound payloads past this many bytes.
    pub max_decompressed_len: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            encoding: Encoding::default(),
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            max_decompressed_len: DEFAULT_MAX_DECOMPRESSED_LEN,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CourierConfig {
    /// Codec settings.
    pub codec: CodecConfig,
    /// Actuation limiter settings.
    pub rate_limit: RateLimitConfig,
    /// Parallel discovery settings.
    pub discovery: DiscoveryConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: CourierConfig =
            serde_json::from_str(r#"{"codec": {"encoding": "base64"}}"#).unwrap();

        assert_eq!(config.codec.encoding, Encoding::Base64);
        assert_eq!(config.codec.compression_level, DEFAULT_COMPRESSION_LEVEL);
        assert_eq!(config.rate_limit, RateLimitConfig::default());
    }

    #[test]
    fn test_default_encoding_is_dense() {
        assert_eq!(CourierConfig::default().codec.encoding, Encoding::Base32768);
    }
}
