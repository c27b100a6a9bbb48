//! Lossless compression for transmission payloads.
//!
//! Payloads are compressed with Zstd at a fixed level, so the same input
//! always produces the same bytes. Decompression is bounded: a frame that
//! inflates past the configured limit is rejected as corrupt instead of
//! exhausting memory.

use std::io::Read;

use crate::error::{CoreError, Result};

/// Default compression level. Payloads are tiny, so favour ratio over speed.
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 19;

/// Default upper bound on decompressed size (1 MiB).
pub const DEFAULT_MAX_DECOMPRESSED_LEN: usize = 1 << 20;

/// Compress with the default level.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    compress_with_level(data, DEFAULT_COMPRESSION_LEVEL)
}

/// Compress with an explicit Zstd level.
pub fn compress_with_level(data: &[u8], level: i32) -> Result<Vec<u8>> {
    zstd::encode_all(data, level).map_err(|e| CoreError::CorruptData(e.to_string()))
}

/// Decompress with the default size limit.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    decompress_bounded(data, DEFAULT_MAX_DECOMPRESSED_LEN)
}

/// Decompress, refusing output larger than `max_len`.
///
/// Fails with [`CoreError::CorruptData`] on empty, malformed, or truncated
/// input.
pub fn decompress_bounded(data: &[u8], max_len: usize) -> Result<Vec<u8>> {
    if data.is_empty() {
        return Err(CoreError::CorruptData("empty compressed stream".into()));
    }

    let decoder =
        zstd::stream::Decoder::new(data).map_err(|e| CoreError::CorruptData(e.to_string()))?;

    let mut output = Vec::new();
    decoder
        .take(max_len as u64 + 1)
        .read_to_end(&mut output)
        .map_err(|e| CoreError::CorruptData(e.to_string()))?;

    if output.len() > max_len {
        return Err(CoreError::CorruptData(format!(
            "decompressed size exceeds limit of {max_len} bytes"
        )));
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_roundtrip_text() {
        let input = b"hello hello hello hello hello";
        let compressed = compress(input).unwrap();
        assert_eq!(decompress(&compressed).unwrap(), input);
    }

    #[test]
    fn test_roundtrip_empty() {
        let compressed = compress(b"").unwrap();
        assert!(!compressed.is_empty());
        assert_eq!(decompress(&compressed).unwrap(), b"");
    }

    #[test]
    fn test_deterministic() {
        let input = b"the same input compresses to the same bytes";
        assert_eq!(compress(input).unwrap(), compress(input).unwrap());
    }

    #[test]
    fn test_truncated_fails() {
        let compressed = compress(&[7u8; 512]).unwrap();
        let truncated = &compressed[..compressed.len() - 3];
        assert!(matches!(
            decompress(truncated),
            Err(CoreError::CorruptData(_))
        ));
    }

    #[test]
    fn test_garbage_fails() {
        assert!(matches!(
            decompress(b"definitely not zstd"),
            Err(CoreError::CorruptData(_))
        ));
        assert!(matches!(decompress(b""), Err(CoreError::CorruptData(_))));
    }

    #[test]
    fn test_size_limit() {
        let compressed = compress(&[0u8; 4096]).unwrap();
        assert!(decompress_bounded(&compressed, 4096).is_ok());
        assert!(matches!(
            decompress_bounded(&compressed, 4095),
            Err(CoreError::CorruptData(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_roundtrip(data in prop::collection::vec(any::<u8>(), 0..2048)) {
            let compressed = compress_with_level(&data, 3).unwrap();
            prop_assert_eq!(decompress(&compressed).unwrap(), data);
        }
    }
}
