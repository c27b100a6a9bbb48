//! Dense 15-bit text encoding.
//!
//! Input bits are taken most-significant first in groups of 15. Each group
//! maps to one of 32768 code points drawn from three contiguous, fully
//! assigned blocks:
//!
//! ```text
//! index     0..6592   U+3400..U+4DBF  CJK Unified Ideographs Extension A
//! index  6592..27584  U+4E00..U+9FFF  CJK Unified Ideographs
//! index 27584..32768  U+AC00..U+C03F  Hangul Syllables (prefix)
//! ```
//!
//! The final partial group is zero-padded in its low-order bits. One
//! trailing marker character from U+2460..U+246E records how many pad bits
//! were added (0 to 14), so the decoder trims exactly. Empty input encodes to
//! the empty string.

use super::TextEncoding;
use crate::error::{CoreError, Result};

const BITS: u32 = 15;
const MASK: u32 = (1 << BITS) - 1;

/// `(first code point, length)` of each alphabet block, in index order.
const BLOCKS: [(u32, u32); 3] = [(0x3400, 6592), (0x4E00, 20992), (0xAC00, 5184)];

/// Pad marker for zero pad bits; marker for `n` pad bits is `PAD_BASE + n`.
const PAD_BASE: u32 = 0x2460;

/// The dense 15-bits-per-character encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base32768;

fn symbol(index: u32) -> char {
    let mut rest = index;
    for (start, len) in BLOCKS {
        if rest < len {
            // Every block lies outside the surrogate range.
            return char::from_u32(start + rest).unwrap_or(char::REPLACEMENT_CHARACTER);
        }
        rest -= len;
    }
    char::REPLACEMENT_CHARACTER
}

fn symbol_index(c: char) -> Option<u32> {
    let cp = c as u32;
    let mut offset = 0;
    for (start, len) in BLOCKS {
        if (start..start + len).contains(&cp) {
            return Some(offset + cp - start);
        }
        offset += len;
    }
    None
}

fn pad_marker(pad: u32) -> char {
    char::from_u32(PAD_BASE + pad).unwrap_or(char::REPLACEMENT_CHARACTER)
}

fn pad_from_marker(c: char) -> Option<u32> {
    let cp = c as u32;
    (PAD_BASE..PAD_BASE + BITS).contains(&cp).then(|| cp - PAD_BASE)
}

impl TextEncoding for Base32768 {
    fn encode(&self, bytes: &[u8]) -> String {
        if bytes.is_empty() {
            return String::new();
        }

        let mut out = String::with_capacity(self.encoded_len(bytes.len()) * 3);
        let mut acc: u32 = 0;
        let mut nbits: u32 = 0;

        for &byte in bytes {
            acc = (acc << 8) | byte as u32;
            nbits += 8;
            while nbits >= BITS {
                nbits -= BITS;
                out.push(symbol((acc >> nbits) & MASK));
            }
            acc &= (1 << nbits) - 1;
        }

        let pad = if nbits > 0 {
            let pad = BITS - nbits;
            out.push(symbol((acc << pad) & MASK));
            pad
        } else {
            0
        };

        out.push(pad_marker(pad));
        out
    }

    fn decode(&self, text: &str) -> Result<Vec<u8>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let chars: Vec<char> = text.chars().collect();
        let marker_pos = chars.len() - 1;
        let pad = pad_from_marker(chars[marker_pos]).ok_or_else(|| {
            CoreError::invalid_encoding(marker_pos, "missing pad marker (truncated input)")
        })?;

        let data = &chars[..marker_pos];
        if data.is_empty() {
            return Err(CoreError::invalid_encoding(0, "pad marker without data"));
        }

        let total_bits = data.len() * BITS as usize - pad as usize;
        if total_bits % 8 != 0 {
            return Err(CoreError::invalid_encoding(
                marker_pos,
                "pad length does not align to a byte boundary",
            ));
        }
        let byte_len = total_bits / 8;

        let mut out = Vec::with_capacity(byte_len + 2);
        let mut acc: u32 = 0;
        let mut nbits: u32 = 0;
        let mut last = 0;

        for (pos, &c) in data.iter().enumerate() {
            let value = symbol_index(c).ok_or_else(|| {
                CoreError::invalid_encoding(pos, format!("character {c:?} outside alphabet"))
            })?;
            last = value;

            acc = (acc << BITS) | value;
            nbits += BITS;
            while nbits >= 8 {
                nbits -= 8;
                out.push((acc >> nbits) as u8);
            }
            acc &= (1 << nbits) - 1;
        }

        if last & ((1 << pad) - 1) != 0 {
            return Err(CoreError::invalid_encoding(
                marker_pos - 1,
                "non-zero padding bits",
            ));
        }

        out.truncate(byte_len);
        Ok(out)
    }

    fn encoded_len(&self, len: usize) -> usize {
        if len == 0 {
            0
        } else {
            (len * 8).div_ceil(BITS as usize) + 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_is_bijective() {
        let mut seen = std::collections::HashSet::new();
        for index in 0..=MASK {
            let c = symbol(index);
            assert_ne!(c, char::REPLACEMENT_CHARACTER);
            assert_eq!(symbol_index(c), Some(index));
            assert!(seen.insert(c));
        }
        assert_eq!(seen.len(), 32768);
    }

    #[test]
    fn test_markers_disjoint_from_alphabet() {
        for pad in 0..BITS {
            let marker = pad_marker(pad);
            assert_eq!(symbol_index(marker), None);
            assert_eq!(pad_from_marker(marker), Some(pad));
        }
    }

    #[test]
    fn test_short_lengths_roundtrip() {
        for len in 0..=32usize {
            let data: Vec<u8> = (0..len as u8).map(|b| b.wrapping_mul(37) ^ 0xa5).collect();
            let text = Base32768.encode(&data);
            assert_eq!(text.chars().count(), Base32768.encoded_len(len));
            assert_eq!(Base32768.decode(&text).unwrap(), data, "len {len}");
        }
    }

    #[test]
    fn test_single_byte() {
        // 8 bits -> one symbol with 7 pad bits.
        let text = Base32768.encode(&[0xff]);
        let chars: Vec<char> = text.chars().collect();
        assert_eq!(chars.len(), 2);
        assert_eq!(symbol_index(chars[0]), Some(0xff << 7));
        assert_eq!(pad_from_marker(chars[1]), Some(7));
    }

    #[test]
    fn test_exact_group_has_zero_pad() {
        // 15 bytes = 120 bits = exactly 8 symbols.
        let text = Base32768.encode(&[0x5a; 15]);
        let chars: Vec<char> = text.chars().collect();
        assert_eq!(chars.len(), 9);
        assert_eq!(pad_from_marker(chars[8]), Some(0));
    }

    #[test]
    fn test_rejects_missing_marker() {
        let text = Base32768.encode(b"hello");
        let truncated: String = text.chars().take(text.chars().count() - 1).collect();
        assert!(matches!(
            Base32768.decode(&truncated),
            Err(CoreError::InvalidEncoding { .. })
        ));
    }

    #[test]
    fn test_rejects_foreign_character() {
        let text: String = std::iter::once('A')
            .chain(Base32768.encode(b"hello world").chars().skip(1))
            .collect();
        let err = Base32768.decode(&text).unwrap_err();
        assert!(matches!(err, CoreError::InvalidEncoding { position: 0, .. }));
    }

    #[test]
    fn test_rejects_misaligned_pad() {
        // One symbol plus "3 pad bits" leaves 12 bits, not a whole byte count.
        let text: String = [symbol(0), pad_marker(3)].iter().collect();
        assert!(Base32768.decode(&text).is_err());
    }

    #[test]
    fn test_rejects_dirty_pad_bits() {
        let text: String = [symbol(1), pad_marker(7)].iter().collect();
        assert!(Base32768.decode(&text).is_err());
    }

    #[test]
    fn test_rejects_bare_marker() {
        let text: String = [pad_marker(0)].iter().collect();
        assert!(Base32768.decode(&text).is_err());
    }
}
