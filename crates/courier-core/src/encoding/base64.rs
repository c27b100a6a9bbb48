//! Standard base64 (RFC 4648, `=` padded).

use super::TextEncoding;
use crate::error::{CoreError, Result};

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const PAD: u8 = b'=';

/// Standard base64 encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64;

fn symbol_value(byte: u8) -> Option<u32> {
    match byte {
        b'A'..=b'Z' => Some((byte - b'A') as u32),
        b'a'..=b'z' => Some((byte - b'a') as u32 + 26),
        b'0'..=b'9' => Some((byte - b'0') as u32 + 52),
        b'+' => Some(62),
        b'/' => Some(63),
        _ => None,
    }
}

impl TextEncoding for Base64 {
    fn encode(&self, bytes: &[u8]) -> String {
        let mut out = String::with_capacity(self.encoded_len(bytes.len()));

        for chunk in bytes.chunks(3) {
            let b0 = chunk[0] as u32;
            let b1 = chunk.get(1).copied().unwrap_or(0) as u32;
            let b2 = chunk.get(2).copied().unwrap_or(0) as u32;
            let group = (b0 << 16) | (b1 << 8) | b2;

            out.push(ALPHABET[(group >> 18) as usize & 0x3f] as char);
            out.push(ALPHABET[(group >> 12) as usize & 0x3f] as char);
            if chunk.len() > 1 {
                out.push(ALPHABET[(group >> 6) as usize & 0x3f] as char);
            } else {
                out.push(PAD as char);
            }
            if chunk.len() > 2 {
                out.push(ALPHABET[group as usize & 0x3f] as char);
            } else {
                out.push(PAD as char);
            }
        }

        out
    }

    fn decode(&self, text: &str) -> Result<Vec<u8>> {
        let input = text.as_bytes();
        if input.len() % 4 != 0 {
            return Err(CoreError::invalid_encoding(
                input.len(),
                "length is not a multiple of 4",
            ));
        }

        let mut out = Vec::with_capacity(input.len() / 4 * 3);
        let groups = input.len() / 4;

        for (g, quad) in input.chunks(4).enumerate() {
            let base = g * 4;
            let is_last = g + 1 == groups;

            let pads = quad.iter().rev().take_while(|&&b| b == PAD).count();
            if pads > 2 || (pads > 0 && !is_last) {
                return Err(CoreError::invalid_encoding(
                    base + 4 - pads,
                    "unexpected padding",
                ));
            }

            let mut group = 0u32;
            for (i, &byte) in quad[..4 - pads].iter().enumerate() {
                let value = symbol_value(byte).ok_or_else(|| {
                    CoreError::invalid_encoding(base + i, "character outside base64 alphabet")
                })?;
                group |= value << (18 - 6 * i);
            }

            let produced = 3 - pads;
            // Bits below the last produced byte must be zero.
            let unused_mask = (1u32 << (8 * (3 - produced))) - 1;
            if group & unused_mask != 0 {
                return Err(CoreError::invalid_encoding(
                    base + 3 - pads,
                    "non-zero padding bits",
                ));
            }

            for i in 0..produced {
                out.push((group >> (16 - 8 * i)) as u8);
            }
        }

        Ok(out)
    }

    fn encoded_len(&self, len: usize) -> usize {
        len.div_ceil(3) * 4
    }
}
