//! Golden test vectors for the text encodings and integer framing.
//!
//! Another client speaking the same wire format must produce exactly these
//! strings.

use courier_core::{frame, to_bytes, Encoding, TextEncoding, TransmissionId};

/// A golden encoding vector.
#[derive(Debug, Clone)]
pub struct EncodingVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Input bytes (hex).
    pub bytes_hex: &'static str,
    /// Expected base64 text.
    pub base64: &'static str,
    /// Expected dense text.
    pub base32768: &'static str,
}

/// Get all encoding vectors.
pub fn encoding_vectors() -> Vec<EncodingVector> {
    vec![
        EncodingVector {
            name: "empty",
            bytes_hex: "",
            base64: "",
            base32768: "",
        },
        EncodingVector {
            name: "single zero byte",
            bytes_hex: "00",
            base64: "AA==",
            base32768: "\u{3400}\u{2467}",
        },
        EncodingVector {
            name: "single 0xff byte",
            bytes_hex: "ff",
            base64: "/w==",
            base32768: "\u{bfc0}\u{2467}",
        },
        EncodingVector {
            name: "f",
            bytes_hex: "66",
            base64: "Zg==",
            base32768: "\u{6740}\u{2467}",
        },
        EncodingVector {
            name: "fo",
            bytes_hex: "666f",
            base64: "Zm8=",
            base32768: "\u{6777}\u{7440}\u{246e}",
        },
        EncodingVector {
            name: "foo",
            bytes_hex: "666f6f",
            base64: "Zm9v",
            base32768: "\u{6777}\u{9000}\u{2466}",
        },
        EncodingVector {
            name: "hello",
            bytes_hex: "68656c6c6f",
            base64: "aGVsbG8=",
            base32768: "\u{6872}\u{8f5b}\u{41e0}\u{2465}",
        },
        EncodingVector {
            name: "one full group of zeros",
            bytes_hex: "000000000000000000000000000000",
            base64: "AAAAAAAAAAAAAAAAAAAA",
            base32768: "\u{3400}\u{3400}\u{3400}\u{3400}\u{3400}\u{3400}\u{3400}\u{3400}\u{2460}",
        },
        EncodingVector {
            name: "one full group of ones",
            bytes_hex: "ffffffffffffffffffffffffffffff",
            base64: "////////////////////",
            base32768: "\u{c03f}\u{c03f}\u{c03f}\u{c03f}\u{c03f}\u{c03f}\u{c03f}\u{c03f}\u{2460}",
        },
        EncodingVector {
            name: "counting bytes",
            bytes_hex: "000102030405060708090a0b0c0d0e0f",
            base64: "AAECAwQFBgcICQoLDA0ODw==",
            base32768: "\u{3400}\u{74c0}\u{94c0}\u{84a0}\u{6c80}\u{5868}\u{4a18}\u{410e}\u{3b80}\u{2467}",
        },
    ]
}

/// A golden framing vector.
#[derive(Debug, Clone)]
pub struct FrameVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Transmission id.
    pub id: u64,
    /// Frame body.
    pub body: &'static [u8],
    /// Expected frame (hex).
    pub frame_hex: &'static str,
}

/// Get all framing vectors.
pub fn frame_vectors() -> Vec<FrameVector> {
    vec![
        FrameVector {
            name: "zero id, empty body",
            id: 0,
            body: b"",
            frame_hex: "0000000000000000",
        },
        FrameVector {
            name: "max id",
            id: u64::MAX,
            body: b"\x00",
            frame_hex: "ffffffffffffffff00",
        },
        FrameVector {
            name: "big-endian order",
            id: 0x0102_0304_0506_0708,
            body: b"hi",
            frame_hex: "01020304050607086869",
        },
    ]
}

/// Check every vector, returning `(name, matches)`.
pub fn verify_all_vectors() -> Vec<(String, bool)> {
    let mut results = Vec::new();

    for v in encoding_vectors() {
        let ok = hex::decode(v.bytes_hex)
            .map(|bytes| {
                Encoding::Base64.encode(&bytes) == v.base64
                    && Encoding::Base32768.encode(&bytes) == v.base32768
                    && Encoding::Base64.decode(v.base64).ok().as_ref() == Some(&bytes)
                    && Encoding::Base32768.decode(v.base32768).ok().as_ref() == Some(&bytes)
            })
            .unwrap_or(false);
        results.push((v.name.to_string(), ok));
    }

    for v in frame_vectors() {
        let ok = hex::encode(frame(TransmissionId(v.id), v.body)) == v.frame_hex
            && v.frame_hex.starts_with(&hex::encode(to_bytes(v.id)));
        results.push((v.name.to_string(), ok));
    }

    results
}
