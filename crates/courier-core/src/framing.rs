//! Fixed-width big-endian integer framing and the transmission wire frame.
//!
//! Every multi-byte integer in the stack is big-endian. The wire frame is
//!
//! ```text
//! [8-byte big-endian transmission id][body...]
//! ```
//!
//! The id sits at a fixed offset, outside compression and encryption, so a
//! receiver can deduplicate before doing any expensive work.

use crate::error::{CoreError, Result};
use crate::types::TransmissionId;

/// An integer with a fixed big-endian width on the wire.
pub trait BeInt: Sized + Copy {
    /// Width in bytes.
    const WIDTH: usize;

    /// Encode as `WIDTH` big-endian bytes.
    fn to_bytes(self) -> Vec<u8>;

    /// Decode from the first `WIDTH` bytes of `bytes`.
    ///
    /// Fails with [`CoreError::BufferUnderrun`] if the slice is too short.
    /// Extra trailing bytes are ignored.
    fn from_bytes(bytes: &[u8]) -> Result<Self>;
}

macro_rules! impl_be_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl BeInt for $ty {
                const WIDTH: usize = std::mem::size_of::<$ty>();

                fn to_bytes(self) -> Vec<u8> {
                    self.to_be_bytes().to_vec()
                }

                fn from_bytes(bytes: &[u8]) -> Result<Self> {
                    let head = bytes.get(..Self::WIDTH).ok_or(CoreError::BufferUnderrun {
                        needed: Self::WIDTH,
                        got: bytes.len(),
                    })?;
                    let mut arr = [0u8; std::mem::size_of::<$ty>()];
                    arr.copy_from_slice(head);
                    Ok(<$ty>::from_be_bytes(arr))
                }
            }
        )*
    };
}

impl_be_int!(u16, u32, u64, i16, i32, i64);

/// Encode an integer as fixed-width big-endian bytes.
pub fn to_bytes<T: BeInt>(value: T) -> Vec<u8> {
    value.to_bytes()
}

/// Decode a fixed-width big-endian integer.
pub fn from_bytes<T: BeInt>(bytes: &[u8]) -> Result<T> {
    T::from_bytes(bytes)
}

/// Sequential reader over a byte slice with checked integer reads.
#[derive(Debug, Clone)]
pub struct FrameReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> FrameReader<'a> {
    /// Start reading at the beginning of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Read one fixed-width integer and advance past it.
    pub fn read<T: BeInt>(&mut self) -> Result<T> {
        let value = T::from_bytes(self.remaining_slice())?;
        self.pos += T::WIDTH;
        Ok(value)
    }

    /// Read exactly `len` bytes and advance past them.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let rest = self.remaining_slice();
        if rest.len() < len {
            return Err(CoreError::BufferUnderrun {
                needed: len,
                got: rest.len(),
            });
        }
        self.pos += len;
        Ok(&rest[..len])
    }

    /// Read a fixed-size array and advance past it.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut arr = [0u8; N];
        arr.copy_from_slice(self.read_bytes(N)?);
        Ok(arr)
    }

    /// Everything not yet consumed.
    pub fn remaining_slice(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }
}

/// Size of the frame header (the transmission id).
pub const FRAME_HEADER_LEN: usize = 8;

/// Prefix `body` with the transmission id.
pub fn frame(id: TransmissionId, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(FRAME_HEADER_LEN + body.len());
    out.extend_from_slice(&id.0.to_be_bytes());
    out.extend_from_slice(body);
    out
}

/// Split a frame into its id and body.
pub fn unframe(bytes: &[u8]) -> Result<(TransmissionId, &[u8])> {
    let mut reader = FrameReader::new(bytes);
    let id = TransmissionId(reader.read::<u64>()?);
    Ok((id, reader.remaining_slice()))
}

/// Read only the id from a frame without touching the body.
pub fn peek_id(bytes: &[u8]) -> Result<TransmissionId> {
    u64::from_bytes(bytes).map(TransmissionId)
}
