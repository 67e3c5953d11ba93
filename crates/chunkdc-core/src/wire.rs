//! Chunk wire format: the framing every peer must agree on bit for bit.
//!
//! A chunk is a fixed 9-byte header followed by the payload:
//!
//! ```text
//! offset  size  field
//!      0     1  options (bit 0 = end of message, bits 1-7 reserved)
//!      1     4  message id, big-endian
//!      5     4  serial, big-endian
//!      9     n  payload
//! ```
//!
//! Changing anything here breaks interoperability with every other
//! chunked data channel implementation. The header is a zerocopy struct
//! with network-order integer fields, so encoding and decoding never
//! touch unsafe code.

use bytes::{BufMut, Bytes, BytesMut};
use static_assertions::assert_eq_size;
use zerocopy::byteorder::{NetworkEndian, U32};
use zerocopy::{AsBytes, FromBytes, FromZeroes, Unaligned};

use crate::unchunker::UnchunkerError;

// ── Constants ─────────────────────────────────────────────────────────────────

/// Length of the chunk header in bytes.
pub const HEADER_LENGTH: usize = 9;

/// Options bit marking the final chunk of a message.
pub const END_OF_MESSAGE: u8 = 0x01;

// ── Chunk Header ─────────────────────────────────────────────────────────────

/// The on-wire chunk header.
///
/// Wire size: 9 bytes. Every field is alignment 1, so the struct has no
/// padding and can be read straight out of an arbitrary byte buffer.
#[derive(Debug, Clone, AsBytes, FromBytes, FromZeroes, Unaligned)]
#[repr(C)]
pub struct ChunkHeader {
    /// Bit flags:
    ///   bit    0: end of message
    ///   bits 1-7: reserved, written as zero and ignored on read
    pub options: u8,

    /// Message identifier shared by every chunk of one message.
    pub id: U32<NetworkEndian>,

    /// 0-based position of this chunk within its message.
    pub serial: U32<NetworkEndian>,
}

// Compile-time size guard. If this fails, the wire format has silently changed.
assert_eq_size!(ChunkHeader, [u8; HEADER_LENGTH]);

impl ChunkHeader {
    pub fn new(end_of_message: bool, id: u32, serial: u32) -> Self {
        Self {
            options: if end_of_message { END_OF_MESSAGE } else { 0 },
            id: U32::new(id),
            serial: U32::new(serial),
        }
    }

    pub fn end_of_message(&self) -> bool {
        self.options & END_OF_MESSAGE != 0
    }
}

// ── Chunk ─────────────────────────────────────────────────────────────────────

/// One framed unit of a split message, header fields decoded.
///
/// Equality is structural over all four fields. Reassembly order is
/// `(id, serial)`, exposed through [`Chunk::sort_key`] rather than `Ord`
/// because two distinct chunks may share a sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub end_of_message: bool,
    pub id: u32,
    pub serial: u32,
    /// Payload only, header stripped. May be empty.
    pub data: Bytes,
}

impl Chunk {
    pub fn new(end_of_message: bool, id: u32, serial: u32, data: impl Into<Bytes>) -> Self {
        Self {
            end_of_message,
            id,
            serial,
            data: data.into(),
        }
    }

    /// Parse a raw chunk received from the wire.
    ///
    /// Fails with [`UnchunkerError::ChunkTooSmall`] if there is not a full
    /// header. Everything after the header is payload.
    pub fn decode(raw: &[u8]) -> Result<Self, UnchunkerError> {
        let header = ChunkHeader::read_from_prefix(raw)
            .ok_or(UnchunkerError::ChunkTooSmall(raw.len()))?;

        Ok(Self {
            end_of_message: header.end_of_message(),
            id: header.id.get(),
            serial: header.serial.get(),
            data: Bytes::copy_from_slice(&raw[HEADER_LENGTH..]),
        })
    }

    /// Frame this chunk for the wire. Always `HEADER_LENGTH + data.len()` bytes.
    pub fn encode(&self) -> Bytes {
        let header = ChunkHeader::new(self.end_of_message, self.id, self.serial);
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        buf.put_slice(header.as_bytes());
        buf.put_slice(&self.data);
        buf.freeze()
    }

    pub fn encoded_len(&self) -> usize {
        HEADER_LENGTH + self.data.len()
    }

    /// Reassembly ordering key.
    pub fn sort_key(&self) -> (u32, u32) {
        (self.id, self.serial)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
