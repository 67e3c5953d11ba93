//! Chunk producer: splits one message into framed chunks.
//!
//! A [`Chunker`] is a one-shot cursor over a message. Each call to
//! [`Iterator::next`] frames the next slice of payload; once the final
//! chunk has been produced the cursor is exhausted for good. Re-splitting
//! a message needs a new `Chunker`.
//!
//! The cursor position is plain mutable state with no synchronization.
//! Iteration takes `&mut self`, so sharing one `Chunker` between threads
//! requires the caller to wrap it in their own lock.

use bytes::Bytes;

use crate::wire::{Chunk, HEADER_LENGTH};

/// Errors raised when constructing a [`Chunker`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChunkerError {
    #[error("chunk size {chunk_size} cannot hold a header and one payload byte (minimum {min})")]
    ChunkSizeTooSmall { chunk_size: u32, min: u32 },

    #[error("cannot chunk an empty message")]
    DataEmpty,
}

/// Splits a message into chunks of at most `chunk_size` bytes on the wire.
#[derive(Debug)]
pub struct Chunker {
    id: u32,
    data: Bytes,
    /// Payload bytes per chunk (`chunk_size - HEADER_LENGTH`).
    capacity: usize,
    /// Offset of the first byte not yet emitted.
    offset: usize,
    /// Serial of the next chunk to emit.
    serial: u32,
}

impl Chunker {
    /// Create a chunker for message `id`.
    ///
    /// `chunk_size` is the full wire size of a chunk, header included.
    pub fn new(id: u32, data: impl Into<Bytes>, chunk_size: u32) -> Result<Self, ChunkerError> {
        let min = HEADER_LENGTH as u32 + 1;
        if chunk_size < min {
            return Err(ChunkerError::ChunkSizeTooSmall { chunk_size, min });
        }

        let data = data.into();
        if data.is_empty() {
            return Err(ChunkerError::DataEmpty);
        }

        Ok(Self {
            id,
            data,
            capacity: chunk_size as usize - HEADER_LENGTH,
            offset: 0,
            serial: 0,
        })
    }

    /// Message id stamped on every chunk.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Whether another chunk remains.
    pub fn has_next(&self) -> bool {
        self.offset < self.data.len()
    }

    /// Payload bytes not yet emitted.
    pub fn remaining_bytes(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Chunks not yet emitted.
    pub fn remaining_chunks(&self) -> usize {
        self.remaining_bytes().div_ceil(self.capacity)
    }
}

impl Iterator for Chunker {
    type Item = Bytes;

    fn next(&mut self) -> Option<Bytes> {
        if !self.has_next() {
            return None;
        }

        let remaining = self.remaining_bytes();
        let end_of_message = remaining <= self.capacity;
        let len = remaining.min(self.capacity);
        let payload = self.data.slice(self.offset..self.offset + len);

        let chunk = Chunk::new(end_of_message, self.id, self.serial, payload);
        self.offset += len;
        self.serial = self.serial.wrapping_add(1);

        tracing::trace!(
            id = chunk.id,
            serial = chunk.serial,
            payload_len = len,
            end_of_message,
            "chunk produced"
        );

        Some(chunk.encode())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining_chunks();
        (n, Some(n))
    }
}

impl ExactSizeIterator for Chunker {}

impl std::iter::FusedIterator for Chunker {}
