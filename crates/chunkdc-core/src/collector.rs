//! Chunk collector: accumulates the chunks of a single message.

use std::time::{Duration, Instant};

use bytes::{Bytes, BytesMut};

use crate::unchunker::UnchunkerError;
use crate::wire::Chunk;

/// Collects chunks belonging to one message until it can be merged.
///
/// Completion is a count check: the end chunk has arrived and the number
/// of stored chunks equals `end.serial + 1`. Duplicates are stored, not
/// dropped, so a duplicate can stand in for a chunk that never arrived.
///
/// The collector does no locking of its own. The [`Unchunker`] holds
/// collectors inside its registry and serializes access per entry.
///
/// [`Unchunker`]: crate::unchunker::Unchunker
#[derive(Debug)]
pub struct ChunkCollector {
    chunks: Vec<Chunk>,
    /// `serial + 1` of the end chunk, once it has arrived. Kept as `u64`
    /// so `u32::MAX + 1` fits on every target.
    message_length: Option<u64>,
    last_update: Instant,
}

impl Default for ChunkCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkCollector {
    pub fn new() -> Self {
        Self {
            chunks: Vec::new(),
            message_length: None,
            last_update: Instant::now(),
        }
    }

    /// Register a new incoming chunk for this message.
    ///
    /// Fails without touching state if the chunk belongs to a different
    /// message than the ones already collected.
    pub fn add_chunk(&mut self, chunk: Chunk) -> Result<(), UnchunkerError> {
        if let Some(expected) = self.message_id() {
            if chunk.id != expected {
                return Err(UnchunkerError::InconsistentMessageId {
                    expected,
                    got: chunk.id,
                });
            }
        }

        if self.chunks.iter().any(|c| c.serial == chunk.serial) {
            tracing::debug!(id = chunk.id, serial = chunk.serial, "duplicate chunk serial");
        }

        if chunk.end_of_message {
            self.message_length = Some(u64::from(chunk.serial) + 1);
        }
        self.chunks.push(chunk);
        self.last_update = Instant::now();
        Ok(())
    }

    /// Whether every chunk of the message (by count) has arrived.
    pub fn is_complete(&self) -> bool {
        self.message_length == Some(self.chunks.len() as u64)
    }

    /// Whether the last chunk arrived longer than `interval` ago.
    pub fn is_older_than(&self, interval: Duration) -> bool {
        self.last_update.elapsed() > interval
    }

    /// Merge the chunks into the complete message.
    ///
    /// Chunks are sorted by serial in place; the sort is stable, so the
    /// result is the same however often this is called.
    pub fn merge(&mut self) -> Result<Bytes, UnchunkerError> {
        if !self.is_complete() {
            return Err(UnchunkerError::MessageNotYetComplete);
        }

        self.chunks.sort_by_key(Chunk::sort_key);

        let capacity = self.chunks.iter().map(|c| c.data.len()).sum();
        let mut message = BytesMut::with_capacity(capacity);
        for chunk in &self.chunks {
            message.extend_from_slice(&chunk.data);
        }
        Ok(message.freeze())
    }

    /// Message id this collector is bound to, if any chunk has arrived.
    pub fn message_id(&self) -> Option<u32> {
        self.chunks.first().map(|c| c.id)
    }

    /// Number of chunks stored, duplicates included.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Number of chunks the message consists of, known once the end chunk arrived.
    pub fn expected_len(&self) -> Option<u64> {
        self.message_length
    }

    pub fn last_update(&self) -> Instant {
        self.last_update
    }
}
