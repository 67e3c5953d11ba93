//! Unchunker: routes incoming chunks to per-message collectors.
//!
//! State per message id: absent → collecting → (complete) → absent.
//! The collector for an id is created by the first chunk seen for it and
//! removed in the same critical section that merges it, so a message is
//! delivered to the sink exactly once per completion.
//!
//! Stale collectors are never dropped automatically. Whoever drives the
//! transport decides when to call [`Unchunker::gc`] (or enumerate with
//! [`Unchunker::stale_ids`] and [`Unchunker::remove`] itself).

use std::time::Duration;

use bytes::Bytes;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::collector::ChunkCollector;
use crate::wire::Chunk;

/// Errors raised while decoding and collecting chunks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnchunkerError {
    #[error("not all chunks for the message have arrived yet")]
    MessageNotYetComplete,

    #[error("chunk for message {got} given to collector for message {expected}")]
    InconsistentMessageId { expected: u32, got: u32 },

    #[error("chunk of {0} bytes is smaller than the header")]
    ChunkTooSmall(usize),
}

/// Receives every message the [`Unchunker`] reassembles.
///
/// Called once per completed message, after the registry lock for that
/// message has been released.
pub trait MessageSink: Send + Sync {
    fn message_complete(&self, message: Bytes);
}

/// Merges chunks from any number of interleaved messages.
///
/// A chunk arriving for an id whose message was already delivered opens a
/// fresh collector. Until that collector is reclaimed by [`Unchunker::gc`]
/// or [`Unchunker::remove`], it also receives the chunks of any new message
/// sent under the same id, and the leftover chunk is merged into it.
/// Senders must not reuse an id within the gc max age.
pub struct Unchunker<S> {
    collectors: DashMap<u32, ChunkCollector>,
    sink: S,
}

impl<S: MessageSink> Unchunker<S> {
    pub fn new(sink: S) -> Self {
        Self {
            collectors: DashMap::new(),
            sink,
        }
    }

    /// Ingest one raw chunk as received from the wire.
    ///
    /// If the chunk completes its message, the assembled bytes are handed
    /// to the sink and the collector is discarded.
    pub fn add_chunk(&self, raw: &[u8]) -> Result<(), UnchunkerError> {
        let chunk = Chunk::decode(raw)?;
        let id = chunk.id;
        let serial = chunk.serial;

        tracing::trace!(
            id,
            serial,
            payload_len = chunk.data.len(),
            end_of_message = chunk.end_of_message,
            "chunk received"
        );

        let assembled = match self.collectors.entry(id) {
            Entry::Occupied(mut entry) => {
                let collector = entry.get_mut();
                collector.add_chunk(chunk)?;
                if collector.is_complete() {
                    let message = collector.merge()?;
                    entry.remove();
                    Some(message)
                } else {
                    None
                }
            }
            Entry::Vacant(entry) => {
                let mut collector = ChunkCollector::new();
                collector.add_chunk(chunk)?;
                if collector.is_complete() {
                    Some(collector.merge()?)
                } else {
                    tracing::debug!(id, "collecting new message");
                    entry.insert(collector);
                    None
                }
            }
        };

        if let Some(message) = assembled {
            tracing::debug!(id, bytes = message.len(), "message reassembled");
            self.sink.message_complete(message);
        }
        Ok(())
    }

    /// Number of messages currently being collected.
    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }

    /// Ids of all messages currently being collected.
    pub fn message_ids(&self) -> Vec<u32> {
        self.collectors.iter().map(|e| *e.key()).collect()
    }

    /// Ids of collectors that have not seen a chunk for longer than `max_age`.
    pub fn stale_ids(&self, max_age: Duration) -> Vec<u32> {
        self.collectors
            .iter()
            .filter(|e| e.value().is_older_than(max_age))
            .map(|e| *e.key())
            .collect()
    }

    /// Drop the collector for `id`, returning it if there was one.
    pub fn remove(&self, id: u32) -> Option<ChunkCollector> {
        self.collectors.remove(&id).map(|(_, collector)| collector)
    }

    /// Remove every collector older than `max_age`. Returns how many were removed.
    pub fn gc(&self, max_age: Duration) -> usize {
        let before = self.collectors.len();
        self.collectors.retain(|id, collector| {
            let stale = collector.is_older_than(max_age);
            if stale {
                tracing::debug!(
                    id,
                    chunks = collector.len(),
                    expected = ?collector.expected_len(),
                    "discarding stale collector"
                );
            }
            !stale
        });
        before.saturating_sub(self.collectors.len())
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
