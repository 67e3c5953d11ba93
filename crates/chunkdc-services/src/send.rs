//! Sending: split a message and queue its chunks for the transport.

use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::{Context, Result};
use bytes::Bytes;
use tokio::sync::mpsc;

use chunkdc_core::Chunker;

/// Hands out message ids for outgoing messages.
///
/// Ids wrap around at `u32::MAX`. A receiver only confuses two messages
/// if both are still being collected when the counter comes back round.
///
/// A late duplicate of an already delivered message leaves a collector
/// behind at the receiver until its gc max age passes, and a new message
/// sent under that id in the meantime is merged with the leftover. Ids
/// handed out here must not come round again within that max age.
#[derive(Debug, Default)]
pub struct MessageIds {
    next: AtomicU32,
}

impl MessageIds {
    pub fn starting_at(first: u32) -> Self {
        Self {
            next: AtomicU32::new(first),
        }
    }

    pub fn next_id(&self) -> u32 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

/// Split `data` into chunks of at most `chunk_size` bytes and queue them on `tx`
/// in serial order. Returns the number of chunks queued.
pub async fn send_message(
    tx: &mpsc::Sender<Bytes>,
    id: u32,
    data: impl Into<Bytes>,
    chunk_size: u32,
) -> Result<usize> {
    let chunker = Chunker::new(id, data, chunk_size)
        .with_context(|| format!("failed to chunk message {id}"))?;

    let mut sent = 0;
    for chunk in chunker {
        tx.send(chunk)
            .await
            .context("chunk receiver dropped")?;
        sent += 1;
    }

    tracing::debug!(id, chunks = sent, chunk_size, "message queued");
    Ok(sent)
}
