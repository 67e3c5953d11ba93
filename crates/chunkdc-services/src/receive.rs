//! Chunk ingestion: feeds raw chunks from the transport into an unchunker.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc;

use chunkdc_core::{MessageSink, Unchunker};

/// Drain `rx` into `unchunker` until the transport side closes the channel.
///
/// A chunk the unchunker rejects is discarded; one bad chunk does not end
/// the loop. Returns the number of chunks discarded.
pub async fn receive_loop<S: MessageSink>(
    mut rx: mpsc::Receiver<Bytes>,
    unchunker: Arc<Unchunker<S>>,
) -> usize {
    let mut discarded = 0;

    while let Some(raw) = rx.recv().await {
        if let Err(e) = unchunker.add_chunk(&raw) {
            discarded += 1;
            tracing::warn!(error = %e, len = raw.len(), "invalid chunk, discarding");
        }
    }

    tracing::info!(
        discarded,
        pending = unchunker.len(),
        "chunk channel closed, receive loop exiting"
    );
    discarded
}
