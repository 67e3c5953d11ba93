//! `chunkdc join`: reassemble a directory of chunk files.
//!
//! Chunk files are fed through the same receive path a transport would
//! use, in directory order, which need not match serial order.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use bytes::Bytes;
use tokio::sync::mpsc;

use chunkdc_core::Unchunker;
use chunkdc_services::{receive_loop, ChannelSink};

pub struct JoinSummary {
    /// Chunk files that decoded as chunks. Files the receive loop rejected are not counted.
    pub chunks: usize,
    pub bytes: usize,
    pub digest: [u8; 32],
}

/// Reassemble the message whose chunks are stored in `chunk_dir` and write it to `output`.
pub async fn join_dir(chunk_dir: &Path, output: &Path) -> Result<JoinSummary> {
    let (sink, mut messages) = ChannelSink::new();
    let unchunker = Arc::new(Unchunker::new(sink));
    let (tx, rx) = mpsc::channel::<Bytes>(64);
    let receiver = tokio::spawn(receive_loop(rx, unchunker.clone()));

    let entries = fs::read_dir(chunk_dir)
        .with_context(|| format!("failed to read chunk dir: {}", chunk_dir.display()))?;

    let mut files = 0;
    for entry in entries {
        let path = entry
            .with_context(|| format!("failed to list chunk dir: {}", chunk_dir.display()))?
            .path();
        if !path.is_file() {
            continue;
        }
        let raw = fs::read(&path)
            .with_context(|| format!("failed to read chunk: {}", path.display()))?;
        tx.send(Bytes::from(raw))
            .await
            .context("receive loop exited early")?;
        files += 1;
    }
    drop(tx);

    let discarded = receiver.await.context("receive loop panicked")?;
    if discarded > 0 {
        tracing::warn!(discarded, "some chunk files were not valid chunks");
    }
    let chunks = files - discarded;

    let message = match messages.try_recv() {
        Ok(message) => message,
        Err(_) => bail!(
            "chunks in {} do not form a complete message ({} incomplete)",
            chunk_dir.display(),
            unchunker.len()
        ),
    };
    if let Ok(extra) = messages.try_recv() {
        tracing::warn!(bytes = extra.len(), "chunk dir holds more than one message, ignoring the rest");
    }

    fs::write(output, &message)
        .with_context(|| format!("failed to write output: {}", output.display()))?;

    tracing::info!(
        chunk_dir = %chunk_dir.display(),
        output = %output.display(),
        chunks,
        bytes = message.len(),
        "message joined"
    );

    Ok(JoinSummary {
        chunks,
        bytes: message.len(),
        digest: *blake3::hash(&message).as_bytes(),
    })
}
