//! chunkdc integration test harness.
//!
//! Every test runs a sender and a receiver in-process, connected by a
//! tokio channel standing in for the data channel. The harness can
//! reorder and duplicate chunks between the two ends before they reach
//! the receive loop.

use std::sync::Arc;

use anyhow::{Context, Result};
use bytes::Bytes;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use chunkdc_core::Unchunker;
use chunkdc_services::{receive_loop, send_message, ChannelSink};

mod delivery;
mod sweep;

// ── Harness ───────────────────────────────────────────────────────────────────

/// The receiving end: a running receive loop and the messages it assembled.
pub struct Receiver {
    pub tx: mpsc::Sender<Bytes>,
    pub messages: mpsc::UnboundedReceiver<Bytes>,
    pub unchunker: Arc<Unchunker<ChannelSink>>,
    pub task: JoinHandle<usize>,
}

/// Start a receive loop fed by a bounded channel.
pub fn spawn_receiver() -> Receiver {
    let (sink, messages) = ChannelSink::new();
    let unchunker = Arc::new(Unchunker::new(sink));
    let (tx, rx) = mpsc::channel(256);
    let task = tokio::spawn(receive_loop(rx, unchunker.clone()));
    Receiver {
        tx,
        messages,
        unchunker,
        task,
    }
}

/// Split a message through the send path and capture the chunks it queues.
pub async fn capture_chunks(id: u32, data: &[u8], chunk_size: u32) -> Result<Vec<Bytes>> {
    let (tx, mut rx) = mpsc::channel(1024);
    let producer = {
        let data = Bytes::copy_from_slice(data);
        tokio::spawn(async move { send_message(&tx, id, data, chunk_size).await })
    };

    let mut chunks = Vec::new();
    while let Some(chunk) = rx.recv().await {
        chunks.push(chunk);
    }
    let sent = producer.await.context("send task panicked")??;
    assert_eq!(sent, chunks.len());
    Ok(chunks)
}

/// Deterministically shuffle chunks with the given seed.
pub fn shuffled(mut chunks: Vec<Bytes>, seed: u64) -> Vec<Bytes> {
    chunks.shuffle(&mut StdRng::seed_from_u64(seed));
    chunks
}

/// Test payload with no repeating structure at chunk boundaries.
pub fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| ((i * 31 + i / 7) % 256) as u8).collect()
}

/// Feed chunks into the receiver in the given order.
pub async fn deliver(receiver: &Receiver, chunks: &[Bytes]) -> Result<()> {
    for chunk in chunks {
        receiver
            .tx
            .send(chunk.clone())
            .await
            .context("receive loop exited early")?;
    }
    Ok(())
}

/// What the receiver ended up with once the transport closed.
pub struct Outcome {
    pub messages: Vec<Bytes>,
    pub discarded: usize,
    pub pending: usize,
}

impl Receiver {
    /// Close the transport, wait for the receive loop and drain the sink.
    pub async fn finish(self) -> Result<Outcome> {
        let Receiver {
            tx,
            mut messages,
            unchunker,
            task,
        } = self;
        drop(tx);
        let discarded = task.await.context("receive loop panicked")?;

        let mut assembled = Vec::new();
        while let Ok(message) = messages.try_recv() {
            assembled.push(message);
        }
        Ok(Outcome {
            messages: assembled,
            discarded,
            pending: unchunker.len(),
        })
    }
}
