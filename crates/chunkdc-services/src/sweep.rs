//! Stale sweep: periodically discards collectors for messages that
//! stopped receiving chunks.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use chunkdc_core::{MessageSink, Unchunker};

/// Run `Unchunker::gc` every `interval` until `shutdown` fires.
///
/// Returns the total number of collectors evicted.
pub async fn sweep_loop<S: MessageSink>(
    unchunker: Arc<Unchunker<S>>,
    max_age: Duration,
    interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> usize {
    let mut ticker = tokio::time::interval(interval);
    let mut evicted_total = 0;

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                tracing::info!(evicted_total, "sweep loop shutting down");
                return evicted_total;
            }
            _ = ticker.tick() => {
                let evicted = unchunker.gc(max_age);
                if evicted > 0 {
                    evicted_total += evicted;
                    tracing::info!(
                        evicted,
                        pending = unchunker.len(),
                        "evicted stale message collectors"
                    );
                }
            }
        }
    }
}
