use std::time::Duration;

use chunkdc_services::sweep_loop;
use tokio::sync::broadcast;

use crate::*;

#[tokio::test]
async fn lost_chunk_is_swept_while_other_messages_complete() -> Result<()> {
    let receiver = spawn_receiver();
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let sweeper = tokio::spawn(sweep_loop(
        receiver.unchunker.clone(),
        Duration::from_millis(50),
        Duration::from_millis(20),
        shutdown_rx,
    ));

    // Message 1 loses its first chunk.
    let lossy = capture_chunks(1, &payload(100), 30).await?;
    deliver(&receiver, &lossy[1..]).await?;

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(receiver.unchunker.is_empty(), "stale collector should be swept");

    // Message 2 arrives whole and is delivered normally.
    let whole = capture_chunks(2, &payload(100), 30).await?;
    deliver(&receiver, &whole).await?;

    let outcome = receiver.finish().await?;
    assert_eq!(outcome.messages.len(), 1);
    assert_eq!(&outcome.messages[0][..], &payload(100)[..]);

    shutdown_tx.send(())?;
    assert_eq!(sweeper.await?, 1);
    Ok(())
}

#[tokio::test]
async fn default_gc_settings_keep_fresh_collectors() -> Result<()> {
    let gc = chunkdc_core::config::ChunkdcConfig::default().gc;
    let receiver = spawn_receiver();
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let sweeper = tokio::spawn(sweep_loop(
        receiver.unchunker.clone(),
        gc.max_age(),
        Duration::from_millis(10),
        shutdown_rx,
    ));

    let chunks = capture_chunks(3, &payload(100), 30).await?;
    deliver(&receiver, &chunks[..2]).await?;
    tokio::time::sleep(Duration::from_millis(60)).await;

    shutdown_tx.send(())?;
    assert_eq!(sweeper.await?, 0);

    let outcome = receiver.finish().await?;
    assert!(outcome.messages.is_empty());
    assert_eq!(outcome.pending, 1);
    Ok(())
}
