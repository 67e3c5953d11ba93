use crate::*;

#[tokio::test]
async fn reordered_three_chunk_message() -> Result<()> {
    let chunks = capture_chunks(42, &[1, 2, 3, 4, 5, 6, 7, 8], 12).await?;
    assert_eq!(
        chunks,
        vec![
            Bytes::from_static(&[0, 0, 0, 0, 42, 0, 0, 0, 0, 1, 2, 3]),
            Bytes::from_static(&[0, 0, 0, 0, 42, 0, 0, 0, 1, 4, 5, 6]),
            Bytes::from_static(&[1, 0, 0, 0, 42, 0, 0, 0, 2, 7, 8]),
        ]
    );

    let receiver = spawn_receiver();
    deliver(
        &receiver,
        &[chunks[0].clone(), chunks[2].clone(), chunks[1].clone()],
    )
    .await?;

    let outcome = receiver.finish().await?;
    assert_eq!(outcome.messages, vec![Bytes::from_static(&[1, 2, 3, 4, 5, 6, 7, 8])]);
    assert_eq!(outcome.pending, 0);
    Ok(())
}

#[tokio::test]
async fn any_delivery_order_reproduces_message() -> Result<()> {
    let data = payload(5000);
    for (seed, chunk_size) in [(1u64, 10u32), (2, 100), (3, 1009), (4, 1024), (5, 6000)] {
        let chunks = shuffled(capture_chunks(7, &data, chunk_size).await?, seed);

        let receiver = spawn_receiver();
        deliver(&receiver, &chunks).await?;
        let outcome = receiver.finish().await?;

        assert_eq!(outcome.messages.len(), 1, "chunk_size {chunk_size}");
        assert_eq!(&outcome.messages[0][..], &data[..], "chunk_size {chunk_size}");
        assert_eq!(outcome.pending, 0);
    }
    Ok(())
}

#[tokio::test]
async fn interleaved_messages_all_complete() -> Result<()> {
    let mut expected = Vec::new();
    let mut all_chunks = Vec::new();
    for id in 0..8u32 {
        let data = payload(300 + id as usize * 97);
        all_chunks.extend(capture_chunks(id, &data, 64).await?);
        expected.push(data);
    }

    let receiver = spawn_receiver();
    deliver(&receiver, &shuffled(all_chunks, 99)).await?;
    let outcome = receiver.finish().await?;

    let mut received: Vec<Vec<u8>> = outcome.messages.iter().map(|m| m.to_vec()).collect();
    received.sort_by_key(|m| m.len());
    assert_eq!(received, expected);
    assert_eq!(outcome.pending, 0);
    Ok(())
}

#[tokio::test]
async fn late_duplicate_end_chunk_is_not_redelivered() -> Result<()> {
    let chunks = capture_chunks(5, &payload(50), 20).await?;
    let end = chunks.last().cloned().context("no chunks")?;

    let receiver = spawn_receiver();
    deliver(&receiver, &chunks).await?;
    deliver(&receiver, &[end]).await?;
    let outcome = receiver.finish().await?;

    assert_eq!(outcome.messages.len(), 1);
    // The duplicate waits in a fresh collector until swept.
    assert_eq!(outcome.pending, 1);
    Ok(())
}

#[tokio::test]
async fn malformed_chunks_are_discarded() -> Result<()> {
    let chunks = capture_chunks(9, &payload(40), 25).await?;

    let receiver = spawn_receiver();
    deliver(&receiver, &[Bytes::from_static(&[1, 2, 3])]).await?;
    deliver(&receiver, &chunks).await?;
    deliver(&receiver, &[Bytes::new()]).await?;
    let outcome = receiver.finish().await?;

    assert_eq!(outcome.discarded, 2);
    assert_eq!(outcome.messages.len(), 1);
    assert_eq!(&outcome.messages[0][..], &payload(40)[..]);
    Ok(())
}
