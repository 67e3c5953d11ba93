//! Channel-backed completion sink.

use bytes::Bytes;
use tokio::sync::mpsc;

use chunkdc_core::MessageSink;

/// Pushes every reassembled message onto an unbounded channel.
///
/// Unbounded because the sink is called from synchronous code while the
/// unchunker is ingesting; it must never wait for the consumer.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Bytes>,
}

impl ChannelSink {
    /// Create a sink and the receiver its messages arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Bytes>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl MessageSink for ChannelSink {
    fn message_complete(&self, message: Bytes) {
        let len = message.len();
        if self.tx.send(message).is_err() {
            tracing::warn!(bytes = len, "message receiver dropped, discarding message");
        }
    }
}
