//! chunkdc-services: async plumbing around the chunking core.
//!
//! The core is synchronous and transport-agnostic. This crate wires it to
//! tokio channels: an inbound channel of raw chunks feeding an `Unchunker`,
//! an outbound channel fed by a `Chunker`, and a periodic stale sweep.

pub mod receive;
pub mod send;
pub mod sink;
pub mod sweep;

pub use receive::receive_loop;
pub use send::{send_message, MessageIds};
pub use sink::ChannelSink;
pub use sweep::sweep_loop;
