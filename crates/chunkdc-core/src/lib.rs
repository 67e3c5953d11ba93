//! chunkdc-core: message chunking for size-limited data channels.
//!
//! - `wire`: the 9-byte chunk header and `Chunk` codec
//! - `chunker`: splits a message into framed chunks
//! - `collector`: accumulates the chunks of one message and merges them
//! - `unchunker`: routes chunks of many messages to their collectors
//! - `config`: file and environment configuration

pub mod chunker;
pub mod collector;
pub mod config;
pub mod unchunker;
pub mod wire;

pub use chunker::{Chunker, ChunkerError};
pub use collector::ChunkCollector;
pub use unchunker::{MessageSink, Unchunker, UnchunkerError};
pub use wire::{Chunk, ChunkHeader, HEADER_LENGTH};
