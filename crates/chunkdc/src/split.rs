//! `chunkdc split`: one output file per chunk.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use bytes::Bytes;
use memmap2::Mmap;

use chunkdc_core::Chunker;

pub struct SplitSummary {
    pub bytes: usize,
    pub chunks: usize,
    pub digest: [u8; 32],
}

/// File name for the chunk with the given serial.
pub fn chunk_file_name(serial: usize) -> String {
    format!("chunk-{serial:08}.bin")
}

/// Split `input` into chunk files under `out_dir`.
pub fn split_file(input: &Path, out_dir: &Path, id: u32, chunk_size: u32) -> Result<SplitSummary> {
    let file = fs::File::open(input)
        .with_context(|| format!("failed to open input: {}", input.display()))?;
    let len = file
        .metadata()
        .with_context(|| format!("failed to stat input: {}", input.display()))?
        .len();
    if len == 0 {
        bail!("input is empty: {}", input.display());
    }

    // Safety: file is opened read-only and we don't mutate the mmap
    let mmap = unsafe {
        Mmap::map(&file).with_context(|| format!("failed to mmap input: {}", input.display()))?
    };
    // Chunk payloads are slices of the mapping itself.
    let data = Bytes::from_owner(mmap);
    let digest = *blake3::hash(&data).as_bytes();

    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output dir: {}", out_dir.display()))?;

    let chunker = Chunker::new(id, data.clone(), chunk_size)?;
    let mut chunks = 0;
    for (serial, chunk) in chunker.enumerate() {
        let path: PathBuf = out_dir.join(chunk_file_name(serial));
        fs::write(&path, &chunk)
            .with_context(|| format!("failed to write chunk: {}", path.display()))?;
        tracing::trace!(serial, path = %path.display(), len = chunk.len(), "chunk written");
        chunks += 1;
    }

    tracing::info!(
        input = %input.display(),
        out_dir = %out_dir.display(),
        id,
        bytes = data.len(),
        chunks,
        "file split"
    );

    Ok(SplitSummary {
        bytes: data.len(),
        chunks,
        digest,
    })
}
