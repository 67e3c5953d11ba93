//! chunkdc: split files into data channel chunks and join them back.

use std::path::Path;

use anyhow::{Context, Result};

use chunkdc_core::config::ChunkdcConfig;

mod join;
mod split;

fn print_usage() {
    println!("Usage: chunkdc [--chunk-size <bytes>] [--id <message-id>] <command>");
    println!();
    println!("Commands:");
    println!("  split <input> <out-dir>    Write one file per chunk of <input>");
    println!("  join <chunk-dir> <output>  Reassemble the chunk files in <chunk-dir>");
    println!();
    println!("Defaults for --chunk-size and --id come from the config file");
    println!("({}).", ChunkdcConfig::file_path().display());
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = ChunkdcConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        ChunkdcConfig::default()
    });

    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut chunk_size = config.chunking.chunk_size;
    let mut id = config.chunking.first_message_id;
    let mut remaining: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--chunk-size" => {
                i += 1;
                chunk_size = args
                    .get(i)
                    .context("--chunk-size requires a value")?
                    .parse()
                    .context("--chunk-size must be a number")?;
            }
            "--id" => {
                i += 1;
                id = args
                    .get(i)
                    .context("--id requires a value")?
                    .parse()
                    .context("--id must be a number")?;
            }
            other => remaining.push(other),
        }
        i += 1;
    }

    match remaining.as_slice() {
        ["split", input, out_dir] => {
            let summary = split::split_file(Path::new(input), Path::new(out_dir), id, chunk_size)?;
            println!(
                "split {} bytes into {} chunks (id {}, chunk size {})",
                summary.bytes, summary.chunks, id, chunk_size
            );
            println!("blake3 {}", hex::encode(summary.digest));
            Ok(())
        }
        ["join", chunk_dir, output] => {
            let summary = join::join_dir(Path::new(chunk_dir), Path::new(output)).await?;
            println!(
                "joined {} chunks into {} bytes",
                summary.chunks, summary.bytes
            );
            println!("blake3 {}", hex::encode(summary.digest));
            Ok(())
        }
        ["help"] | ["--help"] | ["-h"] | [] => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other.join(" "));
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}
