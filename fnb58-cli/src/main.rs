use std::fs;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use fnb58_lib::{Session, SessionEvent};
use tracing::warn;

/// Replay a recorded FNB58 notification stream and print the decoded records.
///
/// Input is a hex dump of the raw notification bytes (whitespace is
/// ignored), for example as captured with a BLE sniffer.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Hex dump file; reads stdin when omitted
    input: Option<PathBuf>,

    /// Feed the stream in chunks of this many bytes, mimicking notification
    /// fragmentation
    #[arg(long, default_value_t = 20)]
    chunk_size: usize,

    /// Print MQTT topic/value pairs instead of record summaries
    #[arg(long)]
    topics: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let text = match &args.input {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
        }
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let stream = hex::decode(&cleaned).context("input is not valid hex")?;

    let mut session = Session::new();
    for chunk in stream.chunks(args.chunk_size.max(1)) {
        for event in session.handle_chunk(chunk) {
            // Corrupt bytes and schema mismatches are already logged by the
            // session; only records need printing here.
            let SessionEvent::Record(record) = event else {
                continue;
            };
            if args.topics {
                match session.device() {
                    Some(info) => {
                        for (suffix, value) in record.published_values() {
                            println!("FNIRSI/{}/{suffix} {value}", info.identity());
                        }
                    }
                    None => warn!("no device info seen yet, dropping values"),
                }
            } else {
                println!("{record}");
            }
        }
    }

    if session.pending() > 0 {
        warn!(bytes = session.pending(), "input ended inside a frame");
    }
    Ok(())
}
