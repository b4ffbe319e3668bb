mod entry;

use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::Parser;
use entry::RawEntry;
use tokio::fs;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{error, info, warn};

/// Captures raw beacon receiver lines into a timestamped JSON log.
#[derive(Debug, Parser)]
#[command(name = "recorder")]
struct Args {
    /// Line source to read; defaults to stdin (pipe the receiver in,
    /// e.g. `cat /dev/ttyUSB0 | recorder`).
    #[arg(long, env = "RECORDER_INPUT")]
    input: Option<PathBuf>,

    /// JSON log the capture entries are written to.
    #[arg(long, env = "RECORDER_OUTPUT", default_value = "beacon_log.json")]
    output: PathBuf,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt::init();

    info!("Starting AidLink Recorder");
    match &args.input {
        Some(path) => info!("Reading lines from {}", path.display()),
        None => info!("Reading lines from stdin"),
    }
    info!("Writing capture log to {}", args.output.display());

    // Resume an existing log rather than clobbering it.
    let mut entries: Vec<RawEntry> = match fs::read_to_string(&args.output).await {
        Ok(raw) => match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Existing log is not valid JSON ({}), starting fresh", e);
                Vec::new()
            }
        },
        Err(_) => Vec::new(),
    };
    if !entries.is_empty() {
        info!("Resuming log with {} existing entries", entries.len());
    }

    let result = match &args.input {
        Some(path) => match fs::File::open(path).await {
            Ok(file) => capture(BufReader::new(file), &mut entries, &args.output).await,
            Err(e) => {
                error!("Failed to open {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => capture(BufReader::new(tokio::io::stdin()), &mut entries, &args.output).await,
    };

    if let Err(e) = result {
        error!("Capture loop failed: {}", e);
        std::process::exit(1);
    }

    info!("Input closed, {} entries recorded", entries.len());
}

async fn capture<R>(
    reader: BufReader<R>,
    entries: &mut Vec<RawEntry>,
    output: &Path,
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut lines = reader.lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    return Ok(());
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                info!("Received: {}", line);
                entries.push(RawEntry {
                    timestamp: Utc::now(),
                    value: line.to_string(),
                });

                // The log is rewritten in full after every line.
                if let Err(e) = write_log(entries, output).await {
                    warn!("Failed to write {}: {}", output.display(), e);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Stopped by user");
                return Ok(());
            }
        }
    }
}

async fn write_log(entries: &[RawEntry], output: &Path) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(entries)?;
    fs::write(output, json).await
}
