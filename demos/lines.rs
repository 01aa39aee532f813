//! Follows a set of files and prints their lines, prefixed by source.
//!
//! Usage:
//!     lines /path/to/file1 /path/to/file2 ...
//!     lines --config tail.toml
//!
//! Stop with Ctrl-C. Set `RUST_LOG=linetail=debug` to see rotations and
//! truncations as they are detected.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use linetail::{matching, Filter, FollowConfig, Shutdown, TailConfig};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(about = "Follow files like `tail -F`")]
struct Args {
    /// Files to follow.
    paths: Vec<PathBuf>,

    /// TOML file describing the sources, used instead of PATHS.
    #[arg(long, conflicts_with = "paths")]
    config: Option<PathBuf>,

    /// Lines of existing content to print first.
    #[arg(short = 'n', long, default_value_t = linetail::DEFAULT_BACKFILL)]
    backfill: usize,

    /// Poll interval in milliseconds.
    #[arg(long, default_value_t = 500)]
    interval_ms: u64,

    /// Only print matching lines, e.g. `error&&db||warn`.
    #[arg(long)]
    filter: Option<String>,

    /// Color log levels with the given theme (default, molokai).
    #[arg(long)]
    color: Option<String>,
}

impl Args {
    fn tail_config(&self) -> Result<TailConfig, Box<dyn std::error::Error>> {
        if let Some(path) = &self.config {
            let text = std::fs::read_to_string(path)?;
            return Ok(toml::from_str(&text)?);
        }

        let sources = self
            .paths
            .iter()
            .map(|path| {
                let mut source = FollowConfig::new(path);
                source.backfill = self.backfill;
                source.poll_interval_ms = self.interval_ms;
                source.coloring = self.color.clone();
                source
            })
            .collect();

        Ok(TailConfig {
            buffer_size: linetail::DEFAULT_BUFFER_SIZE,
            sources,
        })
    }
}

#[tokio::main]
pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.tail_config()?;
    if config.sources.is_empty() {
        return Err("nothing to follow, pass some paths or --config".into());
    }

    let query = match &args.filter {
        Some(q) => Filter::parse_query(q)?,
        None => Filter::all(),
    };

    let shutdown = Shutdown::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.trigger();
            }
        });
    }

    let mut tail = config.build()?;
    let mut lines = matching(tail.lines().until_shutdown(&shutdown), query);
    tail.start().await?;

    while let Some(line) = futures_util::StreamExt::next(&mut lines).await {
        println!("{}", line);
    }

    tokio::time::timeout(Duration::from_secs(5), tail.stop()).await??;
    Ok(())
}
