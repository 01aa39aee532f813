//! A library providing asynchronous, poll-driven tailing for (namely log) files.
//!
//! Files are followed the way `tail -F` does: new lines are delivered as they
//! are appended, log rotation (rename and recreate) is detected through the
//! file identity, and in-place truncation restarts reading from the top. No
//! platform change-notification API is used, every follower polls.
//!
//! ## Example
//!
//! ```no_run
//! use linetail::{Coloring, Follower, MultiTail};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> linetail::Result<()> {
//!     let app = Follower::builder("/var/log/app.log")
//!         .alias("app")
//!         .poll_interval(Duration::from_millis(500))
//!         .pattern_group(["ERROR"])
//!         .pattern_group(["WARN"])
//!         .plugin(Coloring::named("molokai")?)
//!         .build()?;
//!     let syslog = Follower::builder("/var/log/syslog").alias("system-log").build()?;
//!
//!     let mut tail = MultiTail::new([app, syslog])?;
//!     let mut lines = tail.lines();
//!     tail.start().await?;
//!
//!     while let Some(line) = lines.next_line().await {
//!         println!("{}", line);
//!     }
//!
//!     tail.stop().await
//! }
//! ```
//!
//! ## Caveats
//!
//! Lines are only guaranteed to be delivered exactly once while the process
//! runs; read positions are not persisted across restarts. Between two polls a
//! file should only be appended to, rotated, or truncated, not rewritten in
//! place at the same size.

mod config;
mod error;
mod filter;
mod follower;
mod identity;
mod lines;
mod mux;
mod plugin;
mod reader;
mod shutdown;
mod truncation;

pub use config::{FollowConfig, TailConfig};
pub use error::{Error, Result};
pub use filter::{matching, Filter, Matching, PatternGroup};
pub use follower::{
    Follower, FollowerBuilder, DEFAULT_BACKFILL, DEFAULT_BUFFER_SIZE, DEFAULT_MAX_LINE_LENGTH,
    DEFAULT_POLL_INTERVAL,
};
pub use identity::FileId;
pub use lines::Lines;
pub use mux::MultiTail;
pub use plugin::{Coloring, Plugin, PluginChain, Theme};
pub use shutdown::Shutdown;
pub use tokio_util::sync::CancellationToken;

#[cfg(doctest)]
doc_comment::doctest!("../README.md");
