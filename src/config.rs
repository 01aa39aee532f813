//! Deserializable descriptions of followers, e.g. loaded from a TOML file.
//!
//! ```toml
//! buffer_size = 500
//!
//! [[sources]]
//! path = "/var/log/app.log"
//! alias = "app"
//! backfill = 20
//! patterns = [["error", "db"], ["warn"]]
//! coloring = "molokai"
//!
//! [[sources]]
//! path = "/var/log/syslog"
//! poll_interval_ms = 250
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::Result;
use crate::follower::{
    Follower, FollowerBuilder, DEFAULT_BACKFILL, DEFAULT_BUFFER_SIZE, DEFAULT_MAX_LINE_LENGTH,
    DEFAULT_POLL_INTERVAL,
};
use crate::mux::MultiTail;
use crate::plugin::Coloring;

/// One followed file.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FollowConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    #[serde(default = "default_backfill")]
    pub backfill: usize,
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,
    /// Groups of expressions, AND within a group, OR across groups.
    #[serde(default)]
    pub patterns: Vec<Vec<String>>,
    /// Name of a color theme, enables the coloring plugin.
    #[serde(default)]
    pub coloring: Option<String>,
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}

fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

fn default_backfill() -> usize {
    DEFAULT_BACKFILL
}

fn default_max_line_length() -> usize {
    DEFAULT_MAX_LINE_LENGTH
}

impl FollowConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FollowConfig {
            path: path.into(),
            alias: None,
            poll_interval_ms: default_poll_interval_ms(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            backfill: DEFAULT_BACKFILL,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            patterns: Vec::new(),
            coloring: None,
        }
    }

    /// A builder carrying these settings, for further customization (more
    /// plugins, a diagnostics hook) before building.
    pub fn builder(&self) -> Result<FollowerBuilder> {
        let mut builder = Follower::builder(&self.path)
            .poll_interval(Duration::from_millis(self.poll_interval_ms))
            .buffer_size(self.buffer_size)
            .backfill(self.backfill)
            .max_line_length(self.max_line_length);

        if let Some(alias) = &self.alias {
            builder = builder.alias(alias);
        }
        for group in &self.patterns {
            builder = builder.pattern_group(group);
        }
        if let Some(theme) = &self.coloring {
            builder = builder.plugin(Coloring::named(theme)?);
        }

        Ok(builder)
    }

    pub fn build(&self) -> Result<Follower> {
        self.builder()?.build()
    }
}

/// Several files merged into one stream.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TailConfig {
    /// Capacity of the merged queue.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    pub sources: Vec<FollowConfig>,
}

impl TailConfig {
    pub fn build(&self) -> Result<MultiTail> {
        let followers = self
            .sources
            .iter()
            .map(FollowConfig::build)
            .collect::<Result<Vec<_>>>()?;

        MultiTail::with_buffer_size(followers, self.buffer_size)
    }
}
