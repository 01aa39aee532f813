//! Error kinds surfaced by followers, filters and configuration.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while configuring, starting or stopping a tail.
///
/// Only [`Error::Transient`] is ever produced while a follower is running,
/// and it is handed to the diagnostics hook rather than to the consumer.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid option: {0}")]
    Config(String),

    #[error("failed to open {}: {source}", .path.display())]
    Start {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("follower was stopped and cannot be started again")]
    NotRestartable,

    #[error("transient error on {}: {source}", .path.display())]
    Transient {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to release {}: {reason}", .path.display())]
    Stop { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
