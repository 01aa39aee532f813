//! A single followed file with an independent start/stop lifecycle.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{Error, Result};
use crate::filter::{Filter, PatternGroup};
use crate::lines::Lines;
use crate::plugin::{Plugin, PluginChain};
use crate::reader::{ErrorHook, Pipeline, Tail, Task};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_BUFFER_SIZE: usize = 100;
pub const DEFAULT_BACKFILL: usize = 10;
pub const DEFAULT_MAX_LINE_LENGTH: usize = 1024 * 1024;

/// Options for a [`Follower`], see [`Follower::builder`].
#[must_use]
pub struct FollowerBuilder {
    path: PathBuf,
    alias: Option<String>,
    poll_interval: Duration,
    buffer_size: usize,
    backfill: usize,
    max_line_length: usize,
    groups: Vec<Vec<String>>,
    plugins: PluginChain,
    on_error: Option<ErrorHook>,
}

impl FollowerBuilder {
    fn new(path: PathBuf) -> Self {
        FollowerBuilder {
            path,
            alias: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            buffer_size: DEFAULT_BUFFER_SIZE,
            backfill: DEFAULT_BACKFILL,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            groups: Vec::new(),
            plugins: PluginChain::new(),
            on_error: None,
        }
    }

    /// How often the file is checked for growth, rotation and truncation.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Capacity of the delivery queue. A full queue blocks the follower.
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Number of trailing lines delivered on start.
    pub fn backfill(mut self, lines: usize) -> Self {
        self.backfill = lines;
        self
    }

    /// Longest fragment held while waiting for a line terminator.
    pub fn max_line_length(mut self, bytes: usize) -> Self {
        self.max_line_length = bytes;
        self
    }

    /// Adds a group of expressions that must all match. Groups are OR-ed.
    pub fn pattern_group<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups
            .push(patterns.into_iter().map(Into::into).collect());
        self
    }

    /// Label used when merged with other sources. Defaults to the file name.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Appends a plugin to the chain.
    pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Called with [`Error::Transient`] whenever a poll pass fails and will be
    /// retried.
    pub fn on_transient_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(hook));
        self
    }

    /// Validates the options and compiles the patterns.
    pub fn build(self) -> Result<Follower> {
        if self.poll_interval.is_zero() {
            return Err(Error::Config("poll interval must be non-zero".into()));
        }
        if self.buffer_size == 0 {
            return Err(Error::Config("buffer size must be non-zero".into()));
        }
        if self.max_line_length == 0 {
            return Err(Error::Config("max line length must be non-zero".into()));
        }

        let mut filter = Filter::all();
        for group in &self.groups {
            filter.push(PatternGroup::new(group)?);
        }

        let alias = self.alias.unwrap_or_else(|| default_alias(&self.path));
        let (tx, rx) = mpsc::channel(self.buffer_size);

        Ok(Follower {
            settings: Settings {
                path: self.path,
                alias,
                poll_interval: self.poll_interval,
                backfill: self.backfill,
                max_line_length: self.max_line_length,
                pipeline: Arc::new(Pipeline {
                    filter,
                    plugins: self.plugins,
                }),
                on_error: self.on_error,
            },
            tx: Some(tx),
            rx: Some(rx),
            state: State::Idle,
        })
    }
}

impl fmt::Debug for FollowerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FollowerBuilder")
            .field("path", &self.path)
            .field("alias", &self.alias)
            .field("poll_interval", &self.poll_interval)
            .field("buffer_size", &self.buffer_size)
            .field("backfill", &self.backfill)
            .field("groups", &self.groups)
            .field("plugins", &self.plugins)
            .finish_non_exhaustive()
    }
}

fn default_alias(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}

struct Settings {
    path: PathBuf,
    alias: String,
    poll_interval: Duration,
    backfill: usize,
    max_line_length: usize,
    pipeline: Arc<Pipeline>,
    on_error: Option<ErrorHook>,
}

enum State {
    Idle,
    Running {
        cancel: CancellationToken,
        handle: JoinHandle<()>,
    },
    Stopped,
}

/// Follows one file, `tail -F` style, delivering its new lines in file order.
///
/// ```no_run
/// use linetail::Follower;
///
/// # async fn run() -> linetail::Result<()> {
/// let mut follower = Follower::builder("/var/log/syslog")
///     .backfill(2)
///     .pattern_group(["error", "db"])
///     .pattern_group(["warn"])
///     .build()?;
///
/// let mut lines = follower.lines();
/// follower.start().await?;
///
/// while let Some(line) = lines.next_line().await {
///     println!("{}", line);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Follower {
    settings: Settings,
    tx: Option<mpsc::Sender<String>>,
    rx: Option<mpsc::Receiver<String>>,
    state: State,
}

impl Follower {
    /// A follower with every option at its default.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Follower::builder(path).build()
    }

    pub fn builder(path: impl Into<PathBuf>) -> FollowerBuilder {
        FollowerBuilder::new(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.settings.path
    }

    pub fn alias(&self) -> &str {
        &self.settings.alias
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, State::Running { .. })
    }

    /// Whether the live line sequence is still here and the follower has never
    /// been started.
    pub(crate) fn is_fresh(&self) -> bool {
        self.rx.is_some() && matches!(self.state, State::Idle)
    }

    /// The delivered line sequence.
    ///
    /// The first call hands out the live sequence; any later call returns one
    /// that has already ended.
    pub fn lines(&mut self) -> Lines {
        match self.rx.take() {
            Some(rx) => Lines::new(rx),
            None => Lines::ended(),
        }
    }

    /// Opens the file, then follows it in a background task.
    ///
    /// Fails with [`Error::Start`] if the file cannot be opened, in which case
    /// the line sequence ends right away and the follower is spent. Starting a
    /// running follower does nothing.
    pub async fn start(&mut self) -> Result<()> {
        match self.state {
            State::Idle => {}
            State::Running { .. } => return Ok(()),
            State::Stopped => return Err(Error::NotRestartable),
        }

        let path = &self.settings.path;
        let tail = match Tail::open(path, self.settings.max_line_length).await {
            Ok(tail) => tail,
            Err(source) => {
                self.tx = None;
                self.state = State::Stopped;
                return Err(Error::Start {
                    path: path.clone(),
                    source,
                });
            }
        };

        let tx = match self.tx.take() {
            Some(tx) => tx,
            None => return Err(Error::NotRestartable),
        };

        let cancel = CancellationToken::new();
        let task = Task {
            tail,
            pipeline: self.settings.pipeline.clone(),
            tx,
            cancel: cancel.clone(),
            poll_interval: self.settings.poll_interval,
            backfill: self.settings.backfill,
            on_error: self.settings.on_error.clone(),
        };

        debug!(path = %path.display(), alias = %self.settings.alias, "starting follower");
        let handle = tokio::spawn(task.run());
        self.state = State::Running { cancel, handle };

        Ok(())
    }

    /// Stops the background task and waits for it to release the file.
    ///
    /// Idempotent. Once this returns no more lines are queued; lines already
    /// queued can still be taken from the sequence, after which it ends.
    pub async fn stop(&mut self) -> Result<()> {
        self.tx = None;

        match std::mem::replace(&mut self.state, State::Stopped) {
            State::Idle | State::Stopped => Ok(()),
            State::Running { cancel, handle } => {
                cancel.cancel();
                debug!(path = %self.settings.path.display(), "stopping follower");

                handle.await.map_err(|e| Error::Stop {
                    path: self.settings.path.clone(),
                    reason: e.to_string(),
                })
            }
        }
    }
}

impl fmt::Debug for Follower {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Follower")
            .field("path", &self.settings.path)
            .field("alias", &self.settings.alias)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl Drop for Follower {
    fn drop(&mut self) {
        if let State::Running { cancel, .. } = &self.state {
            cancel.cancel();
        }
    }
}
