//! Fan-in of several followers into one alias-tagged line sequence.

use std::fmt;

use futures_util::future::join_all;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{Error, Result};
use crate::follower::{Follower, DEFAULT_BUFFER_SIZE};
use crate::lines::Lines;

struct Source {
    /// Alias padded to the common width, followed by a space.
    prefix: String,
    follower: Follower,
}

enum State {
    Idle,
    Running {
        cancel: CancellationToken,
        forwarders: Vec<JoinHandle<()>>,
    },
    Stopped,
}

/// Merges the lines of several [`Follower`]s, prefixing each with its source
/// alias padded to the width of the longest alias.
///
/// Lines of one source keep their order; lines of different sources
/// interleave in the order they are delivered.
///
/// ```no_run
/// use linetail::{Follower, MultiTail};
///
/// # async fn run() -> linetail::Result<()> {
/// let mut tail = MultiTail::new([
///     Follower::builder("/var/log/app.log").alias("app").build()?,
///     Follower::builder("/var/log/syslog").alias("system-log").build()?,
/// ])?;
///
/// let mut lines = tail.lines();
/// tail.start().await?;
///
/// // "app        ERROR boom"
/// // "system-log WARN disk"
/// while let Some(line) = lines.next_line().await {
///     println!("{}", line);
/// }
/// # Ok(())
/// # }
/// ```
pub struct MultiTail {
    sources: Vec<Source>,
    tx: Option<mpsc::Sender<String>>,
    rx: Option<mpsc::Receiver<String>>,
    state: State,
}

impl MultiTail {
    /// Merges `followers` through a queue of the default capacity.
    pub fn new(followers: impl IntoIterator<Item = Follower>) -> Result<Self> {
        MultiTail::with_buffer_size(followers, DEFAULT_BUFFER_SIZE)
    }

    /// Merges `followers` through a queue holding at most `buffer_size` lines.
    ///
    /// Each follower must be untouched: its [`Follower::lines`] not yet taken
    /// and never started. Anything else is an [`Error::Config`].
    pub fn with_buffer_size(
        followers: impl IntoIterator<Item = Follower>,
        buffer_size: usize,
    ) -> Result<Self> {
        if buffer_size == 0 {
            return Err(Error::Config("buffer size must be non-zero".into()));
        }

        let followers: Vec<Follower> = followers.into_iter().collect();
        if let Some(used) = followers.iter().find(|f| !f.is_fresh()) {
            return Err(Error::Config(format!(
                "follower {:?} was already started or had its lines taken",
                used.alias()
            )));
        }

        let width = followers
            .iter()
            .map(|f| f.alias().chars().count())
            .max()
            .unwrap_or(0);

        let sources = followers
            .into_iter()
            .map(|follower| Source {
                prefix: format!("{:<width$} ", follower.alias(), width = width),
                follower,
            })
            .collect();

        let (tx, rx) = mpsc::channel(buffer_size);

        Ok(MultiTail {
            sources,
            tx: Some(tx),
            rx: Some(rx),
            state: State::Idle,
        })
    }

    /// The source aliases, in source order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|s| s.follower.alias())
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, State::Running { .. })
    }

    /// The merged line sequence. Same contract as [`Follower::lines`].
    pub fn lines(&mut self) -> Lines {
        match self.rx.take() {
            Some(rx) => Lines::new(rx),
            None => Lines::ended(),
        }
    }

    /// Starts every source and one forwarding task per source.
    ///
    /// If any source fails to start, the ones already started are stopped
    /// again and the error is returned.
    pub async fn start(&mut self) -> Result<()> {
        match self.state {
            State::Idle => {}
            State::Running { .. } => return Ok(()),
            State::Stopped => return Err(Error::NotRestartable),
        }

        for i in 0..self.sources.len() {
            if let Err(e) = self.sources[i].follower.start().await {
                self.tx = None;
                self.state = State::Stopped;
                for source in &mut self.sources[..i] {
                    // The start error is the one worth reporting.
                    let _ = source.follower.stop().await;
                }
                return Err(e);
            }
        }

        let tx = match self.tx.take() {
            Some(tx) => tx,
            None => return Err(Error::NotRestartable),
        };

        let cancel = CancellationToken::new();
        let forwarders = self
            .sources
            .iter_mut()
            .map(|source| {
                tokio::spawn(forward(
                    source.prefix.clone(),
                    source.follower.lines(),
                    tx.clone(),
                    cancel.clone(),
                ))
            })
            .collect();

        debug!(sources = self.sources.len(), "started merged tail");
        self.state = State::Running { cancel, forwarders };

        Ok(())
    }

    /// Stops every source, then every forwarding task, and waits for all of
    /// them. Idempotent. Returns the first error any source reported.
    pub async fn stop(&mut self) -> Result<()> {
        self.tx = None;

        let (cancel, forwarders) = match std::mem::replace(&mut self.state, State::Stopped) {
            State::Idle | State::Stopped => return Ok(()),
            State::Running { cancel, forwarders } => (cancel, forwarders),
        };

        let stopped = join_all(self.sources.iter_mut().map(|s| s.follower.stop())).await;

        cancel.cancel();
        for res in join_all(forwarders).await {
            if let Err(e) = res {
                debug!(error = %e, "forwarder did not exit cleanly");
            }
        }

        debug!(sources = self.sources.len(), "stopped merged tail");
        stopped.into_iter().collect()
    }
}

async fn forward(
    prefix: String,
    mut lines: Lines,
    tx: mpsc::Sender<String>,
    cancel: CancellationToken,
) {
    loop {
        let line = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            line = lines.next_line() => match line {
                Some(line) => line,
                None => return,
            },
        };

        let mut tagged = String::with_capacity(prefix.len() + line.len());
        tagged.push_str(&prefix);
        tagged.push_str(&line);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            res = tx.send(tagged) => {
                if res.is_err() {
                    return;
                }
            }
        }
    }
}

impl fmt::Debug for MultiTail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiTail")
            .field("labels", &self.labels().collect::<Vec<_>>())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl Drop for MultiTail {
    fn drop(&mut self) {
        if let State::Running { cancel, .. } = &self.state {
            cancel.cancel();
        }
    }
}
