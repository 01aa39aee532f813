//! Everything related to turning file growth into delivered lines.
//!
//! A [`Tail`] owns the open handle of one followed file and knows how to do a
//! single poll pass over it. A [`Task`] drives a `Tail` on a timer, runs every
//! line through the filter and plugins, and feeds the delivery queue.

use std::fmt;
use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use memchr::{memchr_iter, memrchr_iter};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::error::Error;
use crate::filter::Filter;
use crate::identity::{self, FileId};
use crate::plugin::PluginChain;
use crate::truncation::{Checkpoint, Growth};

const CHUNK_SIZE: usize = 64 * 1024;

/// Bytes read per pass before yielding back to the loop.
const READ_BUDGET: u64 = 1024 * 1024;

/// Outcome of a single poll pass.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Step {
    /// Nothing new.
    Idle,
    /// The path is momentarily gone. The old handle is kept and drained.
    Missing,
    /// New bytes were read. `more` if the read budget ran out before EOF.
    Read { more: bool },
    /// The path names a new file, but the old one still has unread bytes.
    Draining,
    /// Switched over to the new file at the path.
    Rotated { more: bool },
    /// The file shrank below the read offset, reading restarted at 0.
    Truncated { more: bool },
}

impl Step {
    /// Whether another pass should run right away instead of on the next tick.
    pub(crate) fn has_more(self) -> bool {
        match self {
            Step::Draining => true,
            Step::Read { more } | Step::Rotated { more } | Step::Truncated { more } => more,
            Step::Idle | Step::Missing => false,
        }
    }
}

/// The followed file: its open handle, identity and read position.
pub(crate) struct Tail {
    path: PathBuf,
    file: File,
    id: FileId,
    checkpoint: Checkpoint,
    /// Bytes after the last line terminator, waiting for the rest of the line.
    partial: Vec<u8>,
    max_line: usize,
    read_budget: u64,
    buf: Vec<u8>,
}

impl Tail {
    /// Opens `path` with the read position at 0.
    pub(crate) async fn open(path: impl Into<PathBuf>, max_line: usize) -> io::Result<Self> {
        let path = path.into();
        let (file, id) = open_regular(&path).await?;

        Ok(Tail {
            path,
            file,
            id,
            checkpoint: Checkpoint::default(),
            partial: Vec::new(),
            max_line,
            read_budget: READ_BUDGET,
            buf: vec![0; CHUNK_SIZE],
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(test)]
    pub(crate) fn offset(&self) -> u64 {
        self.checkpoint.offset
    }

    /// Collects at most the last `count` complete lines into `out` and sets the
    /// read position right after the last complete line.
    ///
    /// The file is scanned backwards, never further than `count + 1` maximum
    /// line lengths. Shorter files yield fewer lines. A trailing fragment
    /// without terminator is left for the first poll.
    pub(crate) async fn backfill(&mut self, count: usize, out: &mut Vec<String>) -> io::Result<()> {
        let size = self.file.metadata().await?.len();
        let limit = (count as u64)
            .saturating_add(1)
            .saturating_mul(self.max_line as u64);

        // Positions of '\n', last one first.
        let mut newlines: Vec<u64> = Vec::with_capacity(count.min(1024) + 1);
        let mut pos = size;
        let mut scanned = 0u64;

        'scan: while pos > 0 && newlines.len() <= count && scanned < limit {
            let start = pos.saturating_sub(self.buf.len() as u64);
            let len = (pos - start) as usize;

            self.file.seek(SeekFrom::Start(start)).await?;
            self.file.read_exact(&mut self.buf[..len]).await?;

            scanned += len as u64;
            pos = start;

            for i in memrchr_iter(b'\n', &self.buf[..len]) {
                newlines.push(start + i as u64);
                if newlines.len() > count {
                    break 'scan;
                }
            }
        }

        let end = match newlines.first() {
            Some(nl) => nl + 1,
            None if pos == 0 => 0,
            // Gave up inside one over-long line, start after it.
            None => size,
        };
        let begin = match newlines.get(count) {
            Some(nl) => nl + 1,
            None if pos == 0 => 0,
            // Gave up scanning, keep only what is known to be whole lines.
            None => newlines.last().map_or(end, |nl| nl + 1),
        };

        if end > begin {
            let mut bytes = vec![0; (end - begin) as usize];
            self.file.seek(SeekFrom::Start(begin)).await?;
            self.file.read_exact(&mut bytes).await?;
            split_lines(&mut self.partial, self.max_line, &bytes, out);
        }

        self.partial.clear();
        self.checkpoint = Checkpoint::at(end);
        self.checkpoint.observe(size);

        Ok(())
    }

    /// Moves the read position to the current end of file.
    pub(crate) async fn skip_to_end(&mut self) -> io::Result<()> {
        let size = self.file.metadata().await?.len();
        self.partial.clear();
        self.checkpoint = Checkpoint::at(size);
        Ok(())
    }

    /// One pass of the follow loop: detect rotation or truncation, then read
    /// whatever is new into `out`.
    ///
    /// An error leaves the position untouched, except for lines already pushed
    /// to `out`, so that the next pass resumes exactly where this one stopped.
    pub(crate) async fn poll(&mut self, out: &mut Vec<String>) -> io::Result<Step> {
        let current = match FileId::of_path(&self.path).await {
            Ok(id) => id,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                trace!(path = %self.path.display(), "file missing, retrying next tick");
                // Moved away, not necessarily done with: keep draining.
                return Ok(if self.read_available(out).await? {
                    Step::Draining
                } else {
                    Step::Missing
                });
            }
            Err(e) => return Err(e),
        };

        if current != self.id {
            if self.read_available(out).await? {
                return Ok(Step::Draining);
            }
            // Only give up on the old file once the new one is usable.
            let (file, id) = open_regular(&self.path).await?;
            self.flush_partial(out);

            debug!(
                path = %self.path.display(),
                old = %self.id,
                new = %id,
                "file rotated, following new file"
            );

            self.file = file;
            self.id = id;
            self.checkpoint = Checkpoint::default();

            let more = self.read_available(out).await?;
            return Ok(Step::Rotated { more });
        }

        let size = self.file.metadata().await?.len();
        match self.checkpoint.observe(size) {
            Growth::Unchanged => Ok(Step::Idle),
            Growth::Appended(_) => {
                let more = self.read_available(out).await?;
                Ok(Step::Read { more })
            }
            Growth::Truncated => {
                debug!(
                    path = %self.path.display(),
                    size,
                    offset = self.checkpoint.offset,
                    "file truncated, reading from start"
                );
                self.checkpoint.rewind();
                self.partial.clear();

                let more = self.read_available(out).await?;
                Ok(Step::Truncated { more })
            }
        }
    }

    /// Reads from the read position towards EOF, at most one read budget.
    ///
    /// Returns `true` if the budget ran out before EOF was seen.
    async fn read_available(&mut self, out: &mut Vec<String>) -> io::Result<bool> {
        self.file
            .seek(SeekFrom::Start(self.checkpoint.offset))
            .await?;

        let mut budget = self.read_budget;
        while budget > 0 {
            let want = self.buf.len().min(budget as usize);
            let n = self.file.read(&mut self.buf[..want]).await?;
            if n == 0 {
                return Ok(false);
            }

            self.checkpoint.advance(n as u64);
            budget -= n as u64;
            split_lines(&mut self.partial, self.max_line, &self.buf[..n], out);
        }

        Ok(true)
    }

    /// Emits a held fragment as a final line of the file being left.
    fn flush_partial(&mut self, out: &mut Vec<String>) {
        if !self.partial.is_empty() {
            out.push(decode(&self.partial));
            self.partial.clear();
        }
    }
}

impl fmt::Debug for Tail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tail")
            .field("path", &self.path)
            .field("id", &self.id)
            .field("checkpoint", &self.checkpoint)
            .field("partial", &self.partial.len())
            .finish()
    }
}

async fn open_regular(path: &Path) -> io::Result<(File, FileId)> {
    let file = identity::open(path).await?;
    if !file.metadata().await?.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "not a regular file",
        ));
    }

    let id = FileId::of_file(&file).await?;
    Ok((file, id))
}

/// Splits `bytes` on `\n`, prefixing the first line with `partial` and
/// leaving the unterminated remainder in `partial`.
///
/// A remainder longer than `max_line` is emitted on its own.
fn split_lines(partial: &mut Vec<u8>, max_line: usize, bytes: &[u8], out: &mut Vec<String>) {
    let mut start = 0;

    for nl in memchr_iter(b'\n', bytes) {
        let line = &bytes[start..nl];
        if partial.is_empty() {
            out.push(decode(line));
        } else {
            partial.extend_from_slice(line);
            out.push(decode(partial));
            partial.clear();
        }
        start = nl + 1;
    }

    partial.extend_from_slice(&bytes[start..]);
    if partial.len() > max_line {
        out.push(decode(partial));
        partial.clear();
    }
}

fn decode(line: &[u8]) -> String {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}

/// Filter and plugins, applied to each line before it is queued.
#[derive(Debug, Default)]
pub(crate) struct Pipeline {
    pub(crate) filter: Filter,
    pub(crate) plugins: PluginChain,
}

impl Pipeline {
    pub(crate) fn process(&self, line: String) -> Option<String> {
        if !self.filter.is_match(&line) {
            return None;
        }
        self.plugins.apply(line)
    }
}

/// Diagnostics callback for errors that are retried rather than surfaced.
pub(crate) type ErrorHook = Arc<dyn Fn(&Error) + Send + Sync>;

/// The background loop of one follower.
pub(crate) struct Task {
    pub(crate) tail: Tail,
    pub(crate) pipeline: Arc<Pipeline>,
    pub(crate) tx: mpsc::Sender<String>,
    pub(crate) cancel: CancellationToken,
    pub(crate) poll_interval: Duration,
    pub(crate) backfill: usize,
    pub(crate) on_error: Option<ErrorHook>,
}

impl Task {
    /// Runs until cancelled or until the consumer goes away. The handle is
    /// closed when this returns.
    pub(crate) async fn run(mut self) {
        let mut batch = Vec::new();

        if let Err(e) = self.tail.backfill(self.backfill, &mut batch).await {
            self.report(e);
            batch.clear();
            if let Err(e) = self.tail.skip_to_end().await {
                self.report(e);
            }
        }

        if self.deliver(&mut batch).await {
            self.follow(&mut batch).await;
        }

        debug!(path = %self.tail.path().display(), "follower exited");
    }

    async fn follow(&mut self, batch: &mut Vec<String>) {
        let mut ticker = time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        let mut more = false;
        loop {
            if more {
                if self.cancel.is_cancelled() {
                    return;
                }
            } else {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => return,
                    _ = ticker.tick() => {}
                }
            }

            more = match self.tail.poll(batch).await {
                Ok(step) => {
                    trace!(path = %self.tail.path().display(), ?step, "poll");
                    step.has_more()
                }
                Err(e) => {
                    self.report(e);
                    false
                }
            };

            if !self.deliver(batch).await {
                return;
            }
        }
    }

    /// Queues every line that survives the pipeline. Returns `false` once the
    /// loop should exit.
    async fn deliver(&self, batch: &mut Vec<String>) -> bool {
        for line in batch.drain(..) {
            let line = match self.pipeline.process(line) {
                Some(line) => line,
                None => continue,
            };

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return false,
                res = self.tx.send(line) => {
                    if res.is_err() {
                        debug!(path = %self.tail.path().display(), "consumer gone");
                        return false;
                    }
                }
            }
        }

        true
    }

    fn report(&self, source: io::Error) {
        warn!(
            path = %self.tail.path().display(),
            error = %source,
            "transient error, retrying next tick"
        );

        if let Some(hook) = &self.on_error {
            hook(&Error::Transient {
                path: self.tail.path().to_path_buf(),
                source,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, OpenOptions};
    use std::io::Write;
    use tempfile::tempdir;

    const MAX_LINE: usize = 1024;

    fn append(path: &Path, data: &str) {
        let mut f = OpenOptions::new().append(true).open(path).unwrap();
        f.write_all(data.as_bytes()).unwrap();
    }

    fn split_all(chunks: &[&str], max_line: usize) -> (Vec<String>, Vec<u8>) {
        let mut partial = Vec::new();
        let mut out = Vec::new();
        for chunk in chunks {
            split_lines(&mut partial, max_line, chunk.as_bytes(), &mut out);
        }
        (out, partial)
    }

    #[test]
    fn test_split_holds_partial() {
        let (out, partial) = split_all(&["foo ", "bar\nbaz\nqu", "x"], MAX_LINE);
        assert_eq!(out, vec!["foo bar", "baz"]);
        assert_eq!(partial, b"qux");
    }

    #[test]
    fn test_split_strips_crlf_and_keeps_empty_lines() {
        let (out, partial) = split_all(&["a\r\n\r\nb\n"], MAX_LINE);
        assert_eq!(out, vec!["a", "", "b"]);
        assert!(partial.is_empty());
    }

    #[test]
    fn test_split_breaks_overlong_partial() {
        let (out, partial) = split_all(&["abcdef", "gh\n"], 4);
        assert_eq!(out, vec!["abcdef", "gh"]);
        assert!(partial.is_empty());
    }

    #[test]
    fn test_split_invalid_utf8_is_lossy() {
        let mut partial = Vec::new();
        let mut out = Vec::new();
        split_lines(&mut partial, MAX_LINE, b"ok \xff\n", &mut out);
        assert_eq!(out, vec!["ok \u{fffd}"]);
    }

    #[test]
    fn test_step_has_more() {
        assert!(Step::Draining.has_more());
        assert!(Step::Read { more: true }.has_more());
        assert!(!Step::Rotated { more: false }.has_more());
        assert!(!Step::Missing.has_more());
        assert!(!Step::Idle.has_more());
    }

    #[tokio::test]
    async fn test_open_directory_fails() {
        let dir = tempdir().unwrap();
        assert!(Tail::open(dir.path(), MAX_LINE).await.is_err());
    }

    #[tokio::test]
    async fn test_backfill_then_append() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "a\nb\nc\n").unwrap();

        let mut tail = Tail::open(&path, MAX_LINE).await.unwrap();
        let mut out = Vec::new();
        tail.backfill(2, &mut out).await.unwrap();
        assert_eq!(out, vec!["b", "c"]);
        assert_eq!(tail.offset(), 6);

        out.clear();
        assert_eq!(tail.poll(&mut out).await.unwrap(), Step::Idle);

        append(&path, "d\n");
        assert_eq!(tail.poll(&mut out).await.unwrap(), Step::Read { more: false });
        assert_eq!(out, vec!["d"]);
    }

    #[tokio::test]
    async fn test_backfill_short_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "only\n").unwrap();

        let mut tail = Tail::open(&path, MAX_LINE).await.unwrap();
        let mut out = Vec::new();
        tail.backfill(10, &mut out).await.unwrap();
        assert_eq!(out, vec!["only"]);
    }

    #[tokio::test]
    async fn test_backfill_leaves_unterminated_tail() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "one\ntwo\nthr").unwrap();

        let mut tail = Tail::open(&path, MAX_LINE).await.unwrap();
        let mut out = Vec::new();
        tail.backfill(5, &mut out).await.unwrap();
        assert_eq!(out, vec!["one", "two"]);
        assert_eq!(tail.offset(), 8);

        out.clear();
        tail.poll(&mut out).await.unwrap();
        assert!(out.is_empty());

        append(&path, "ee\n");
        tail.poll(&mut out).await.unwrap();
        assert_eq!(out, vec!["three"]);
    }

    #[tokio::test]
    async fn test_backfill_zero_and_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "old\nlines\n").unwrap();

        let mut tail = Tail::open(&path, MAX_LINE).await.unwrap();
        let mut out = Vec::new();
        tail.backfill(0, &mut out).await.unwrap();
        assert!(out.is_empty());
        assert_eq!(tail.offset(), 10);

        let empty = dir.path().join("empty.log");
        fs::write(&empty, "").unwrap();
        let mut tail = Tail::open(&empty, MAX_LINE).await.unwrap();
        tail.backfill(3, &mut out).await.unwrap();
        assert!(out.is_empty());
        assert_eq!(tail.offset(), 0);
    }

    #[tokio::test]
    async fn test_backfill_spans_chunks() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.log");
        let content: String = (0..20_000).map(|i| format!("line {}\n", i)).collect();
        fs::write(&path, &content).unwrap();

        let mut tail = Tail::open(&path, MAX_LINE).await.unwrap();
        let mut out = Vec::new();
        tail.backfill(15_000, &mut out).await.unwrap();
        assert_eq!(out.len(), 15_000);
        assert_eq!(out.first().unwrap(), "line 5000");
        assert_eq!(out.last().unwrap(), "line 19999");
    }

    #[tokio::test]
    async fn test_backfill_gives_up_inside_overlong_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let content = format!("old1\nold2\n{}", "y".repeat(70_000));
        fs::write(&path, &content).unwrap();

        let mut tail = Tail::open(&path, 4096).await.unwrap();
        let mut out = Vec::new();
        tail.backfill(0, &mut out).await.unwrap();
        assert!(out.is_empty());
        assert_eq!(tail.offset(), content.len() as u64);

        assert_eq!(tail.poll(&mut out).await.unwrap(), Step::Idle);
        append(&path, "z\nnext\n");
        tail.poll(&mut out).await.unwrap();
        assert_eq!(out, vec!["z", "next"]);
    }

    #[tokio::test]
    async fn test_truncation_discards_held_partial() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "").unwrap();

        let mut tail = Tail::open(&path, MAX_LINE).await.unwrap();
        let mut out = Vec::new();
        tail.backfill(0, &mut out).await.unwrap();

        append(&path, "one\npar");
        tail.poll(&mut out).await.unwrap();
        assert_eq!(out, vec!["one"]);
        assert_eq!(tail.offset(), 7);

        out.clear();
        fs::write(&path, "x\n").unwrap();
        assert_eq!(
            tail.poll(&mut out).await.unwrap(),
            Step::Truncated { more: false }
        );
        assert_eq!(out, vec!["x"]);
    }

    #[tokio::test]
    async fn test_truncation_restarts_from_zero() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "one\ntwo\n").unwrap();

        let mut tail = Tail::open(&path, MAX_LINE).await.unwrap();
        let mut out = Vec::new();
        tail.backfill(10, &mut out).await.unwrap();
        assert_eq!(out, vec!["one", "two"]);

        out.clear();
        fs::write(&path, "x\n").unwrap();
        assert_eq!(
            tail.poll(&mut out).await.unwrap(),
            Step::Truncated { more: false }
        );
        assert_eq!(out, vec!["x"]);
        assert_eq!(tail.offset(), 2);
    }

    #[tokio::test]
    async fn test_rotation_drains_old_file_first() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "old1\n").unwrap();

        let mut tail = Tail::open(&path, MAX_LINE).await.unwrap();
        let mut out = Vec::new();
        tail.backfill(10, &mut out).await.unwrap();
        assert_eq!(out, vec!["old1"]);

        out.clear();
        append(&path, "old2\npart");
        fs::rename(&path, dir.path().join("app.log.1")).unwrap();
        fs::write(&path, "new1\n").unwrap();

        assert_eq!(
            tail.poll(&mut out).await.unwrap(),
            Step::Rotated { more: false }
        );
        assert_eq!(out, vec!["old2", "part", "new1"]);

        out.clear();
        append(&path, "new2\n");
        tail.poll(&mut out).await.unwrap();
        assert_eq!(out, vec!["new2"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_reopen_keeps_partial_on_old_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let rotated = dir.path().join("app.log.1");
        fs::write(&path, "").unwrap();

        let mut tail = Tail::open(&path, MAX_LINE).await.unwrap();
        let mut out = Vec::new();
        tail.backfill(0, &mut out).await.unwrap();

        append(&path, "par");
        tail.poll(&mut out).await.unwrap();
        assert!(out.is_empty());

        fs::rename(&path, &rotated).unwrap();
        fs::create_dir(&path).unwrap();
        assert!(tail.poll(&mut out).await.is_err());
        assert!(out.is_empty());

        append(&rotated, "tial\n");
        fs::remove_dir(&path).unwrap();
        fs::write(&path, "new\n").unwrap();

        assert_eq!(
            tail.poll(&mut out).await.unwrap(),
            Step::Rotated { more: false }
        );
        assert_eq!(out, vec!["partial", "new"]);
    }

    #[tokio::test]
    async fn test_missing_file_then_recreated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "").unwrap();

        let mut tail = Tail::open(&path, MAX_LINE).await.unwrap();
        let mut out = Vec::new();
        tail.backfill(10, &mut out).await.unwrap();

        append(&path, "last words\n");
        fs::rename(&path, dir.path().join("app.log.1")).unwrap();

        assert_eq!(tail.poll(&mut out).await.unwrap(), Step::Missing);
        assert_eq!(out, vec!["last words"]);
        assert_eq!(tail.poll(&mut out).await.unwrap(), Step::Missing);

        out.clear();
        fs::write(&path, "again\n").unwrap();
        assert_eq!(
            tail.poll(&mut out).await.unwrap(),
            Step::Rotated { more: false }
        );
        assert_eq!(out, vec!["again"]);
    }

    #[tokio::test]
    async fn test_read_budget_drains_over_several_passes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "").unwrap();

        let mut tail = Tail::open(&path, MAX_LINE).await.unwrap();
        tail.read_budget = 4;
        let mut out = Vec::new();
        tail.backfill(0, &mut out).await.unwrap();

        append(&path, "ab\ncd\n");
        assert_eq!(tail.poll(&mut out).await.unwrap(), Step::Read { more: true });
        assert_eq!(out, vec!["ab"]);
        assert_eq!(tail.poll(&mut out).await.unwrap(), Step::Read { more: false });
        assert_eq!(out, vec!["ab", "cd"]);

        out.clear();
        append(&path, "ef\ngh\n");
        fs::rename(&path, dir.path().join("app.log.1")).unwrap();
        fs::write(&path, "ij\n").unwrap();

        assert_eq!(tail.poll(&mut out).await.unwrap(), Step::Draining);
        assert_eq!(out, vec!["ef"]);
        assert_eq!(
            tail.poll(&mut out).await.unwrap(),
            Step::Rotated { more: false }
        );
        assert_eq!(out, vec!["ef", "gh", "ij"]);
    }

    #[test]
    fn test_pipeline_filters_before_plugins() {
        let mut plugins = PluginChain::new();
        plugins.push(|line: String| Some(format!("[{}]", line)));
        let pipeline = Pipeline {
            filter: Filter::new([vec!["keep"]]).unwrap(),
            plugins,
        };

        assert_eq!(pipeline.process("keep me".into()), Some("[keep me]".into()));
        assert_eq!(pipeline.process("drop me".into()), None);
    }
}
