//! The consumer side of a delivery queue.

use std::fmt;
use std::pin::Pin;
use std::task;

use futures_util::future::FutureExt;
use futures_util::stream::{Stream as FuturesStream, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

use crate::shutdown::Shutdown;

/// A live, non-restartable sequence of delivered lines.
///
/// The sequence ends once its producer has been stopped and every line
/// already queued has been taken. It can additionally be tied to a
/// cancellation with [`Lines::until`], in which case it also ends as soon as
/// that cancellation fires, even while no new line is available.
pub struct Lines {
    rx: mpsc::Receiver<String>,
    cancelled: Option<Pin<Box<WaitForCancellationFutureOwned>>>,
}

impl Lines {
    pub(crate) fn new(rx: mpsc::Receiver<String>) -> Self {
        Lines {
            rx,
            cancelled: None,
        }
    }

    /// A sequence that has already ended.
    pub(crate) fn ended() -> Self {
        let (_, rx) = mpsc::channel(1);
        Lines::new(rx)
    }

    /// Ends the sequence early once `token` is cancelled.
    pub fn until(mut self, token: CancellationToken) -> Self {
        self.cancelled = Some(Box::pin(token.cancelled_owned()));
        self
    }

    /// Ends the sequence early once the process-wide shutdown fires.
    pub fn until_shutdown(self, shutdown: &Shutdown) -> Self {
        self.until(shutdown.token())
    }

    /// Waits for the next line, or `None` once the sequence has ended.
    pub async fn next_line(&mut self) -> Option<String> {
        self.next().await
    }
}

impl fmt::Debug for Lines {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lines")
            .field("cancellable", &self.cancelled.is_some())
            .finish_non_exhaustive()
    }
}

impl FuturesStream for Lines {
    type Item = String;

    fn poll_next(
        mut self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> task::Poll<Option<Self::Item>> {
        if let Some(cancelled) = self.cancelled.as_mut() {
            if cancelled.poll_unpin(cx).is_ready() {
                self.rx.close();
                return task::Poll::Ready(None);
            }
        }

        self.rx.poll_recv(cx)
    }
}
