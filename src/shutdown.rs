//! Process-wide "close every consumer loop" signal.

use tokio_util::sync::CancellationToken;

/// A single-fire broadcast owned by the process and handed (by clone) to
/// every consumer-facing loop, e.g. streaming transport readers.
///
/// Triggering is idempotent and cannot be undone. Followers are not stopped
/// by it; their owners stop them once their consumer loop has exited.
#[derive(Clone, Debug, Default)]
pub struct Shutdown {
    token: CancellationToken,
}

impl Shutdown {
    pub fn new() -> Self {
        Shutdown::default()
    }

    /// Fires the signal. Later calls are no-ops.
    pub fn trigger(&self) {
        if !self.token.is_cancelled() {
            tracing::debug!("shutdown triggered");
        }
        self.token.cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the signal has fired.
    pub async fn triggered(&self) {
        self.token.cancelled().await
    }

    /// A token that is cancelled when the signal fires.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}
