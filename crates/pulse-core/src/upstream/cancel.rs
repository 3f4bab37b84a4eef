use std::{future::Future, sync::Arc};
use tokio::sync::watch;

use super::UpstreamError;

/// Cooperative cancellation shared by every request of one aggregation cycle.
///
/// Clones observe the same flag, so cancelling any clone aborts in-flight requests in
/// nested fan-outs too. A cancelled request resolves to [`UpstreamError::Cancelled`]
/// rather than an empty result.
#[derive(Clone, Debug)]
pub struct CancelSignal {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelSignal {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { tx: Arc::new(tx), rx }
    }

    /// Fires the signal. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the signal has fired.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    /// Runs `fut` unless the signal fires first.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Cancelled`] if the signal fired before `fut` completed,
    /// otherwise whatever `fut` returned.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, UpstreamError>
    where
        F: Future<Output = Result<T, UpstreamError>>,
    {
        if self.is_cancelled() {
            return Err(UpstreamError::Cancelled);
        }
        tokio::select! {
            biased;
            () = self.cancelled() => Err(UpstreamError::Cancelled),
            result = fut => result,
        }
    }
}
