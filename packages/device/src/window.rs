//! Cancellable capture window.
//!
//! A [`ScheduledWindow`] elapses after a fixed duration unless its
//! [`CancelHandle`] is used first. Dropping the handle without calling
//! [`CancelHandle::cancel`] leaves the window running to completion.

use std::time::Duration;

use tokio::sync::oneshot;

/// How a window ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowOutcome {
    /// The full duration passed.
    Elapsed,
    /// The window was cancelled before the duration passed.
    Cancelled,
}

/// Cancels a running [`ScheduledWindow`].
#[derive(Debug)]
pub struct CancelHandle {
    tx: oneshot::Sender<()>,
}

impl CancelHandle {
    /// Cancels the window. Returns `false` if it had already finished.
    #[allow(clippy::must_use_candidate)]
    pub fn cancel(self) -> bool {
        self.tx.send(()).is_ok()
    }
}

/// A one-shot timer with an explicit cancel path.
#[derive(Debug)]
pub struct ScheduledWindow {
    duration: Duration,
    cancel_rx: oneshot::Receiver<()>,
}

impl ScheduledWindow {
    /// Creates a window of `duration` and its cancel handle.
    ///
    /// The clock starts when [`Self::wait`] is first polled.
    #[must_use]
    pub fn start(duration: Duration) -> (Self, CancelHandle) {
        let (tx, cancel_rx) = oneshot::channel();
        (
            Self {
                duration,
                cancel_rx,
            },
            CancelHandle { tx },
        )
    }

    /// Total length of the window.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Waits for the window to elapse or be cancelled.
    pub async fn wait(self) -> WindowOutcome {
        let sleep = tokio::time::sleep(self.duration);
        tokio::pin!(sleep);

        tokio::select! {
            () = &mut sleep => WindowOutcome::Elapsed,
            cancelled = self.cancel_rx => {
                if cancelled.is_ok() {
                    log::debug!("Capture window cancelled");
                    WindowOutcome::Cancelled
                } else {
                    // Handle dropped without cancelling.
                    sleep.await;
                    WindowOutcome::Elapsed
                }
            }
        }
    }
}
