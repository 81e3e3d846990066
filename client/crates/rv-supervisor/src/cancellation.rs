//! Epoch-based cancellation of in-flight lifecycle runs.

use std::sync::Arc;

use tokio::sync::watch;

/// Issues cancellation signals tied to the current epoch.
///
/// Bumping the epoch cancels every signal handed out before the bump while
/// signals created afterwards start uncancelled.
#[derive(Clone)]
pub struct RunCancellation {
    epoch_tx: Arc<watch::Sender<u64>>,
}

impl RunCancellation {
    pub fn new() -> Self {
        let (epoch_tx, _) = watch::channel(0);
        Self {
            epoch_tx: Arc::new(epoch_tx),
        }
    }

    pub fn signal(&self) -> CancelSignal {
        let rx = self.epoch_tx.subscribe();
        let epoch = *rx.borrow();
        CancelSignal { rx, epoch }
    }

    /// Cancel every outstanding signal.
    pub fn cancel_all(&self) {
        self.epoch_tx.send_modify(|epoch| *epoch = epoch.wrapping_add(1));
    }

    pub fn epoch(&self) -> u64 {
        *self.epoch_tx.borrow()
    }
}

impl Default for RunCancellation {
    fn default() -> Self {
        Self::new()
    }
}

/// Cancellation observed by a single run.
#[derive(Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<u64>,
    epoch: u64,
}

impl CancelSignal {
    /// A signal that is never cancelled.
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(0);
        Self { rx, epoch: 0 }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() != self.epoch
    }

    /// Resolves once cancelled; pends forever for [`CancelSignal::never`].
    pub async fn cancelled(&mut self) {
        loop {
            if self.is_cancelled() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}
