//! Cooperative cancellation shared between the caller and the batch worker

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;

/// Cloneable cancellation signal.
///
/// The flag answers "should the next job start?"; the broadcast wakes a job
/// that is already blocked on the encoder's output.
#[derive(Clone, Debug)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    notify: broadcast::Sender<()>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (notify, _) = broadcast::channel(1);
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            notify,
        }
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            // No receivers simply means nothing is in flight
            let _ = self.notify.send(());
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once cancellation has been requested
    pub async fn cancelled(&self) {
        // Subscribe before checking the flag so a concurrent cancel is not missed
        let mut receiver = self.notify.subscribe();
        if self.is_cancelled() {
            return;
        }
        let _ = receiver.recv().await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
