//! Shutdown coordination for the dashboard service.

use tokio::sync::watch;

/// Coordinator for graceful shutdown.
///
/// The flag only ever goes from `false` to `true`, so a signal taken after
/// the trigger still resolves.
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

/// One task's view of the shutdown flag.
#[derive(Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Set the flag. Later calls do nothing.
    pub fn trigger(&self) {
        let first = self.tx.send_if_modified(|triggered| !std::mem::replace(triggered, true));
        if first {
            tracing::info!(tasks = self.tx.receiver_count(), "Shutdown triggered");
        }
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    /// Resolve once shutdown is triggered or the coordinator is dropped.
    pub async fn wait(mut self) {
        let _ = self.rx.wait_for(|triggered| *triggered).await;
    }
}
