//! Shutdown coordination for background breaker tasks.

use std::future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};

/// Coordinator for stopping recovery schedulers.
///
/// Triggering is idempotent and sticky: listeners created after the trigger
/// see it immediately.
#[derive(Debug)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
    triggered: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            triggered: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a listener for this coordinator.
    pub fn listener(&self) -> ShutdownListener {
        ShutdownListener {
            rx: Some(self.tx.subscribe()),
            triggered: Arc::clone(&self.triggered),
        }
    }

    /// Fire the signal. Later calls are no-ops.
    pub fn trigger(&self) {
        if !self.triggered.swap(true, Ordering::AcqRel) {
            let _ = self.tx.send(());
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::Acquire)
    }

    /// Number of listeners still alive (tasks not yet exited).
    pub fn active_listeners(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of a [`Shutdown`].
#[derive(Debug)]
pub struct ShutdownListener {
    rx: Option<broadcast::Receiver<()>>,
    triggered: Arc<AtomicBool>,
}

impl ShutdownListener {
    /// A listener that never fires.
    pub fn never() -> Self {
        Self {
            rx: None,
            triggered: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Resolve once the coordinator is triggered. Cancel safe.
    ///
    /// Dropping the coordinator without triggering it does not count: the
    /// listener then stays pending forever, like [`never`](Self::never).
    pub async fn wait(&mut self) {
        if self.triggered.load(Ordering::Acquire) {
            return;
        }
        if let Some(rx) = self.rx.as_mut() {
            match rx.recv().await {
                Ok(()) | Err(RecvError::Lagged(_)) => return,
                Err(RecvError::Closed) => {
                    // Coordinator gone; only a trigger sent before it went counts.
                    self.rx = None;
                    if self.triggered.load(Ordering::Acquire) {
                        return;
                    }
                }
            }
        }
        future::pending::<()>().await
    }
}
