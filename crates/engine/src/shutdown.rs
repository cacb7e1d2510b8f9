//! Graceful shutdown signalling for the scheduler.
//!
//! Responsibilities:
//! - Provide a lightweight, clonable token that can be shared between the
//!   scheduler loop and whatever installs the shutdown signal handler.
//!
//! Does NOT handle:
//! - Installing signal handlers (the CLI owns that).
//!
//! Invariants:
//! - Once triggered, a token remains triggered forever.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tokio::sync::Notify;

/// Shutdown token usable across async tasks.
#[derive(Clone, Debug, Default)]
pub struct ShutdownToken {
    triggered: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl ShutdownToken {
    /// Create a new, untriggered token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trigger shutdown (idempotent).
    pub fn trigger(&self) {
        let was_triggered = self.triggered.swap(true, Ordering::SeqCst);
        if !was_triggered {
            self.notify.notify_waiters();
        }
    }

    /// True if shutdown has been requested.
    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Await the shutdown signal.
    ///
    /// Safe against missed notifications: the `notified()` future is created
    /// before the flag check.
    pub async fn triggered(&self) {
        let notified = self.notify.notified();
        if self.is_triggered() {
            return;
        }
        notified.await;
    }
}
