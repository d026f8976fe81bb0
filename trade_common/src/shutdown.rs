//! One-shot shutdown signal.
//!
//! A `Shutdown` is fired at most once; any number of `ShutdownListener`s observe
//! it. Firing again is a no-op. A `ShutdownGuard` fires the signal when dropped,
//! so the producer task signals completion on every exit path, including early
//! returns and panics.
//!
//! Backed by `tokio::sync::watch` holding a single `bool`: once it flips to
//! `true` it is never re-armed.
use std::sync::Arc;

use log::debug;
use tokio::sync::watch;

/// Producer side of the shutdown signal. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    /// Creates an unfired signal.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Fires the signal. Returns `true` only for the call that actually fired it.
    pub fn fire(&self) -> bool {
        let first = self.tx.send_if_modified(|fired| {
            if *fired {
                false
            } else {
                *fired = true;
                true
            }
        });
        if first {
            debug!("Shutdown signal fired");
        }
        first
    }

    /// Whether the signal has fired.
    pub fn is_fired(&self) -> bool {
        *self.tx.borrow()
    }

    /// Creates a new observer of this signal.
    pub fn subscribe(&self) -> ShutdownListener {
        ShutdownListener {
            rx: self.tx.subscribe(),
        }
    }

    /// Returns a guard that fires the signal when dropped.
    pub fn guard(&self) -> ShutdownGuard {
        ShutdownGuard {
            shutdown: self.clone(),
        }
    }
}

/// Consumer side of the shutdown signal.
#[derive(Debug, Clone)]
pub struct ShutdownListener {
    rx: watch::Receiver<bool>,
}

impl ShutdownListener {
    /// Resolves once the signal has fired. Returns immediately if it already has.
    ///
    /// Also resolves when every `Shutdown` handle is gone, since nothing can fire
    /// it any more. Cancel safe.
    pub async fn wait(&mut self) {
        let _ = self.rx.wait_for(|fired| *fired).await;
    }

    /// Whether the signal has fired.
    pub fn is_fired(&self) -> bool {
        *self.rx.borrow()
    }
}

/// Fires the owning signal on drop.
#[derive(Debug)]
pub struct ShutdownGuard {
    shutdown: Shutdown,
}

impl Drop for ShutdownGuard {
    fn drop(&mut self) {
        self.shutdown.fire();
    }
}
