//! Trailing-edge debounce for change notifications.
//!
//! Editors emit bursts of filesystem events per save; one reload per burst
//! is enough.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Debounced notifier around a zero-argument callback.
///
/// A burst of triggers arriving within one window produces exactly one
/// callback invocation, fired `window` after the first trigger in the burst.
/// Later triggers in the burst are swallowed and do not extend the window.
/// Once the callback has fired, the next trigger starts a fresh cycle.
pub(crate) struct Debouncer {
    window: Duration,
    pending: Arc<AtomicBool>,
    callback: Arc<dyn Fn() + Send + Sync>,
}

impl Debouncer {
    /// Create a debouncer that invokes `callback` at most once per window.
    pub(crate) fn new(window: Duration, callback: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            window,
            pending: Arc::new(AtomicBool::new(false)),
            callback: Arc::new(callback),
        }
    }

    /// Record one raw change signal.
    ///
    /// Returns immediately; the callback runs on a spawned task once the
    /// window elapses. The scheduled firing is not cancellable. Must be
    /// called from within the tokio runtime.
    pub(crate) fn trigger(&self) {
        if self.pending.swap(true, Ordering::SeqCst) {
            // A firing is already scheduled.
            return;
        }

        let pending = Arc::clone(&self.pending);
        let callback = Arc::clone(&self.callback);
        let window = self.window;

        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            pending.store(false, Ordering::SeqCst);
            callback();
        });
    }
}
