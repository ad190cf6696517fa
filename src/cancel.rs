//! One-shot cooperative cancellation.
//!
//! Both scanner tiers share the same cancellation shape: an atomic flag that
//! workers and submission loops poll, a cleanup hook that runs exactly once
//! on the first `cancel()`, and a token that wakes tasks blocked on a result.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

type Cleanup = Box<dyn FnOnce() + Send>;

/// Cooperative cancellation primitive.
///
/// `cancel()` is safe to call from any thread, any number of times; the
/// cleanup hook runs exactly once, on the call that wins the atomic race.
/// Cancellation is monotone: once set, `is_cancelled()` never reverts.
pub struct Cancellation {
    cancelled: AtomicBool,
    cleanup: Mutex<Option<Cleanup>>,
    token: CancellationToken,
}

impl Cancellation {
    /// Create a cancellation with no cleanup hook.
    pub fn new() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
            cleanup: Mutex::new(None),
            token: CancellationToken::new(),
        }
    }

    /// Create a cancellation that runs `cleanup` once on first `cancel()`.
    pub fn with_cleanup(cleanup: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancelled: AtomicBool::new(false),
            cleanup: Mutex::new(Some(Box::new(cleanup))),
            token: CancellationToken::new(),
        }
    }

    /// Request cancellation.
    ///
    /// The first caller runs the cleanup hook and fires the wake token;
    /// every later call is a no-op.
    pub fn cancel(&self) {
        if self
            .cancelled
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            if let Ok(mut slot) = self.cleanup.lock() {
                if let Some(cleanup) = slot.take() {
                    cleanup();
                }
            }
            self.token.cancel();
        }
    }

    /// Check whether cancellation has been requested. Never blocks.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Resolve once cancellation is requested.
    ///
    /// Used by collecting loops to stop waiting on an in-flight probe the
    /// moment the scan is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Cancellation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cancellation")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[test]
    fn test_not_cancelled_initially() {
        let cancel = Cancellation::new();
        assert!(!cancel.is_cancelled());
    }

    #[test]
    fn test_cancel_is_monotone() {
        let cancel = Cancellation::new();
        cancel.cancel();
        assert!(cancel.is_cancelled());
        // Repeated cancels never revert the flag
        cancel.cancel();
        assert!(cancel.is_cancelled());
    }

    #[test]
    fn test_cleanup_runs_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let cancel = Cancellation::with_cleanup(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        cancel.cancel();
        cancel.cancel();
        cancel.cancel();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_cancel_runs_cleanup_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let cancel = Arc::new(Cancellation::with_cleanup(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let cancel = Arc::clone(&cancel);
                std::thread::spawn(move || cancel.cancel())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(cancel.is_cancelled());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_future_resolves() {
        let cancel = Arc::new(Cancellation::new());
        let waiter = Arc::clone(&cancel);
        let task = tokio::spawn(async move { waiter.cancelled().await });

        cancel.cancel();
        task.await.unwrap();
    }

    #[test]
    fn test_no_cleanup_hook_is_fine() {
        let cancel = Cancellation::default();
        cancel.cancel();
        assert!(cancel.is_cancelled());
    }
}
