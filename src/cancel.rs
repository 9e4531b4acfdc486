//! Cooperative cancellation.
//!
//! The Ctrl-C handler holds a clone of the token. While some operation is listening
//! (an armed session or a countdown), an interrupt cancels that operation; the monitor
//! checks the token at the top of every iteration and sleeps through it, so an interrupt
//! wakes the inter-capture sleep immediately.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    flags: Mutex<Flags>,
    wake: Condvar,
}

#[derive(Default)]
struct Flags {
    cancelled: bool,
    listeners: usize,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.lock().cancelled = true;
        self.inner.wake.notify_all();
    }

    /// Clear a previous cancellation so the token can guard a new operation.
    pub fn reset(&self) {
        self.lock().cancelled = false;
    }

    pub fn is_cancelled(&self) -> bool {
        self.lock().cancelled
    }

    /// Start a cancellable operation: clears stale cancellation and marks the token as
    /// listening until the returned guard is dropped.
    pub fn listen(&self) -> Listening<'_> {
        let mut flags = self.lock();
        flags.cancelled = false;
        flags.listeners += 1;
        Listening { token: self }
    }

    /// True while at least one `Listening` guard is alive.
    pub fn is_listening(&self) -> bool {
        self.lock().listeners > 0
    }

    /// Sleep for `duration` unless cancelled first. Returns true when cancelled.
    ///
    /// A duration past the range of `Instant` waits for cancellation only.
    pub fn sleep(&self, duration: Duration) -> bool {
        let mut flags = self.lock();
        let Some(deadline) = Instant::now().checked_add(duration) else {
            while !flags.cancelled {
                flags = self
                    .inner
                    .wake
                    .wait(flags)
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
            }
            return true;
        };
        while !flags.cancelled {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            flags = match self.inner.wake.wait_timeout(flags, deadline - now) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
        true
    }

    fn lock(&self) -> MutexGuard<'_, Flags> {
        // Flags are plain values; a poisoned lock still holds a usable state.
        self.inner
            .flags
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Marks a cancellable operation in progress.
pub struct Listening<'a> {
    token: &'a CancelToken,
}

impl Drop for Listening<'_> {
    fn drop(&mut self) {
        let mut flags = self.token.lock();
        flags.listeners = flags.listeners.saturating_sub(1);
        flags.cancelled = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sleep_runs_to_completion_when_not_cancelled() {
        let token = CancelToken::new();
        let start = Instant::now();
        assert!(!token.sleep(Duration::from_millis(30)));
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn cancel_wakes_sleeper_early() {
        let token = CancelToken::new();
        let remote = token.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            remote.cancel();
        });

        let start = Instant::now();
        assert!(token.sleep(Duration::from_secs(10)));
        assert!(start.elapsed() < Duration::from_secs(5));
        handle.join().expect("canceller thread");
    }

    #[test]
    fn unrepresentable_duration_waits_for_cancel() {
        let token = CancelToken::new();
        let remote = token.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            remote.cancel();
        });

        assert!(token.sleep(Duration::from_secs(i64::MAX as u64)));
        assert!(token.sleep(Duration::MAX));
        handle.join().expect("canceller thread");
    }

    #[test]
    fn reset_clears_cancellation() {
        let token = CancelToken::new();
        token.cancel();
        assert!(token.is_cancelled());
        assert!(token.sleep(Duration::from_secs(10)));
        token.reset();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn listening_scope_is_tracked_and_clears_stale_cancel() {
        let token = CancelToken::new();
        token.cancel();
        assert!(!token.is_listening());
        {
            let _listening = token.listen();
            assert!(token.is_listening());
            assert!(!token.is_cancelled());
            token.cancel();
            assert!(token.is_cancelled());
        }
        assert!(!token.is_listening());
        assert!(!token.is_cancelled());
    }
}
