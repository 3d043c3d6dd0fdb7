// Cancellable, replace-on-reschedule delayed task.
//
// One logical timer: scheduling aborts whatever is pending and arms a fresh
// Tokio task that sleeps for the window and then runs the callback. Only the
// most recent schedule within a window ever fires.

use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::trace;

/// Default quiescence window.
const DEFAULT_DEBOUNCE_MS: u64 = 200;
/// Minimum allowed window.
const MIN_DEBOUNCE_MS: u64 = 50;
/// Maximum allowed window.
const MAX_DEBOUNCE_MS: u64 = 2_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceConfig {
    pub window: Duration,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self { window: Duration::from_millis(DEFAULT_DEBOUNCE_MS) }
    }
}

impl DebounceConfig {
    /// Create a config with the given window in milliseconds, clamped to [50, 2000].
    pub fn with_millis(ms: u64) -> Self {
        Self { window: Duration::from_millis(ms.clamp(MIN_DEBOUNCE_MS, MAX_DEBOUNCE_MS)) }
    }
}

#[derive(Debug)]
pub struct DebounceTimer {
    window: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl DebounceTimer {
    pub fn new(config: DebounceConfig) -> Self {
        Self { window: config.window, pending: Mutex::new(None) }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Arm the timer to run `callback` after the window, cancelling any
    /// callback that has not fired yet. Must be called inside a Tokio runtime.
    pub fn schedule<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let window = self.window;
        let mut pending = self.pending.lock().expect("debounce lock poisoned");
        if let Some(previous) = pending.take() {
            if !previous.is_finished() {
                trace!("debounce rescheduled, cancelling pending callback");
            }
            previous.abort();
        }
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            callback();
        }));
    }

    /// Cancel a pending callback. Returns whether one was still waiting.
    ///
    /// A callback that already started running is not interrupted; it has no
    /// await points left once the window has elapsed.
    pub fn cancel(&self) -> bool {
        let mut pending = self.pending.lock().expect("debounce lock poisoned");
        match pending.take() {
            Some(handle) => {
                let was_waiting = !handle.is_finished();
                handle.abort();
                was_waiting
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        let pending = self.pending.lock().expect("debounce lock poisoned");
        pending.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for DebounceTimer {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(handle) = pending.take() {
                handle.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    fn counter_callback(counter: &Arc<AtomicUsize>, value: usize) -> impl FnOnce() + Send + 'static {
        let counter = Arc::clone(counter);
        move || {
            counter.store(value, Ordering::SeqCst);
        }
    }

    // ── DebounceConfig ─────────────────────────────────────────────

    #[test]
    fn default_config_is_200ms() {
        assert_eq!(DebounceConfig::default().window, Duration::from_millis(200));
    }

    #[test]
    fn config_clamps_to_range() {
        assert_eq!(DebounceConfig::with_millis(10).window, Duration::from_millis(50));
        assert_eq!(DebounceConfig::with_millis(60_000).window, Duration::from_millis(2_000));
        assert_eq!(DebounceConfig::with_millis(300).window, Duration::from_millis(300));
    }

    // ── DebounceTimer ──────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_window() {
        let timer = DebounceTimer::new(DebounceConfig::default());
        let fired = Arc::new(AtomicUsize::new(0));
        timer.schedule(counter_callback(&fired, 1));

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(timer.is_pending());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!timer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn reschedule_replaces_pending_callback() {
        let timer = DebounceTimer::new(DebounceConfig::default());
        let calls = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(AtomicUsize::new(0));

        for value in 1..=5 {
            let calls = Arc::clone(&calls);
            let last = Arc::clone(&last);
            timer.schedule(move || {
                calls.fetch_add(1, Ordering::SeqCst);
                last.store(value, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(last.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_firing() {
        let timer = DebounceTimer::new(DebounceConfig::default());
        let fired = Arc::new(AtomicUsize::new(0));
        timer.schedule(counter_callback(&fired, 1));

        assert!(timer.cancel());
        assert!(!timer.cancel());
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn schedule_after_fire_arms_again() {
        let timer = DebounceTimer::new(DebounceConfig::with_millis(50));
        let fired = Arc::new(AtomicUsize::new(0));

        timer.schedule(counter_callback(&fired, 1));
        tokio::time::sleep(Duration::from_millis(100)).await;
        timer.schedule(counter_callback(&fired, 2));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }
}
