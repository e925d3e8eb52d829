//! Timer-based coalescing: debounce and throttle
//!
//! Pure scheduling policies on tokio time. Debounce cancels the pending
//! run on every reschedule and fires once the calls go quiet; throttle
//! gates to a fixed interval and suppresses trailing calls.

use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Run a job only after calls have stopped arriving for `delay`.
///
/// Every `call` cancels the previously scheduled job, so a burst of calls
/// results in exactly one execution. Must be used from within a tokio
/// runtime.
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Debouncer { delay, pending: Mutex::new(None) }
    }

    pub fn call<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            job();
        });
        let mut pending = self.pending.lock().unwrap();
        if let Some(previous) = pending.replace(handle) {
            previous.abort();
        }
    }

    /// Cancel the pending job, if any
    pub fn cancel(&self) {
        if let Some(previous) = self.pending.lock().unwrap().take() {
            previous.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Run a job at most once per interval; calls inside the window are
/// dropped (no trailing execution).
pub struct Throttle {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Throttle { interval, last: Mutex::new(None) }
    }

    /// Returns true when the job ran
    pub fn call<F>(&self, job: F) -> bool
    where
        F: FnOnce(),
    {
        let mut last = self.last.lock().unwrap();
        let now = Instant::now();
        let open = last.map(|t| now.duration_since(t) >= self.interval).unwrap_or(true);
        if open {
            *last = Some(now);
            drop(last);
            job();
        }
        open
    }
}
