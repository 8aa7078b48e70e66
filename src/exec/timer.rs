// src/exec/timer.rs

//! One-shot timers behind a trait so the delay/throttle logic can run on a
//! simulated clock in tests.

use std::fmt::Debug;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::Instant;

/// Callback fired once when a timer elapses.
pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// Fire-and-forget timer facility.
pub trait TimerScheduler: Send + Sync + Debug {
    /// Run `callback` once, `delay` from now.
    fn after(&self, delay: Duration, callback: TimerCallback);
}

/// Timers backed by `tokio::time::sleep` on a given runtime.
#[derive(Debug, Clone)]
pub struct TokioTimers {
    handle: Handle,
}

impl TokioTimers {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Timers on the runtime the caller is running in.
    ///
    /// Panics when called outside of a Tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }
}

impl TimerScheduler for TokioTimers {
    fn after(&self, delay: Duration, callback: TimerCallback) {
        // Deadline taken now, not when the task is first polled.
        let deadline = Instant::now() + delay;
        self.handle.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            callback();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn fires_only_after_delay() {
        let timers = TokioTimers::current();
        let fired = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&fired);
        timers.after(Duration::from_millis(50), Box::new(move || flag.store(true, Ordering::SeqCst)));

        tokio::time::sleep(Duration::from_millis(49)).await;
        assert!(!fired.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(fired.load(Ordering::SeqCst));
    }
}
