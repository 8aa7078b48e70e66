// src/exec/throttle.rs

//! Per-runner throttle and settle delay.
//!
//! `schedule` arms two independent one-shot timers at the same instant:
//! - after `throttle`, the runner's name leaves the [`ThrottleSet`];
//! - after `delay`, the action runs.
//!
//! While a name is in the set, further schedule attempts for it are
//! dropped. The first attempt inside a window wins.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::debug;

use crate::exec::timer::{TimerCallback, TimerScheduler};

/// Names of runners currently inside their throttle window.
///
/// Owned by one session; clones share the same set.
#[derive(Debug, Clone, Default)]
pub struct ThrottleSet {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl ThrottleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains(name)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Insert `name`; false if it was already throttled.
    fn try_acquire(&self, name: &str) -> bool {
        self.lock().insert(name.to_string())
    }

    fn release(&self, name: &str) {
        self.lock().remove(name);
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        // The set holds plain strings; a panic elsewhere cannot leave it torn.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Result of a schedule attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    Scheduled,
    Throttled,
}

/// Gatekeeper combining the throttle set with the timer facility.
#[derive(Debug, Clone)]
pub struct DelayController {
    throttles: ThrottleSet,
    timers: Arc<dyn TimerScheduler>,
}

impl DelayController {
    pub fn new(throttles: ThrottleSet, timers: Arc<dyn TimerScheduler>) -> Self {
        Self { throttles, timers }
    }

    pub fn throttles(&self) -> &ThrottleSet {
        &self.throttles
    }

    pub fn schedule(
        &self,
        name: &str,
        throttle: Duration,
        delay: Duration,
        action: TimerCallback,
    ) -> ScheduleOutcome {
        if !self.throttles.try_acquire(name) {
            debug!(runner = %name, "skipping because of throttling");
            return ScheduleOutcome::Throttled;
        }

        let throttles = self.throttles.clone();
        let key = name.to_string();
        self.timers.after(throttle, Box::new(move || throttles.release(&key)));

        debug!(runner = %name, ?delay, ?throttle, "scheduled");
        self.timers.after(delay, action);

        ScheduleOutcome::Scheduled
    }
}
