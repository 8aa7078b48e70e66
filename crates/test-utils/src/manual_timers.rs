use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use watchrun::exec::{TimerCallback, TimerScheduler};

struct Pending {
    deadline: Duration,
    seq: u64,
    callback: TimerCallback,
}

#[derive(Default)]
struct State {
    now: Duration,
    next_seq: u64,
    pending: Vec<Pending>,
}

/// Deterministic clock for timer-driven tests.
///
/// Nothing fires on its own; [`ManualTimers::advance`] moves the clock and
/// runs every callback that became due, earliest deadline first (ties in
/// scheduling order). Callbacks may schedule further timers.
#[derive(Clone, Default)]
pub struct ManualTimers {
    state: Arc<Mutex<State>>,
}

impl fmt::Debug for ManualTimers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock().unwrap();
        f.debug_struct("ManualTimers")
            .field("now", &state.now)
            .field("pending", &state.pending.len())
            .finish()
    }
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed since the clock was created.
    pub fn now(&self) -> Duration {
        self.state.lock().unwrap().now
    }

    pub fn pending(&self) -> usize {
        self.state.lock().unwrap().pending.len()
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    pub fn advance(&self, by: Duration) {
        let target = self.now() + by;

        loop {
            let due = {
                let mut state = self.state.lock().unwrap();
                let next = state
                    .pending
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.deadline <= target)
                    .min_by_key(|(_, p)| (p.deadline, p.seq))
                    .map(|(i, _)| i);

                match next {
                    Some(i) => {
                        let pending = state.pending.remove(i);
                        state.now = pending.deadline;
                        pending.callback
                    }
                    None => {
                        state.now = target;
                        return;
                    }
                }
            };

            // Lock released: the callback may schedule more timers.
            due();
        }
    }
}

impl TimerScheduler for ManualTimers {
    fn after(&self, delay: Duration, callback: TimerCallback) {
        let mut state = self.state.lock().unwrap();
        let seq = state.next_seq;
        state.next_seq += 1;
        let deadline = state.now + delay;
        state.pending.push(Pending {
            deadline,
            seq,
            callback,
        });
    }
}
