// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`timer`] provides the one-shot timer abstraction (`after(delay, fn)`).
//! - [`throttle`] holds the per-session throttle set and the delay/throttle
//!   gate built on top of the timers.
//! - [`spawner`] starts processes through the shell and reports their exit.
//! - [`executor`] ties these together for one runner at a time.

pub mod executor;
pub mod spawner;
pub mod throttle;
pub mod timer;

pub use executor::{resolve_executable, CommandExecutor, ExecuteOutcome, InFlight};
pub use spawner::{ExitCallback, ProcessOutcome, ProcessSpawner, ShellSpawner, SpawnRequest};
pub use throttle::{DelayController, ScheduleOutcome, ThrottleSet};
pub use timer::{TimerCallback, TimerScheduler, TokioTimers};
