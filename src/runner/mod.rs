// src/runner/mod.rs

//! Runner model, registry and matching.
//!
//! - [`config`] holds the user-facing [`RunnerConfig`] and its callback types.
//! - [`registry`] resolves configs into a session-wide [`ResolvedOptions`].
//! - [`matcher`] decides whether a file event concerns a runner.

pub mod config;
pub mod matcher;
pub mod registry;

pub use config::{
    catch_panic, CommandSpec, Condition, RunnerConfig, RunnerHandler, RunnerHandlerEvent,
    ANONYMOUS_RUNNER,
    DEFAULT_DELAY, DEFAULT_THROTTLE,
};
pub use matcher::matches;
pub use registry::{CompiledPattern, ResolvedOptions, RunOptions, Runner, Session};
