// src/diagnostics.rs

//! User-facing diagnostic sink.
//!
//! Verbose diagnostics (pattern matches, throttle decisions, process output)
//! go through `tracing` at debug level. Warnings that the user must see even
//! with `silent = true` (handler errors, failed commands, unresolvable
//! executables) go through a [`DiagnosticSink`], which the console
//! implementation prints as a single line on stdout.

use std::fmt::Debug;

use tracing::warn;

/// Prefix printed in front of every warning line.
pub const WARNING_PREFIX: &str = "watchrun";

/// Receiver for one-line user-facing warnings.
pub trait DiagnosticSink: Send + Sync + Debug {
    fn warn(&self, message: &str);
}

/// Sink that prints `(!) watchrun <message>` to stdout and mirrors the
/// message into the log.
#[derive(Debug, Clone, Default)]
pub struct ConsoleSink;

impl DiagnosticSink for ConsoleSink {
    fn warn(&self, message: &str) {
        println!("{}", format_warning(message));
        warn!("{message}");
    }
}

pub fn format_warning(message: &str) -> String {
    format!("(!) {WARNING_PREFIX} {message}")
}
