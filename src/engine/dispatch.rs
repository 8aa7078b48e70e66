// src/engine/dispatch.rs

//! Dispatch engine.
//!
//! Two entry points, both synchronous:
//! - [`DispatchEngine::on_startup`] runs every runner whose startup policy
//!   allows it, without matching.
//! - [`DispatchEngine::on_file_event`] matches each runner in registry order
//!   and, on a match, calls its handler and schedules its command.
//!
//! A failing runner never stops the others from being evaluated.

use std::sync::Arc;

use tracing::debug;

use crate::diagnostics::DiagnosticSink;
use crate::engine::{FileEvent, HotUpdate};
use crate::exec::{CommandExecutor, ExecuteOutcome, ProcessSpawner, TimerScheduler};
use crate::paths::normalize_file_path;
use crate::runner::{catch_panic, matches, ResolvedOptions, Runner, RunnerHandlerEvent};
use crate::types::{FileEventKind, Trigger};

/// Suffix of TypeScript declaration files, ignored when `skip_dts` is set.
pub const DECLARATION_SUFFIX: &str = ".d.ts";

#[derive(Debug, Clone)]
pub struct DispatchEngine {
    options: Arc<ResolvedOptions>,
    executor: CommandExecutor,
    sink: Arc<dyn DiagnosticSink>,
}

impl DispatchEngine {
    pub fn new(
        options: Arc<ResolvedOptions>,
        timers: Arc<dyn TimerScheduler>,
        spawner: Arc<dyn ProcessSpawner>,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        let executor = CommandExecutor::new(
            Arc::clone(&options),
            timers,
            spawner,
            Arc::clone(&sink),
        );
        Self {
            options,
            executor,
            sink,
        }
    }

    pub fn options(&self) -> &ResolvedOptions {
        &self.options
    }

    pub fn executor(&self) -> &CommandExecutor {
        &self.executor
    }

    /// Execute startup runners once. Returns the number scheduled.
    pub fn on_startup(&self) -> usize {
        let mut scheduled = 0;

        for runner in &self.options.runners {
            if !runner.config().runs_at_startup() {
                debug!(runner = %runner.name(), "startup disabled");
                continue;
            }

            if self.executor.execute(runner, Trigger::Startup) == ExecuteOutcome::Scheduled {
                scheduled += 1;
            }
        }

        debug!(scheduled, build = self.options.build_mode(), "startup runners dispatched");
        scheduled
    }

    /// Dispatch a file event to every matching runner.
    pub fn on_file_event(&self, event: &FileEvent) -> HotUpdate {
        let file = normalize_file_path(&self.options.session.root, &event.path.to_string_lossy());

        if self.options.skip_dts && file.ends_with(DECLARATION_SUFFIX) {
            debug!(file = %file, "declaration file change suppressed");
            return HotUpdate::Suppress;
        }

        for runner in &self.options.runners {
            match catch_panic(|| Ok(matches(runner, &file))) {
                Ok(true) => self.handle_runner(runner, &file, event.kind),
                Ok(false) => {}
                Err(err) => self.sink.warn(&format!(
                    "Condition failed for [{}] on {file}: {err:#}",
                    runner.name()
                )),
            }
        }

        HotUpdate::Continue
    }

    fn handle_runner(&self, runner: &Arc<Runner>, file: &str, kind: FileEventKind) {
        debug!(runner = %runner.name(), file, %kind, "file changed, applying handler");

        if let Some(handler) = &runner.config().on_file_changed {
            let event = RunnerHandlerEvent {
                file,
                kind,
                session: &self.options.session,
            };
            if let Err(err) = handler.call(&event) {
                self.sink.warn(&format!("Handler failed for {file}: {err:#}"));
                debug!(runner = %runner.name(), error = ?err, "full handler error");
                return;
            }
        }

        if runner.config().command.is_some() {
            self.executor.execute(runner, Trigger::FileChange);
        }
    }
}
