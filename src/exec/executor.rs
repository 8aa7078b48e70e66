// src/exec/executor.rs

//! Command executor: turns a runner into a scheduled process spawn.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::diagnostics::DiagnosticSink;
use crate::env::EnvSnapshot;
use crate::exec::spawner::{ProcessOutcome, ProcessSpawner, SpawnRequest};
use crate::exec::throttle::{DelayController, ScheduleOutcome, ThrottleSet};
use crate::exec::timer::TimerScheduler;
use crate::runner::{ResolvedOptions, Runner};
use crate::types::Trigger;

/// What `execute` did with a runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteOutcome {
    /// The runner has no command.
    NoCommand,
    /// Startup execution in build mode for a runner with `build = false`.
    SkippedForBuild,
    /// Dropped: the runner is inside its throttle window.
    Throttled,
    /// A spawn will be attempted once the delay elapses.
    Scheduled,
}

/// Count of executions that were scheduled and have not finished yet.
///
/// Build mode waits on this before exiting.
#[derive(Debug, Clone)]
pub struct InFlight {
    tx: Arc<watch::Sender<usize>>,
}

impl Default for InFlight {
    fn default() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }
}

impl InFlight {
    pub fn count(&self) -> usize {
        *self.tx.borrow()
    }

    fn start(&self) {
        self.tx.send_modify(|n| *n += 1);
    }

    fn finish(&self) {
        self.tx.send_modify(|n| *n = n.saturating_sub(1));
    }

    /// Resolve once nothing is scheduled or running.
    pub async fn wait_idle(&self) {
        let mut rx = self.tx.subscribe();
        let _ = rx.wait_for(|n| *n == 0).await;
    }
}

/// Environment keys consulted to override `executable`, in order:
/// `<executable>_PATH` as given, then an uppercased variant with `-` and
/// `.` mapped to `_`.
pub fn override_keys(executable: &str) -> Vec<String> {
    let as_given = format!("{executable}_PATH");
    let upper = format!(
        "{}_PATH",
        executable.to_uppercase().replace(['-', '.'], "_")
    );

    if upper == as_given {
        vec![as_given]
    } else {
        vec![as_given, upper]
    }
}

/// Resolve the program to start for `executable`.
///
/// Process environment first, then the mode env snapshot, then the literal
/// name (looked up on `PATH` by the shell).
pub fn resolve_executable(env: &EnvSnapshot, executable: &str) -> String {
    let keys = override_keys(executable);

    keys.iter()
        .find_map(|k| env.process_var(k))
        .or_else(|| keys.iter().find_map(|k| env.mode_var(k)))
        .unwrap_or(executable)
        .to_string()
}

/// Owns the per-session throttle state and launches runner commands.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    options: Arc<ResolvedOptions>,
    controller: DelayController,
    spawner: Arc<dyn ProcessSpawner>,
    sink: Arc<dyn DiagnosticSink>,
    in_flight: InFlight,
}

impl CommandExecutor {
    pub fn new(
        options: Arc<ResolvedOptions>,
        timers: Arc<dyn TimerScheduler>,
        spawner: Arc<dyn ProcessSpawner>,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            options,
            controller: DelayController::new(ThrottleSet::new(), timers),
            spawner,
            sink,
            in_flight: InFlight::default(),
        }
    }

    pub fn throttles(&self) -> &ThrottleSet {
        self.controller.throttles()
    }

    pub fn in_flight(&self) -> &InFlight {
        &self.in_flight
    }

    /// Gate `runner` through build-mode and throttle checks and schedule its
    /// command. Never fails: problems surface as diagnostics.
    pub fn execute(&self, runner: &Arc<Runner>, trigger: Trigger) -> ExecuteOutcome {
        let config = runner.config();
        if config.command.is_none() {
            return ExecuteOutcome::NoCommand;
        }

        if trigger == Trigger::Startup && self.options.build_mode() && !config.run_at_build {
            debug!(runner = %runner.name(), "skipping when building");
            return ExecuteOutcome::SkippedForBuild;
        }

        self.in_flight.start();

        let launch = Launch {
            runner: Arc::clone(runner),
            options: Arc::clone(&self.options),
            spawner: Arc::clone(&self.spawner),
            sink: Arc::clone(&self.sink),
            in_flight: self.in_flight.clone(),
        };

        match self.controller.schedule(
            runner.name(),
            config.throttle,
            config.delay,
            Box::new(move || launch.run()),
        ) {
            ScheduleOutcome::Scheduled => {
                debug!(runner = %runner.name(), ?trigger, "running");
                ExecuteOutcome::Scheduled
            }
            ScheduleOutcome::Throttled => {
                self.in_flight.finish();
                ExecuteOutcome::Throttled
            }
        }
    }
}

/// State captured by a scheduled execution; runs when the delay elapses.
struct Launch {
    runner: Arc<Runner>,
    options: Arc<ResolvedOptions>,
    spawner: Arc<dyn ProcessSpawner>,
    sink: Arc<dyn DiagnosticSink>,
    in_flight: InFlight,
}

impl Launch {
    fn run(self) {
        let name = self.runner.name().to_string();

        let Some(request) = self.build_request() else {
            self.in_flight.finish();
            return;
        };

        let sink = Arc::clone(&self.sink);
        let in_flight = self.in_flight.clone();
        self.spawner.spawn(
            request,
            Box::new(move |result| {
                report_exit(sink.as_ref(), &name, result);
                in_flight.finish();
            }),
        );
    }

    /// Resolve argv now (computed commands are evaluated here) and apply
    /// executable overrides. Reports and returns `None` when nothing can run.
    fn build_request(&self) -> Option<SpawnRequest> {
        let name = self.runner.name();
        let command = self.runner.config().command.as_ref()?;

        let argv = match command.resolve() {
            Ok(argv) => argv,
            Err(err) => {
                self.sink
                    .warn(&format!("could not resolve command for [{name}]: {err:#}"));
                return None;
            }
        };

        let Some((executable, args)) = argv.split_first().filter(|(exe, _)| !exe.is_empty())
        else {
            self.sink.warn(&format!("no executable given for [{name}]"));
            return None;
        };

        let program = resolve_executable(&self.options.env, executable);
        if program != *executable {
            debug!(runner = %name, executable = %executable, program = %program, "executable overridden from env");
        }

        Some(SpawnRequest {
            runner: name.to_string(),
            program,
            args: args.to_vec(),
            silent: self.options.silent,
            cwd: self.options.session.root.clone(),
        })
    }
}

fn report_exit(sink: &dyn DiagnosticSink, name: &str, result: anyhow::Result<ProcessOutcome>) {
    match result {
        Ok(ProcessOutcome::Success) => debug!(runner = %name, "ran successfully"),
        Ok(ProcessOutcome::Failed(code)) => {
            debug!(runner = %name, code, "failed");
            sink.warn(&format!("failed to run: [{name}] with code {code}"));
        }
        Err(err) => sink.warn(&format!("failed to run: [{name}]: {err:#}")),
    }
}
