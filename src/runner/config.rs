// src/runner/config.rs

//! Programmatic runner description.
//!
//! A [`RunnerConfig`] pairs a trigger (patterns and/or a condition) with an
//! action (a command and/or a handler callback). Configs are built either
//! from the TOML file (see [`crate::config`]) or directly through the
//! chainable builder methods below:
//!
//! ```
//! use watchrun::runner::RunnerConfig;
//!
//! let css = RunnerConfig::new()
//!     .name("css")
//!     .pattern("src/**/*.css")
//!     .run(["build-css", "--minify"])
//!     .build(false);
//! assert_eq!(css.derive_name(), "css");
//! ```

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};

use crate::runner::Session;
use crate::types::FileEventKind;

/// Default settle delay before a scheduled command is spawned.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(50);

/// Default minimum spacing between two spawns of the same runner.
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(500);

/// Name used when neither an explicit name nor a command line is available.
pub const ANONYMOUS_RUNNER: &str = "<runner>";

/// Run user code, reporting a panic as an error.
pub fn catch_panic<T>(f: impl FnOnce() -> Result<T>) -> Result<T> {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        Err(anyhow!("panicked: {}", panic_message(payload.as_ref())))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}

/// Predicate over a normalised (forward-slash, absolute) file path.
#[derive(Clone)]
pub struct Condition(Arc<dyn Fn(&str) -> bool + Send + Sync>);

impl Condition {
    pub fn new(f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn check(&self, file: &str) -> bool {
        (self.0)(file)
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Condition(<fn>)")
    }
}

/// Payload handed to a runner's `on_file_changed` callback.
#[derive(Debug, Clone, Copy)]
pub struct RunnerHandlerEvent<'a> {
    /// Normalised path of the changed file.
    pub file: &'a str,
    pub kind: FileEventKind,
    /// The session the event belongs to.
    pub session: &'a Session,
}

/// Side-effecting callback invoked on a match, before the command runs.
#[derive(Clone)]
pub struct RunnerHandler(Arc<dyn Fn(&RunnerHandlerEvent<'_>) -> Result<()> + Send + Sync>);

impl RunnerHandler {
    pub fn new(f: impl Fn(&RunnerHandlerEvent<'_>) -> Result<()> + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Invoke the handler; a panic is reported as an error.
    pub fn call(&self, event: &RunnerHandlerEvent<'_>) -> Result<()> {
        catch_panic(|| (self.0)(event))
    }
}

impl fmt::Debug for RunnerHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RunnerHandler(<fn>)")
    }
}

/// Command to run: `[executable, args...]`, either fixed or computed each
/// time the runner actually executes.
#[derive(Clone)]
pub enum CommandSpec {
    Static(Vec<String>),
    Computed(Arc<dyn Fn() -> Result<Vec<String>> + Send + Sync>),
}

impl CommandSpec {
    pub fn computed(f: impl Fn() -> Result<Vec<String>> + Send + Sync + 'static) -> Self {
        CommandSpec::Computed(Arc::new(f))
    }

    /// Produce the current argument list. A panicking closure is reported
    /// as an error.
    pub fn resolve(&self) -> Result<Vec<String>> {
        match self {
            CommandSpec::Static(argv) => Ok(argv.clone()),
            CommandSpec::Computed(f) => catch_panic(|| f()),
        }
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandSpec::Static(argv) => f.debug_tuple("Static").field(argv).finish(),
            CommandSpec::Computed(_) => f.write_str("Computed(<fn>)"),
        }
    }
}

/// One runner as configured by the user.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Display name; also the throttle key once lowercased.
    pub name: Option<String>,
    /// Run when the session starts. `None` behaves like `Some(true)`.
    pub startup: Option<bool>,
    /// Whether startup execution also happens in build mode.
    pub run_at_build: bool,
    pub condition: Option<Condition>,
    /// Globs, relative to the session root unless absolute.
    pub patterns: Vec<String>,
    pub on_file_changed: Option<RunnerHandler>,
    pub command: Option<CommandSpec>,
    pub delay: Duration,
    pub throttle: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            name: None,
            startup: None,
            run_at_build: true,
            condition: None,
            patterns: Vec::new(),
            on_file_changed: None,
            command: None,
            delay: DEFAULT_DELAY,
            throttle: DEFAULT_THROTTLE,
        }
    }
}

impl RunnerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn startup(mut self, startup: bool) -> Self {
        self.startup = Some(startup);
        self
    }

    /// Whether to run at startup when building (`build = false` opts out).
    pub fn build(mut self, run_at_build: bool) -> Self {
        self.run_at_build = run_at_build;
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    pub fn patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patterns.extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn condition(mut self, f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.condition = Some(Condition::new(f));
        self
    }

    pub fn on_file_changed(
        mut self,
        f: impl Fn(&RunnerHandlerEvent<'_>) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.on_file_changed = Some(RunnerHandler::new(f));
        self
    }

    pub fn run<I, S>(mut self, argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command = Some(CommandSpec::Static(argv.into_iter().map(Into::into).collect()));
        self
    }

    /// Compute the argument list each time the runner executes.
    pub fn run_with(mut self, f: impl Fn() -> Result<Vec<String>> + Send + Sync + 'static) -> Self {
        self.command = Some(CommandSpec::computed(f));
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn delay_ms(self, ms: u64) -> Self {
        self.delay(Duration::from_millis(ms))
    }

    pub fn throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn throttle_ms(self, ms: u64) -> Self {
        self.throttle(Duration::from_millis(ms))
    }

    /// Whether this runner executes when the session starts.
    pub fn runs_at_startup(&self) -> bool {
        self.startup != Some(false)
    }

    /// Whether this runner can ever react to file events.
    pub fn has_trigger(&self) -> bool {
        self.condition.is_some() || self.patterns.iter().any(|p| !p.is_empty())
    }

    /// Identity used for display and throttling.
    ///
    /// Lowercased explicit name, else the lowercased command line, else
    /// [`ANONYMOUS_RUNNER`]. A computed command is invoked once here; a
    /// failing or empty one yields the anonymous name.
    pub fn derive_name(&self) -> String {
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            return name.to_lowercase();
        }

        let line = self
            .command
            .as_ref()
            .and_then(|cmd| cmd.resolve().ok())
            .map(|argv| argv.join(" ").trim().to_lowercase())
            .unwrap_or_default();

        if line.is_empty() {
            ANONYMOUS_RUNNER.to_string()
        } else {
            line
        }
    }
}
