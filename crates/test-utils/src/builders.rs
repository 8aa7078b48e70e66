use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use watchrun::engine::DispatchEngine;
use watchrun::env::EnvSnapshot;
use watchrun::runner::{ResolvedOptions, RunOptions, RunnerConfig, Session};

use crate::{FakeSpawner, ManualTimers, RecordingSink};

/// Root used by harness sessions unless overridden.
pub const TEST_ROOT: &str = "/proj";

/// A dispatch engine wired to fakes: manual clock, recording spawner and
/// recording diagnostic sink.
#[derive(Debug)]
pub struct Harness {
    pub engine: DispatchEngine,
    pub timers: ManualTimers,
    pub spawner: FakeSpawner,
    pub sink: RecordingSink,
}

impl Harness {
    /// Absolute path under the session root.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.engine.options().session.root.join(rel)
    }
}

/// Builder for [`Harness`] to simplify test setup.
pub struct HarnessBuilder {
    runners: Vec<RunnerConfig>,
    session: Session,
    silent: bool,
    skip_dts: bool,
    process_env: HashMap<String, String>,
    mode_env: HashMap<String, String>,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        Self {
            runners: Vec::new(),
            session: Session::serve(TEST_ROOT, "development"),
            silent: true,
            skip_dts: true,
            process_env: HashMap::new(),
            mode_env: HashMap::new(),
        }
    }

    pub fn runner(mut self, runner: RunnerConfig) -> Self {
        self.runners.push(runner);
        self
    }

    pub fn build_mode(mut self) -> Self {
        self.session.build = true;
        self
    }

    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.session.root = root.into();
        self
    }

    pub fn skip_dts(mut self, val: bool) -> Self {
        self.skip_dts = val;
        self
    }

    pub fn silent(mut self, val: bool) -> Self {
        self.silent = val;
        self
    }

    pub fn process_env(mut self, key: &str, value: &str) -> Self {
        self.process_env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn mode_env(mut self, key: &str, value: &str) -> Self {
        self.mode_env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn build(self) -> Harness {
        let timers = ManualTimers::new();
        let spawner = FakeSpawner::new();
        let sink = RecordingSink::new();

        let options = ResolvedOptions::resolve(
            RunOptions::new(self.runners)
                .silent(self.silent)
                .skip_dts(self.skip_dts),
            self.session,
            EnvSnapshot::new(self.process_env, self.mode_env),
            &sink,
        );

        let engine = DispatchEngine::new(
            Arc::new(options),
            Arc::new(timers.clone()),
            Arc::new(spawner.clone()),
            Arc::new(sink.clone()),
        );

        Harness {
            engine,
            timers,
            spawner,
            sink,
        }
    }
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self::new()
    }
}
