use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use watchrun::exec::{ExitCallback, ProcessOutcome, ProcessSpawner, SpawnRequest};

/// A fake spawner that:
/// - records every spawn request instead of starting a process
/// - immediately reports the configured outcome (success by default).
#[derive(Debug, Clone, Default)]
pub struct FakeSpawner {
    spawned: Arc<Mutex<Vec<SpawnRequest>>>,
    outcomes: Arc<Mutex<HashMap<String, ProcessOutcome>>>,
}

impl FakeSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every spawn of `program` exit with `code`.
    pub fn fail_with(&self, program: &str, code: i32) {
        self.outcomes
            .lock()
            .unwrap()
            .insert(program.to_string(), ProcessOutcome::Failed(code));
    }

    pub fn spawned(&self) -> Vec<SpawnRequest> {
        self.spawned.lock().unwrap().clone()
    }

    /// `[program, args...]` of each spawn, in order.
    pub fn command_lines(&self) -> Vec<Vec<String>> {
        self.spawned()
            .into_iter()
            .map(|r| std::iter::once(r.program).chain(r.args).collect())
            .collect()
    }

    pub fn runners(&self) -> Vec<String> {
        self.spawned().into_iter().map(|r| r.runner).collect()
    }

    pub fn count(&self) -> usize {
        self.spawned.lock().unwrap().len()
    }
}

impl ProcessSpawner for FakeSpawner {
    fn spawn(&self, request: SpawnRequest, on_exit: ExitCallback) {
        tracing::debug!(runner = %request.runner, program = %request.program, "fake spawn");

        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .get(&request.program)
            .copied()
            .unwrap_or(ProcessOutcome::Success);

        self.spawned.lock().unwrap().push(request);
        on_exit(Ok(outcome));
    }
}
