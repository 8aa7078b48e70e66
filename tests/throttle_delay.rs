// tests/throttle_delay.rs

mod common;
use crate::common::{init_tracing, HarnessBuilder};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use watchrun::engine::FileEvent;
use watchrun::exec::ExecuteOutcome;
use watchrun::runner::RunnerConfig;
use watchrun::types::Trigger;

/// Computed command that counts how often it was evaluated and embeds the
/// count in its argument list.
fn counting_command(counter: &Arc<AtomicUsize>) -> RunnerConfig {
    let counter = Arc::clone(counter);
    RunnerConfig::new().run_with(move || {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(vec!["echo".to_string(), n.to_string()])
    })
}

#[test]
fn rapid_second_invocation_is_dropped_and_argv_computed_only_when_scheduled() {
    init_tracing();

    let evaluations = Arc::new(AtomicUsize::new(0));
    let h = HarnessBuilder::new()
        .runner(counting_command(&evaluations).name("stamp").pattern("*.txt").startup(false))
        .build();
    let runner = Arc::clone(&h.engine.options().runners[0]);

    let first = h.engine.executor().execute(&runner, Trigger::FileChange);
    h.timers.advance_ms(100);
    let second = h.engine.executor().execute(&runner, Trigger::FileChange);
    h.timers.advance_ms(100);

    assert_eq!(first, ExecuteOutcome::Scheduled);
    assert_eq!(second, ExecuteOutcome::Throttled);
    assert_eq!(evaluations.load(Ordering::SeqCst), 1);
    assert_eq!(
        h.spawner.command_lines(),
        vec![vec!["echo".to_string(), "1".to_string()]]
    );

    // Window is over after 500ms; the next invocation recomputes argv.
    h.timers.advance_ms(300);
    h.engine.on_file_event(&FileEvent::change("notes.txt"));
    h.timers.advance_ms(50);
    assert_eq!(
        h.spawner.command_lines().last().cloned(),
        Some(vec!["echo".to_string(), "2".to_string()])
    );
}

#[test]
fn unnamed_computed_command_is_evaluated_once_for_its_name() {
    let evaluations = Arc::new(AtomicUsize::new(0));
    let h = HarnessBuilder::new()
        .runner(counting_command(&evaluations).startup(false))
        .build();

    assert_eq!(h.engine.options().runners[0].name(), "echo 1");
    assert_eq!(evaluations.load(Ordering::SeqCst), 1);
}

#[test]
fn throttle_is_keyed_by_lowercased_name() {
    let h = HarnessBuilder::new()
        .runner(RunnerConfig::new().name("Build").startup(false).pattern("a/*").run(["one"]))
        .runner(RunnerConfig::new().name("build").startup(false).pattern("b/*").run(["two"]))
        .build();

    h.engine.on_file_event(&FileEvent::change("a/x"));
    h.engine.on_file_event(&FileEvent::change("b/x"));
    h.timers.advance_ms(100);

    assert_eq!(h.spawner.command_lines(), vec![vec!["one".to_string()]]);
    assert!(h.engine.executor().throttles().contains("build"));
}

#[test]
fn custom_delay_and_throttle_are_honoured() {
    let h = HarnessBuilder::new()
        .runner(
            RunnerConfig::new()
                .name("slow")
                .startup(false)
                .pattern("*.log")
                .delay_ms(200)
                .throttle_ms(1_000)
                .run(["tail"]),
        )
        .build();

    h.engine.on_file_event(&FileEvent::change("a.log"));
    h.timers.advance_ms(199);
    assert_eq!(h.spawner.count(), 0);
    h.timers.advance_ms(1);
    assert_eq!(h.spawner.count(), 1);

    h.timers.advance_ms(700);
    h.engine.on_file_event(&FileEvent::change("a.log"));
    h.timers.advance_ms(300);
    assert_eq!(h.spawner.count(), 1, "still inside the 1s window at 900ms");

    h.engine.on_file_event(&FileEvent::change("a.log"));
    h.timers.advance_ms(200);
    assert_eq!(h.spawner.count(), 2);
}

#[test]
fn empty_argv_emits_one_diagnostic_and_spawns_nothing() {
    init_tracing();

    let h = HarnessBuilder::new()
        .runner(RunnerConfig::new().name("empty").run_with(|| Ok(Vec::new())))
        .build();

    assert_eq!(h.engine.on_startup(), 1);
    h.timers.advance_ms(100);

    assert_eq!(h.spawner.count(), 0);
    assert_eq!(h.sink.messages(), vec!["no executable given for [empty]".to_string()]);
    assert_eq!(h.engine.executor().in_flight().count(), 0);
}

#[test]
fn failing_computed_command_is_reported_not_raised() {
    let h = HarnessBuilder::new()
        .runner(
            RunnerConfig::new()
                .name("flaky")
                .run_with(|| anyhow::bail!("no git repo")),
        )
        .build();

    h.engine.on_startup();
    h.timers.advance_ms(100);

    assert_eq!(h.spawner.count(), 0);
    assert_eq!(
        h.sink.messages(),
        vec!["could not resolve command for [flaky]: no git repo".to_string()]
    );
}

#[test]
fn panicking_computed_command_is_reported_and_released() {
    let h = HarnessBuilder::new()
        .build_mode()
        .runner(RunnerConfig::new().name("explodes").run_with(|| panic!("boom")))
        .runner(RunnerConfig::new().name("fine").run(["make"]))
        .build();

    assert_eq!(h.engine.on_startup(), 2);
    h.timers.advance_ms(100);

    assert_eq!(h.spawner.runners(), vec!["fine".to_string()]);
    assert_eq!(
        h.sink.messages(),
        vec!["could not resolve command for [explodes]: panicked: boom".to_string()]
    );
    assert_eq!(h.engine.executor().in_flight().count(), 0);
}

#[test]
fn non_zero_exit_produces_a_warning() {
    let h = HarnessBuilder::new()
        .runner(RunnerConfig::new().name("lint").run(["eslint", "."]))
        .build();
    h.spawner.fail_with("eslint", 2);

    h.engine.on_startup();
    h.timers.advance_ms(100);

    assert_eq!(h.spawner.count(), 1);
    assert_eq!(h.sink.messages(), vec!["failed to run: [lint] with code 2".to_string()]);
}

#[test]
fn silent_flag_reaches_the_spawn_request() {
    let h = HarnessBuilder::new()
        .silent(false)
        .runner(RunnerConfig::new().name("verbose").run(["make"]))
        .build();

    h.engine.on_startup();
    h.timers.advance_ms(100);

    assert!(!h.spawner.spawned()[0].silent);
}
