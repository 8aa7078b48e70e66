// tests/executable_override.rs

mod common;
use crate::common::HarnessBuilder;

use watchrun::runner::RunnerConfig;

fn php_lint() -> RunnerConfig {
    RunnerConfig::new().name("php").run(["php", "-l", "index.php"])
}

#[test]
fn literal_executable_is_used_without_override() {
    let h = HarnessBuilder::new().runner(php_lint()).build();

    h.engine.on_startup();
    h.timers.advance_ms(100);

    assert_eq!(
        h.spawner.command_lines(),
        vec![vec!["php".to_string(), "-l".to_string(), "index.php".to_string()]]
    );
}

#[test]
fn mode_env_file_overrides_executable() {
    let h = HarnessBuilder::new()
        .mode_env("PHP_PATH", "/opt/php8/bin/php")
        .runner(php_lint())
        .build();

    h.engine.on_startup();
    h.timers.advance_ms(100);

    let request = &h.spawner.spawned()[0];
    assert_eq!(request.program, "/opt/php8/bin/php");
    assert_eq!(request.args, vec!["-l".to_string(), "index.php".to_string()]);
}

#[test]
fn process_env_wins_over_mode_env() {
    let h = HarnessBuilder::new()
        .process_env("php_PATH", "/usr/local/bin/php")
        .mode_env("php_PATH", "/opt/php8/bin/php")
        .runner(php_lint())
        .build();

    h.engine.on_startup();
    h.timers.advance_ms(100);

    assert_eq!(h.spawner.spawned()[0].program, "/usr/local/bin/php");
}

#[test]
fn empty_override_value_is_ignored() {
    let h = HarnessBuilder::new()
        .process_env("PHP_PATH", "")
        .mode_env("PHP_PATH", "/opt/php8/bin/php")
        .runner(php_lint())
        .build();

    h.engine.on_startup();
    h.timers.advance_ms(100);

    assert_eq!(h.spawner.spawned()[0].program, "/opt/php8/bin/php");
}

#[test]
fn dashed_executables_use_underscored_key() {
    let h = HarnessBuilder::new()
        .mode_env("BUILD_CSS_PATH", "./node_modules/.bin/build-css")
        .runner(RunnerConfig::new().run(["build-css"]))
        .build();

    h.engine.on_startup();
    h.timers.advance_ms(100);

    let request = &h.spawner.spawned()[0];
    assert_eq!(request.program, "./node_modules/.bin/build-css");
    assert_eq!(request.runner, "build-css");
}
