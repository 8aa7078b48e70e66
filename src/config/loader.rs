// src/config/loader.rs

use std::path::Path;
use std::time::Duration;

use regex::Regex;

use crate::config::model::{ConditionSpec, ConfigFile, RawConfigFile, RunnerSpec};
use crate::errors::{Result, WatchrunError};
use crate::fs::{FileSystem, RealFileSystem};
use crate::runner::{RunOptions, RunnerConfig, DEFAULT_DELAY, DEFAULT_THROTTLE};

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let contents = fs.read_to_string(path.as_ref())?;
    let config: RawConfigFile = toml::from_str(&contents)?;
    Ok(config)
}

/// Load a configuration file from disk and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    load_and_validate_with(&RealFileSystem, path)
}

pub fn load_and_validate_with(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(fs, &path)?;
    ConfigFile::try_from(raw_config)
}

impl ConfigFile {
    /// Turn the file's runners into programmatic [`RunOptions`].
    pub fn run_options(&self) -> Result<RunOptions> {
        let input = self
            .runners
            .iter()
            .map(runner_config)
            .collect::<Result<Vec<_>>>()?;

        Ok(RunOptions::new(input)
            .silent(self.config.silent)
            .skip_dts(self.config.skip_dts))
    }
}

fn runner_config(spec: &RunnerSpec) -> Result<RunnerConfig> {
    let mut cfg = RunnerConfig {
        name: spec.name.clone(),
        startup: spec.startup,
        run_at_build: spec.build.unwrap_or(true),
        patterns: spec
            .pattern
            .clone()
            .map(|p| p.into_vec())
            .unwrap_or_default(),
        delay: spec.delay.map(Duration::from_millis).unwrap_or(DEFAULT_DELAY),
        throttle: spec.throttle.map(Duration::from_millis).unwrap_or(DEFAULT_THROTTLE),
        ..RunnerConfig::default()
    };

    if let Some(run) = &spec.run {
        cfg = cfg.run(run.iter().cloned());
    }

    if let Some(condition) = &spec.condition {
        cfg = with_condition(cfg, condition)?;
    }

    Ok(cfg)
}

fn with_condition(cfg: RunnerConfig, spec: &ConditionSpec) -> Result<RunnerConfig> {
    let regex = spec
        .regex
        .as_deref()
        .map(Regex::new)
        .transpose()
        .map_err(|e| WatchrunError::ConfigError(format!("invalid condition regex: {e}")))?;
    let ends_with = spec.ends_with.clone();
    let contains = spec.contains.clone();

    Ok(cfg.condition(move |file| {
        ends_with.as_deref().is_none_or(|s| file.ends_with(s))
            && contains.as_deref().is_none_or(|s| file.contains(s))
            && regex.as_ref().is_none_or(|re| re.is_match(file))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use crate::runner::CommandSpec;

    fn load(contents: &str) -> Result<ConfigFile> {
        let fs = MockFileSystem::new();
        fs.add_file("/proj/Watchrun.toml", contents);
        load_and_validate_with(&fs, "/proj/Watchrun.toml")
    }

    #[test]
    fn single_runner_table_and_single_pattern_are_accepted() {
        let cfg = load(
            r#"
[runner]
pattern = "*.css"
run = ["build-css"]
"#,
        )
        .unwrap();

        assert_eq!(cfg.runners.len(), 1);
        let options = cfg.run_options().unwrap();
        let runner = &options.input[0];
        assert_eq!(runner.patterns, vec!["*.css".to_string()]);
        assert_eq!(runner.delay, DEFAULT_DELAY);
        assert_eq!(runner.throttle, DEFAULT_THROTTLE);
        assert!(matches!(&runner.command, Some(CommandSpec::Static(argv)) if argv == &["build-css"]));
        assert!(options.silent);
        assert!(options.skip_dts);
    }

    #[test]
    fn condition_table_combines_checks() {
        let cfg = load(
            r#"
[[runner]]
condition = { ends_with = ".env", contains = "/config/" }
run = ["reload"]
"#,
        )
        .unwrap();

        let options = cfg.run_options().unwrap();
        let condition = options.input[0].condition.as_ref().unwrap();
        assert!(condition.check("/proj/config/app.env"));
        assert!(!condition.check("/proj/app.env"));
        assert!(!condition.check("/proj/config/app.ts"));
    }

    #[test]
    fn empty_condition_is_rejected() {
        let err = load("[[runner]]\ncondition = {}\nrun = [\"x\"]\n").unwrap_err();
        assert!(matches!(err, WatchrunError::ConfigError(msg) if msg.contains("condition")));
    }

    #[test]
    fn missing_runners_is_rejected() {
        let err = load("[config]\nsilent = false\n").unwrap_err();
        assert!(matches!(err, WatchrunError::ConfigError(msg) if msg.contains("at least one")));
    }

    #[test]
    fn invalid_toml_surfaces_as_toml_error() {
        let err = load("[[runner]\n").unwrap_err();
        assert!(matches!(err, WatchrunError::TomlError(_)));
    }
}
