// src/config/validate.rs

use globset::Glob;
use regex::Regex;

use crate::config::model::{ConfigFile, RawConfigFile, RunnerSpec};
use crate::errors::{Result, WatchrunError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::WatchrunError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.runner.into_vec()))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_runners(cfg)?;
    validate_ignore_patterns(cfg)?;
    for (idx, runner) in cfg.runner.iter().enumerate() {
        validate_runner(idx, runner)?;
    }
    Ok(())
}

fn ensure_has_runners(cfg: &RawConfigFile) -> Result<()> {
    if cfg.runner.is_empty() {
        return Err(WatchrunError::ConfigError(
            "config must contain at least one [[runner]] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_ignore_patterns(cfg: &RawConfigFile) -> Result<()> {
    for pattern in &cfg.config.ignore {
        Glob::new(pattern).map_err(|source| WatchrunError::InvalidPattern {
            pattern: pattern.clone(),
            source,
        })?;
    }
    Ok(())
}

fn validate_runner(idx: usize, runner: &RunnerSpec) -> Result<()> {
    let label = runner_label(idx, runner);

    if let Some(condition) = &runner.condition {
        if condition.is_empty() {
            return Err(WatchrunError::ConfigError(format!(
                "{label}: `condition` must set at least one of `ends_with`, `contains`, `regex`"
            )));
        }
        if let Some(re) = &condition.regex {
            Regex::new(re).map_err(|e| {
                WatchrunError::ConfigError(format!("{label}: invalid condition regex: {e}"))
            })?;
        }
    }

    Ok(())
}

fn runner_label(idx: usize, runner: &RunnerSpec) -> String {
    match &runner.name {
        Some(name) => format!("runner '{name}'"),
        None => format!("runner #{}", idx + 1),
    }
}
