// src/config/model.rs

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// silent = false
/// skip_dts = true
///
/// [[runner]]
/// name = "css"
/// pattern = "src/**/*.css"
/// run = ["build-css"]
/// ```
///
/// A single runner may also be written as a plain `[runner]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// Global options from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// Runners from `[[runner]]` (or a single `[runner]`), in file order.
    #[serde(default)]
    pub runner: OneOrMany<RunnerSpec>,
}

/// Validated configuration. Only obtainable through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub runners: Vec<RunnerSpec>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(config: ConfigSection, runners: Vec<RunnerSpec>) -> Self {
        Self { config, runners }
    }
}

/// Either a single value or a list of values.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(v) => vec![v],
            OneOrMany::Many(vs) => vs,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            OneOrMany::One(_) => 1,
            OneOrMany::Many(vs) => vs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            OneOrMany::One(v) => std::slice::from_ref(v).iter(),
            OneOrMany::Many(vs) => vs.iter(),
        }
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Hide the output of commands (default `true`).
    #[serde(default = "default_true")]
    pub silent: bool,

    /// Ignore change events for `.d.ts` files (default `true`).
    #[serde(default = "default_true")]
    pub skip_dts: bool,

    /// Globs, relative to the project root, whose changes are never
    /// reported by the watcher.
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,
}

fn default_true() -> bool {
    true
}

pub fn default_ignore() -> Vec<String> {
    ["**/.git/**", "**/node_modules/**", "**/target/**"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            silent: true,
            skip_dts: true,
            ignore: default_ignore(),
        }
    }
}

/// One `[[runner]]` entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunnerSpec {
    /// Display name; derived from `run` when absent.
    #[serde(default)]
    pub name: Option<String>,

    /// Run when starting (default `true`).
    #[serde(default)]
    pub startup: Option<bool>,

    /// Run at startup in build mode too (default `true`).
    #[serde(default)]
    pub build: Option<bool>,

    /// Checks on the changed file's normalised path.
    #[serde(default)]
    pub condition: Option<ConditionSpec>,

    /// Glob or list of globs the changed file must match.
    #[serde(default)]
    pub pattern: Option<OneOrMany<String>>,

    /// `[executable, args...]`.
    #[serde(default)]
    pub run: Option<Vec<String>>,

    /// Delay in milliseconds before the command is spawned.
    #[serde(default)]
    pub delay: Option<u64>,

    /// Minimum milliseconds between two spawns of this runner.
    #[serde(default)]
    pub throttle: Option<u64>,
}

/// Declarative condition: every check that is set must pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConditionSpec {
    #[serde(default)]
    pub ends_with: Option<String>,

    #[serde(default)]
    pub contains: Option<String>,

    /// Regular expression searched in the path.
    #[serde(default)]
    pub regex: Option<String>,
}

impl ConditionSpec {
    pub fn is_empty(&self) -> bool {
        self.ends_with.is_none() && self.contains.is_none() && self.regex.is_none()
    }
}
