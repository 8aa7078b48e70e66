// src/env/mod.rs

//! Environment snapshot used to resolve executable overrides.
//!
//! A snapshot has two layers:
//! - `process`: the variables of the `watchrun` process itself, captured
//!   once when the session starts.
//! - `mode`: variables loaded from the project's `.env` files for the
//!   current mode (see [`load_env`]).
//!
//! Lookups consult `process` first, so an exported variable always wins over
//! a value checked into a `.env` file.

pub mod dotenv;

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use tracing::debug;

use crate::fs::FileSystem;

pub use dotenv::parse_dotenv;

/// Read-only, two-layer environment snapshot.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    process: HashMap<String, String>,
    mode: HashMap<String, String>,
}

impl EnvSnapshot {
    pub fn new(process: HashMap<String, String>, mode: HashMap<String, String>) -> Self {
        Self { process, mode }
    }

    /// Capture the current process environment and pair it with `mode` vars.
    pub fn capture(mode: HashMap<String, String>) -> Self {
        Self::new(std::env::vars().collect(), mode)
    }

    /// Snapshot with only mode-file variables (no process layer).
    pub fn from_mode(mode: HashMap<String, String>) -> Self {
        Self::new(HashMap::new(), mode)
    }

    pub fn process_var(&self, key: &str) -> Option<&str> {
        non_empty(self.process.get(key))
    }

    pub fn mode_var(&self, key: &str) -> Option<&str> {
        non_empty(self.mode.get(key))
    }

    /// Number of variables loaded from `.env` files.
    pub fn mode_len(&self) -> usize {
        self.mode.len()
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}

/// Files read for `mode`, in increasing priority.
pub fn env_files_for_mode(mode: &str) -> [String; 4] {
    [
        ".env".to_string(),
        ".env.local".to_string(),
        format!(".env.{mode}"),
        format!(".env.{mode}.local"),
    ]
}

/// Load mode-specific variables from `root`.
///
/// Later files override earlier ones; missing files are skipped.
pub fn load_env(fs: &dyn FileSystem, root: &Path, mode: &str) -> Result<HashMap<String, String>> {
    let mut vars = HashMap::new();

    for name in env_files_for_mode(mode) {
        let path = root.join(&name);
        if !fs.is_file(&path) {
            continue;
        }

        let contents = fs.read_to_string(&path)?;
        let parsed = parse_dotenv(&contents);
        debug!(file = %name, count = parsed.len(), "loaded env file");
        vars.extend(parsed);
    }

    Ok(vars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    #[test]
    fn later_files_override_earlier_ones() {
        let fs = MockFileSystem::new();
        fs.add_file("/proj/.env", "TOOL_PATH=/usr/bin/tool\nSHARED=base\n");
        fs.add_file("/proj/.env.development", "SHARED=dev\n");
        fs.add_file("/proj/.env.production", "SHARED=prod\n");

        let vars = load_env(&fs, Path::new("/proj"), "development").unwrap();

        assert_eq!(vars.get("TOOL_PATH").map(String::as_str), Some("/usr/bin/tool"));
        assert_eq!(vars.get("SHARED").map(String::as_str), Some("dev"));
    }

    #[test]
    fn local_mode_file_has_highest_priority() {
        let fs = MockFileSystem::new();
        fs.add_file("/proj/.env.local", "KEY=local\n");
        fs.add_file("/proj/.env.test", "KEY=test\n");
        fs.add_file("/proj/.env.test.local", "KEY=test-local\n");

        let vars = load_env(&fs, Path::new("/proj"), "test").unwrap();
        assert_eq!(vars.get("KEY").map(String::as_str), Some("test-local"));
    }

    #[test]
    fn process_layer_wins_and_empty_values_are_ignored() {
        let env = EnvSnapshot::new(
            HashMap::from([("A".to_string(), "proc".to_string()), ("B".to_string(), String::new())]),
            HashMap::from([("A".to_string(), "file".to_string()), ("B".to_string(), "file".to_string())]),
        );

        assert_eq!(env.process_var("A"), Some("proc"));
        assert_eq!(env.process_var("B"), None);
        assert_eq!(env.mode_var("B"), Some("file"));
    }
}
