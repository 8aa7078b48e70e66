// src/runner/registry.rs

//! Session-wide runner registry.
//!
//! [`ResolvedOptions`] is built once when a session starts and is read-only
//! afterwards. Resolution:
//! - derives each runner's name (its throttle identity),
//! - resolves its patterns against the session root and compiles them.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use globset::{GlobBuilder, GlobMatcher};
use tracing::debug;

use crate::diagnostics::DiagnosticSink;
use crate::env::EnvSnapshot;
use crate::errors::{Result, WatchrunError};
use crate::paths::{
    is_absolute_str, join_str, pop_components, root_str, split_parent_segments,
    to_forward_slashes,
};
use crate::runner::RunnerConfig;

/// Facts about the host session handed to runners and handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Root directory relative patterns and paths are resolved against.
    pub root: PathBuf,
    /// Env mode (`development`, `production`, ...).
    pub mode: String,
    /// One-shot build instead of a long-lived watch session.
    pub build: bool,
}

impl Session {
    pub fn serve(root: impl Into<PathBuf>, mode: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            mode: mode.into(),
            build: false,
        }
    }

    pub fn build(root: impl Into<PathBuf>, mode: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            mode: mode.into(),
            build: true,
        }
    }
}

/// User-level options before resolution.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input: Vec<RunnerConfig>,
    /// Hide the output of commands.
    pub silent: bool,
    /// Ignore change events for `.d.ts` files.
    pub skip_dts: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            input: Vec::new(),
            silent: true,
            skip_dts: true,
        }
    }
}

impl RunOptions {
    pub fn new(input: Vec<RunnerConfig>) -> Self {
        Self {
            input,
            ..Self::default()
        }
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub fn skip_dts(mut self, skip_dts: bool) -> Self {
        self.skip_dts = skip_dts;
        self
    }
}

impl From<RunnerConfig> for RunOptions {
    fn from(runner: RunnerConfig) -> Self {
        Self::new(vec![runner])
    }
}

impl From<Vec<RunnerConfig>> for RunOptions {
    fn from(runners: Vec<RunnerConfig>) -> Self {
        Self::new(runners)
    }
}

/// A glob resolved against the session root.
#[derive(Clone)]
pub struct CompiledPattern {
    resolved: String,
    matcher: GlobMatcher,
}

impl CompiledPattern {
    /// Resolve `pattern` against `root` and compile it.
    ///
    /// `*` and `?` never match `/`; `**` spans directories.
    pub fn compile(root: &str, pattern: &str) -> Result<Self> {
        let resolved = resolve_pattern(root, pattern);
        let glob = GlobBuilder::new(&resolved)
            .literal_separator(true)
            .build()
            .map_err(|source| WatchrunError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;

        Ok(Self {
            resolved,
            matcher: glob.compile_matcher(),
        })
    }

    /// The absolute glob this pattern resolved to.
    pub fn resolved(&self) -> &str {
        &self.resolved
    }

    pub fn is_match(&self, file: &str) -> bool {
        self.matcher.is_match(file)
    }
}

impl fmt::Debug for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CompiledPattern").field(&self.resolved).finish()
    }
}

/// Resolve a (possibly relative) glob against a forward-slash root.
///
/// Only the root part is escaped; the pattern keeps its glob syntax.
fn resolve_pattern(root: &str, pattern: &str) -> String {
    let pattern = to_forward_slashes(pattern);
    if is_absolute_str(&pattern) {
        return pattern;
    }

    let (ups, rest) = split_parent_segments(&pattern);
    join_str(&escape_glob(&pop_components(root, ups)), &rest)
}

/// Escape glob metacharacters so they match literally.
fn escape_glob(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '*' | '?' | '[' | ']' | '{' | '}' => {
                out.push('[');
                out.push(c);
                out.push(']');
            }
            _ => out.push(c),
        }
    }
    out
}

/// A resolved runner: its config plus derived identity and compiled globs.
#[derive(Debug, Clone)]
pub struct Runner {
    name: String,
    config: RunnerConfig,
    patterns: Vec<CompiledPattern>,
}

impl Runner {
    /// Resolve one runner against the session root.
    ///
    /// Invalid patterns are reported to `sink` and left out; the runner
    /// still counts as pattern-constrained, so it never matches through
    /// them.
    pub fn resolve(config: RunnerConfig, session: &Session, sink: &dyn DiagnosticSink) -> Self {
        let name = config.derive_name();
        let root = root_str(&session.root);

        let mut patterns = Vec::new();
        for pattern in config.patterns.iter().filter(|p| !p.is_empty()) {
            match CompiledPattern::compile(&root, pattern) {
                Ok(compiled) => patterns.push(compiled),
                Err(err) => sink.warn(&format!("runner [{name}] ignores pattern: {err}")),
            }
        }

        Self {
            name,
            config,
            patterns,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    /// Whether the runner was configured with at least one non-empty
    /// pattern, whether or not it compiled.
    pub fn has_patterns(&self) -> bool {
        self.config.patterns.iter().any(|p| !p.is_empty())
    }
}

/// The resolved, read-only state of one session.
#[derive(Debug, Clone)]
pub struct ResolvedOptions {
    pub runners: Vec<Arc<Runner>>,
    pub silent: bool,
    pub skip_dts: bool,
    pub env: EnvSnapshot,
    pub session: Session,
}

impl ResolvedOptions {
    pub fn resolve(
        options: RunOptions,
        session: Session,
        env: EnvSnapshot,
        sink: &dyn DiagnosticSink,
    ) -> Self {
        let runners: Vec<Arc<Runner>> = options
            .input
            .into_iter()
            .map(|cfg| Arc::new(Runner::resolve(cfg, &session, sink)))
            .collect();

        debug!(
            runners = ?runners.iter().map(|r| r.name()).collect::<Vec<_>>(),
            silent = options.silent,
            skip_dts = options.skip_dts,
            build = session.build,
            mode = %session.mode,
            root = ?session.root,
            env = "<hidden>",
            "resolved options"
        );

        Self {
            runners,
            silent: options.silent,
            skip_dts: options.skip_dts,
            env,
            session,
        }
    }

    pub fn build_mode(&self) -> bool {
        self.session.build
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::ConsoleSink;

    #[test]
    fn relative_patterns_resolve_against_root() {
        assert_eq!(resolve_pattern("/proj", "src/**/*.ts"), "/proj/src/**/*.ts");
        assert_eq!(resolve_pattern("/proj", "./*.css"), "/proj/*.css");
        assert_eq!(resolve_pattern("/proj/app", "../shared/*.ts"), "/proj/shared/*.ts");
        assert_eq!(resolve_pattern("/proj", "/abs/**"), "/abs/**");
    }

    #[test]
    fn root_metacharacters_are_escaped() {
        assert_eq!(resolve_pattern("/w/[x]", "*.rs"), "/w/[[]x[]]/*.rs");
        let compiled = CompiledPattern::compile("/w/a*b", "*.rs").unwrap();
        assert!(compiled.is_match("/w/a*b/main.rs"));
        assert!(!compiled.is_match("/w/aXb/main.rs"));
    }

    #[test]
    fn star_does_not_cross_directories() {
        let compiled = CompiledPattern::compile("/proj", "*.css").unwrap();
        assert!(compiled.is_match("/proj/styles.css"));
        assert!(!compiled.is_match("/proj/nested/styles.css"));

        let deep = CompiledPattern::compile("/proj", "**/*.css").unwrap();
        assert!(deep.is_match("/proj/nested/styles.css"));
    }

    #[test]
    fn invalid_patterns_are_dropped_but_still_constrain() {
        let session = Session::serve("/proj", "development");
        let runner = Runner::resolve(
            RunnerConfig::new().pattern("src/[unclosed").run(["x"]),
            &session,
            &ConsoleSink,
        );

        assert!(runner.patterns().is_empty());
        assert!(runner.has_patterns());
    }
}
