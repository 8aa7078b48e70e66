// src/runner/matcher.rs

//! Decides whether a file event is relevant to a runner.
//!
//! Policy:
//! - patterns configured: at least one must match, and the condition (if
//!   any) must also pass;
//! - only a condition: the condition decides;
//! - neither: the runner never matches (it can only run at startup).

use tracing::debug;

use crate::runner::Runner;

/// Returns true if `runner` should react to a change of `file`.
///
/// `file` must already be normalised (see
/// [`crate::paths::normalize_file_path`]).
pub fn matches(runner: &Runner, file: &str) -> bool {
    let name = runner.name();
    let condition = runner.config().condition.as_ref();
    let has_patterns = runner.has_patterns();

    if condition.is_none() && !has_patterns {
        debug!(runner = %name, file, "no pattern or condition; only runs at startup");
        return false;
    }

    let condition_pass = condition.map(|c| c.check(file));
    if let Some(pass) = condition_pass {
        debug!(
            runner = %name,
            file,
            "condition {}",
            if pass { "passed" } else { "did not pass" }
        );
    }

    if !has_patterns {
        return condition_pass.unwrap_or(false);
    }

    let pattern_pass = runner.patterns().iter().any(|pattern| {
        let hit = pattern.is_match(file);
        if hit {
            debug!(runner = %name, file, pattern = %pattern.resolved(), "pattern matched");
        }
        hit
    });

    debug!(
        runner = %name,
        file,
        patterns = ?runner.patterns().iter().map(|p| p.resolved()).collect::<Vec<_>>(),
        "patterns {}",
        if pattern_pass { "passed" } else { "did not pass" }
    );

    pattern_pass && condition_pass.unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::ConsoleSink;
    use crate::runner::{RunnerConfig, Session};

    fn resolve(cfg: RunnerConfig) -> Runner {
        Runner::resolve(cfg, &Session::serve("/proj", "development"), &ConsoleSink)
    }

    #[test]
    fn runner_without_trigger_never_matches() {
        let runner = resolve(RunnerConfig::new().run(["echo"]));
        assert!(!matches(&runner, "/proj/anything.ts"));
    }

    #[test]
    fn any_pattern_is_enough() {
        let runner = resolve(RunnerConfig::new().patterns(["*.css", "*.scss"]).run(["x"]));
        assert!(matches(&runner, "/proj/a.scss"));
        assert!(matches(&runner, "/proj/a.css"));
        assert!(!matches(&runner, "/proj/a.ts"));
    }

    #[test]
    fn condition_alone_decides_without_patterns() {
        let runner = resolve(RunnerConfig::new().condition(|f| f.ends_with(".env")));
        assert!(matches(&runner, "/proj/app.env"));
        assert!(!matches(&runner, "/proj/app.ts"));
    }

    // Policy decision: a configured condition gates pattern matches too.
    #[test]
    fn failing_condition_vetoes_pattern_match() {
        let runner = resolve(
            RunnerConfig::new()
                .pattern("src/**/*.ts")
                .condition(|f| !f.ends_with(".test.ts")),
        );
        assert!(matches(&runner, "/proj/src/a.ts"));
        assert!(!matches(&runner, "/proj/src/a.test.ts"));
    }

    #[test]
    fn passing_condition_does_not_bypass_patterns() {
        let runner = resolve(RunnerConfig::new().pattern("src/*.ts").condition(|_| true));
        assert!(!matches(&runner, "/proj/lib/a.ts"));
    }

    #[test]
    fn only_invalid_patterns_means_no_match() {
        let runner = resolve(RunnerConfig::new().pattern("[oops").condition(|_| true));
        assert!(!matches(&runner, "/proj/[oops"));
    }
}
