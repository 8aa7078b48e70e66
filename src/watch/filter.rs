// src/watch/filter.rs

use std::fmt;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Compiled `ignore` globs, matched against root-relative paths.
#[derive(Clone)]
pub struct IgnoreFilter {
    set: GlobSet,
    patterns: Vec<String>,
}

impl fmt::Debug for IgnoreFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IgnoreFilter")
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl IgnoreFilter {
    pub fn new(patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pat in patterns {
            let glob = Glob::new(pat).with_context(|| format!("invalid ignore pattern: {pat}"))?;
            builder.add(glob);
        }

        Ok(Self {
            set: builder.build()?,
            patterns: patterns.to_vec(),
        })
    }

    /// Returns true if `rel_path` (relative to the root, forward slashes)
    /// should never reach the dispatch engine.
    pub fn is_ignored(&self, rel_path: &str) -> bool {
        self.set.is_match(rel_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::default_ignore;

    #[test]
    fn default_ignores_cover_vcs_and_build_dirs() {
        let filter = IgnoreFilter::new(&default_ignore()).unwrap();
        assert!(filter.is_ignored(".git/index"));
        assert!(filter.is_ignored("web/node_modules/pkg/index.js"));
        assert!(filter.is_ignored("target/debug/build.log"));
        assert!(!filter.is_ignored("src/main.rs"));
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        assert!(IgnoreFilter::new(&["[broken".to_string()]).is_err());
    }
}
