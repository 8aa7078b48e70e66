#![allow(dead_code)]

use std::path::{Path, PathBuf};

pub use watchrun_test_utils::{init_tracing, with_timeout, HarnessBuilder};

/// Write a `Watchrun.toml` with `contents` into `dir`, returning its path.
pub fn write_config(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("Watchrun.toml");
    std::fs::write(&path, contents).expect("write config");
    path
}

/// Path of the config shipped in `demos/`.
pub fn demo_config() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/Watchrun.toml")
}
