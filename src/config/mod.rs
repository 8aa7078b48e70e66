// src/config/mod.rs

//! Configuration loading and validation for watchrun.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file and map it onto runner configs (`loader.rs`).
//! - Validate runners, conditions and ignore globs (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_and_validate_with, load_from_path};
pub use model::{ConditionSpec, ConfigFile, ConfigSection, OneOrMany, RawConfigFile, RunnerSpec};
