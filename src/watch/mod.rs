// src/watch/mod.rs

//! File watching.
//!
//! Wires up a cross-platform filesystem watcher (`notify`) and turns its
//! events into [`crate::engine::FileEvent`]s. It does not know about
//! runners; matching happens in the dispatch engine.

pub mod filter;
pub mod watcher;

pub use filter::IgnoreFilter;
pub use watcher::{classify, spawn_watcher, translate, WatcherHandle};
