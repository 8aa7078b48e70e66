// src/engine/mod.rs

//! Orchestration engine for watchrun.
//!
//! - [`dispatch`] holds the synchronous dispatch engine: startup execution
//!   and per-event runner matching.
//! - [`runtime`] is the async shell that feeds watcher events and shutdown
//!   requests into the dispatch engine.

use std::path::PathBuf;

use crate::types::FileEventKind;

/// A file changed, appeared or disappeared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    pub path: PathBuf,
    pub kind: FileEventKind,
}

impl FileEvent {
    pub fn new(path: impl Into<PathBuf>, kind: FileEventKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn add(path: impl Into<PathBuf>) -> Self {
        Self::new(path, FileEventKind::Add)
    }

    pub fn change(path: impl Into<PathBuf>) -> Self {
        Self::new(path, FileEventKind::Change)
    }

    pub fn unlink(path: impl Into<PathBuf>) -> Self {
        Self::new(path, FileEventKind::Unlink)
    }
}

/// What the host should do with its own default handling of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotUpdate {
    /// Proceed as usual.
    Continue,
    /// Skip default handling (declaration-file events with `skip_dts`).
    Suppress,
}

/// Events flowing into the runtime from the watcher and signal handlers.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    FileChanged(FileEvent),
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod dispatch;
pub mod runtime;

pub use dispatch::{DispatchEngine, DECLARATION_SUFFIX};
pub use runtime::Runtime;
