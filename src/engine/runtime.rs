// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info};

use super::{DispatchEngine, HotUpdate, RuntimeEvent};

/// Drives the dispatch engine in response to `RuntimeEvent`s.
///
/// This is a thin IO shell around [`DispatchEngine`], which holds all the
/// dispatch semantics. The shell only reads events from a channel.
pub struct Runtime {
    engine: DispatchEngine,
    event_rx: mpsc::Receiver<RuntimeEvent>,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

impl Runtime {
    pub fn new(engine: DispatchEngine, event_rx: mpsc::Receiver<RuntimeEvent>) -> Self {
        Self { engine, event_rx }
    }

    /// Main event loop.
    ///
    /// Returns when a shutdown is requested or every sender is dropped.
    /// Processes that are still running are left alone.
    pub async fn run(mut self) -> DispatchEngine {
        info!("watchrun runtime started");

        while let Some(event) = self.event_rx.recv().await {
            match event {
                RuntimeEvent::FileChanged(file_event) => {
                    debug!(?file_event, "runtime received file event");
                    if self.engine.on_file_event(&file_event) == HotUpdate::Suppress {
                        debug!(path = ?file_event.path, "event suppressed");
                    }
                }
                RuntimeEvent::ShutdownRequested => {
                    info!("shutdown requested; stopping runtime");
                    return self.engine;
                }
            }
        }

        info!("runtime event channel closed; exiting");
        self.engine
    }
}
