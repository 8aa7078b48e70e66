// src/watch/watcher.rs

use std::path::{Path, PathBuf};

use anyhow::Result;
use notify::event::{ModifyKind, RenameMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::{FileEvent, RuntimeEvent};
use crate::paths::relative_str;
use crate::types::FileEventKind;
use crate::watch::filter::IgnoreFilter;

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive for
/// as long as needed. Dropping this handle will stop file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Map a notify event kind onto add/change/unlink.
///
/// Access and unclassified events are dropped.
pub fn classify(kind: &EventKind) -> Option<FileEventKind> {
    match kind {
        EventKind::Create(_) => Some(FileEventKind::Add),
        EventKind::Remove(_) => Some(FileEventKind::Unlink),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => Some(FileEventKind::Unlink),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => Some(FileEventKind::Add),
        EventKind::Modify(_) => Some(FileEventKind::Change),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => None,
    }
}

/// Turn one notify event into file events, dropping ignored paths.
pub fn translate(root: &Path, event: &Event, ignore: &IgnoreFilter) -> Vec<FileEvent> {
    let Some(kind) = classify(&event.kind) else {
        return Vec::new();
    };

    // A rename carrying both paths is an unlink of the first and an add of the second.
    let both = matches!(event.kind, EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
        && event.paths.len() == 2;

    event
        .paths
        .iter()
        .enumerate()
        .filter(|(_, path)| match relative_str(root, path) {
            Some(rel) => !ignore.is_ignored(&rel),
            None => true,
        })
        .map(|(idx, path)| {
            let kind = match (both, idx) {
                (true, 0) => FileEventKind::Unlink,
                (true, _) => FileEventKind::Add,
                _ => kind,
            };
            FileEvent::new(path.clone(), kind)
        })
        .collect()
}

/// Spawn a filesystem watcher that observes `root` recursively and sends
/// `RuntimeEvent::FileChanged` for every relevant path.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    ignore: IgnoreFilter,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    let root = root.into();
    // Canonicalize once so we have a stable base path.
    let root = root.canonicalize().unwrap_or_else(|_| root.clone());

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    eprintln!("watchrun: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("watchrun: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;

    info!("file watcher started on {:?}", root);

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            debug!(?event, "received notify event");

            for file_event in translate(&root, &event, &ignore) {
                if let Err(err) = runtime_tx.send(RuntimeEvent::FileChanged(file_event)).await {
                    warn!("failed to send RuntimeEvent::FileChanged: {err}");
                    // The runtime is gone; nothing left to feed.
                    return;
                }
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle { _inner: watcher })
}
