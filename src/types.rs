use std::fmt;

/// Kind of filesystem change carried by a file event.
///
/// - `Add`: a file appeared (created, or renamed into place).
/// - `Change`: an existing file's contents or metadata changed.
/// - `Unlink`: a file disappeared (removed, or renamed away).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileEventKind {
    Add,
    Change,
    Unlink,
}

impl fmt::Display for FileEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileEventKind::Add => "add",
            FileEventKind::Change => "change",
            FileEventKind::Unlink => "unlink",
        };
        f.write_str(s)
    }
}

/// Why a runner is being executed.
///
/// The build-mode exclusion (`build = false`) only applies to `Startup`:
/// a build session never watches, so change-triggered executions only
/// happen while serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Executed once when the session begins.
    Startup,
    /// Executed because a watched file matched the runner.
    FileChange,
}
