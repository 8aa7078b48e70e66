// src/exec/spawner.rs

//! Process spawning.
//!
//! The executor talks to a [`ProcessSpawner`] instead of `tokio::process`
//! directly, so tests can record spawn requests without starting real
//! processes. [`ShellSpawner`] is the production implementation.

use std::fmt::Debug;
use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{anyhow, Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Everything needed to start one runner process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRequest {
    /// Runner name, for logs and diagnostics.
    pub runner: String,
    /// Executable after environment overrides.
    pub program: String,
    pub args: Vec<String>,
    /// Discard stdout/stderr instead of forwarding them.
    pub silent: bool,
    /// Working directory (the session root).
    pub cwd: PathBuf,
}

/// Exit status of a runner process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    Success,
    Failed(i32),
}

/// Called once when the process exits, or with an error if it could not be
/// started or awaited.
pub type ExitCallback = Box<dyn FnOnce(Result<ProcessOutcome>) + Send + 'static>;

/// Abstraction over "start this command and tell me when it is done".
pub trait ProcessSpawner: Send + Sync + Debug {
    fn spawn(&self, request: SpawnRequest, on_exit: ExitCallback);
}

/// Runs commands through the platform shell on the current Tokio runtime.
///
/// - Unix: `sh -c 'exec "$0" "$@"' <program> <args...>`, so arguments reach
///   the program verbatim while `PATH` lookup is done by the shell.
/// - Windows: `cmd /C <program> <args...>`.
#[derive(Debug, Clone, Default)]
pub struct ShellSpawner;

impl ProcessSpawner for ShellSpawner {
    fn spawn(&self, request: SpawnRequest, on_exit: ExitCallback) {
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(err) => {
                on_exit(Err(anyhow!("no async runtime to spawn '{}': {err}", request.runner)));
                return;
            }
        };

        handle.spawn(async move {
            on_exit(run_process(request).await);
        });
    }
}

/// Build the shell invocation for `request`.
pub fn shell_command(request: &SpawnRequest) -> Command {
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(&request.program);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg("exec \"$0\" \"$@\"").arg(&request.program);
        c
    };
    cmd.args(&request.args).current_dir(&request.cwd).stdin(Stdio::null());
    cmd
}

async fn run_process(request: SpawnRequest) -> Result<ProcessOutcome> {
    info!(
        runner = %request.runner,
        program = %request.program,
        args = ?request.args,
        "starting runner process"
    );

    let mut cmd = shell_command(&request);
    if request.silent {
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
    } else {
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    }

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning process for runner '{}'", request.runner))?;

    let forwarders = [
        child
            .stdout
            .take()
            .map(|out| forward_lines(out, request.runner.clone(), Stream::Stdout)),
        child
            .stderr
            .take()
            .map(|err| forward_lines(err, request.runner.clone(), Stream::Stderr)),
    ];

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for process of runner '{}'", request.runner))?;

    // Drain remaining output before reporting the exit.
    for forwarder in forwarders.into_iter().flatten() {
        let _ = forwarder.await;
    }

    let code = status.code().unwrap_or(-1);
    debug!(
        runner = %request.runner,
        exit_code = code,
        success = status.success(),
        "runner process exited"
    );

    Ok(if status.success() {
        ProcessOutcome::Success
    } else {
        ProcessOutcome::Failed(code)
    })
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Forward a child stream line by line to our own stdout/stderr.
fn forward_lines<R>(reader: R, runner: String, stream: Stream) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match stream {
                Stream::Stdout => println!("{line}"),
                Stream::Stderr => eprintln!("{line}"),
            }
            debug!(runner = %runner, ?stream, "{}", line);
        }
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    fn request(program: &str, args: &[&str]) -> SpawnRequest {
        SpawnRequest {
            runner: "test".to_string(),
            program: program.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
            silent: true,
            cwd: std::env::temp_dir(),
        }
    }

    async fn spawn_and_wait(req: SpawnRequest) -> Result<ProcessOutcome> {
        let (tx, rx) = oneshot::channel();
        ShellSpawner.spawn(
            req,
            Box::new(move |res| {
                let _ = tx.send(res);
            }),
        );
        rx.await.expect("exit callback dropped")
    }

    #[tokio::test]
    async fn reports_success_and_failure_codes() {
        assert_eq!(spawn_and_wait(request("true", &[])).await.unwrap(), ProcessOutcome::Success);
        assert_eq!(
            spawn_and_wait(request("sh", &["-c", "exit 3"])).await.unwrap(),
            ProcessOutcome::Failed(3)
        );
    }

    #[tokio::test]
    async fn arguments_are_passed_verbatim() {
        // A single argument containing spaces and a quote must stay one argv entry.
        let outcome = spawn_and_wait(request(
            "sh",
            &["-c", "test \"$1\" = \"a b'c\"", "probe", "a b'c"],
        ))
        .await
        .unwrap();
        assert_eq!(outcome, ProcessOutcome::Success);
    }

    #[tokio::test]
    async fn unknown_program_exits_with_127() {
        let outcome = spawn_and_wait(request("watchrun-definitely-missing-binary", &[]))
            .await
            .unwrap();
        assert_eq!(outcome, ProcessOutcome::Failed(127));
    }

    #[test]
    fn spawning_outside_a_runtime_reports_an_error() {
        let (tx, rx) = std::sync::mpsc::channel();
        ShellSpawner.spawn(
            request("true", &[]),
            Box::new(move |res| {
                let _ = tx.send(res.is_err());
            }),
        );
        assert!(rx.recv().unwrap());
    }
}
