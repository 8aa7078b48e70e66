// src/lib.rs

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod env;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod paths;
pub mod runner;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::diagnostics::{ConsoleSink, DiagnosticSink};
use crate::engine::{DispatchEngine, Runtime, RuntimeEvent};
use crate::env::{load_env, EnvSnapshot};
use crate::exec::{ShellSpawner, TokioTimers};
use crate::fs::{FileSystem, RealFileSystem};
use crate::runner::{ResolvedOptions, Session};
use crate::watch::IgnoreFilter;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - env snapshot for the selected mode
/// - dispatch engine (registry, executor, timers)
/// - startup execution
/// - in build mode: waiting for startup commands, then exit
/// - otherwise: file watcher + Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    let root = config_root_dir(&config_path);
    let session = Session {
        root: root.clone(),
        mode: args.effective_mode(),
        build: args.build,
    };

    let sink: Arc<dyn DiagnosticSink> = Arc::new(ConsoleSink);
    let env = EnvSnapshot::capture(load_env(&RealFileSystem, &root, &session.mode)?);
    let options = ResolvedOptions::resolve(cfg.run_options()?, session, env, sink.as_ref());

    if args.dry_run {
        print_dry_run(&options);
        return Ok(());
    }

    let engine = DispatchEngine::new(
        Arc::new(options),
        Arc::new(TokioTimers::current()),
        Arc::new(ShellSpawner),
        sink,
    );

    let scheduled = engine.on_startup();
    info!(scheduled, "startup runners dispatched");

    if args.build {
        engine.executor().in_flight().wait_idle().await;
        info!("build finished");
        return Ok(());
    }

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let ignore = IgnoreFilter::new(&cfg.config.ignore)?;
    let _watcher_handle = crate::watch::spawn_watcher(root, ignore, rt_tx.clone())?;

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    Runtime::new(engine, rt_rx).run().await;
    Ok(())
}

/// Figure out a sensible project root for watching.
///
/// - If the config path has a non-empty parent (e.g. "configs/Watchrun.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Watchrun.toml" (parent = ""),
///   we fall back to the current working directory "."
fn config_root_dir(config_path: &Path) -> PathBuf {
    let dir = match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };
    RealFileSystem.canonicalize(&dir).unwrap_or(dir)
}

/// Simple dry-run output: print resolved runners.
fn print_dry_run(options: &ResolvedOptions) {
    println!("watchrun dry-run");
    println!("  root = {}", options.session.root.display());
    println!("  mode = {}", options.session.mode);
    println!("  build = {}", options.session.build);
    println!("  silent = {}", options.silent);
    println!("  skip_dts = {}", options.skip_dts);
    println!("  env vars from .env files = {}", options.env.mode_len());
    println!();

    println!("runners ({}):", options.runners.len());
    for runner in &options.runners {
        let cfg = runner.config();
        println!("  - {}", runner.name());
        if let Some(command) = &cfg.command {
            println!("      run: {:?}", command);
        }
        if !runner.patterns().is_empty() {
            let resolved: Vec<_> = runner.patterns().iter().map(|p| p.resolved()).collect();
            println!("      pattern: {:?}", resolved);
        }
        if cfg.condition.is_some() {
            println!("      condition: yes");
        }
        println!("      startup: {}", cfg.runs_at_startup());
        if !cfg.run_at_build {
            println!("      build: false");
        }
        println!("      delay: {:?}, throttle: {:?}", cfg.delay, cfg.throttle);
    }

    debug!("dry-run complete (no execution)");
}
