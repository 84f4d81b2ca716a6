// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! podcap agent (podcapd)
//!
//! Node-resident process that keeps one packet capture running per
//! annotated workload.
//!
//! Architecture:
//! - Listener Task: spawned task handling socket I/O, forwards workload events
//! - Engine Loop: records desired state and spawns one reconcile per event

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod config;
mod env;
mod lifecycle;
mod listener;

use std::sync::Arc;

use podcap_daemon::protocol;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::{mpsc, Notify};
use tracing::{error, info};

use crate::config::Config;
use crate::lifecycle::{LifecycleError, StartupResult};
use crate::listener::{ListenCtx, Listener};

/// Capacity of the listener to engine-loop channel
const INPUT_QUEUE: usize = 256;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle info flags before any config/lock acquisition
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("podcapd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: podcapd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            // Logging is not set up yet
            eprintln!("podcapd: {}", e);
            std::process::exit(1);
        }
    };

    let log_guard = setup_logging(&config)?;
    info!(node = %config.node_name, "Starting capture agent");

    let StartupResult {
        daemon,
        listener: unix_listener,
    } = match lifecycle::startup(&config).await {
        Ok(r) => r,
        Err(LifecycleError::LockFailed(_)) => {
            let pid = std::fs::read_to_string(&config.lock_path)
                .unwrap_or_default()
                .trim()
                .to_string();
            eprintln!("podcapd is already running");
            if !pid.is_empty() {
                eprintln!("  pid: {pid}");
            }
            std::process::exit(1);
        }
        Err(e) => {
            error!("Failed to start agent: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    let shutdown_notify = Arc::new(Notify::new());
    let (input_tx, mut input_rx) = mpsc::channel(INPUT_QUEUE);

    let listener = Listener::new(
        unix_listener,
        ListenCtx {
            inputs: input_tx,
            registry: Arc::clone(daemon.reconciler.registry()),
            node_name: config.node_name.clone(),
            start_time: daemon.start_time,
            shutdown: Arc::clone(&shutdown_notify),
        },
    );
    let listener_task = tokio::spawn(listener.run());

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!(
        "Agent ready, listening on {}",
        config.socket_path.display()
    );

    // Signal ready for the parent process
    println!("READY");

    loop {
        tokio::select! {
            input = input_rx.recv() => {
                match input {
                    Some(input) => {
                        // Reconciles run detached; the drain waits for them
                        lifecycle::dispatch(&daemon.reconciler, input);
                    }
                    None => {
                        info!("Listener closed, shutting down...");
                        break;
                    }
                }
            }

            _ = shutdown_notify.notified() => {
                info!("Shutdown requested via command");
                break;
            }

            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
                break;
            }

            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down...");
                break;
            }
        }
    }

    // Stop accepting new work before draining
    listener_task.abort();
    drop(input_rx);

    let report = daemon.shutdown().await;
    if report.cleanup.is_partial_failure() {
        error!(
            failed = report.cleanup.failed,
            "some capture files could not be removed"
        );
    }
    info!("Agent stopped");
    drop(log_guard);
    Ok(())
}

fn print_help() {
    println!("podcapd {}", env!("CARGO_PKG_VERSION"));
    println!("Capture agent - keeps one packet capture per annotated workload on this node");
    println!();
    println!("USAGE:");
    println!("    podcapd");
    println!();
    println!("Configuration comes from {} (default /etc/podcap/config.toml)", env::CONFIG);
    println!("and environment overrides. {} is required.", env::NODE_NAME);
    println!("Workload events arrive on a Unix socket; see `podcap --help`.");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print help information");
    println!("    -v, --version    Print version information");
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let (writer, guard) = match &config.log_file {
        Some(path) => {
            let dir = path
                .parent()
                .ok_or_else(|| LifecycleError::LogFile(path.clone()))?;
            let file_name = path
                .file_name()
                .ok_or_else(|| LifecycleError::LogFile(path.clone()))?;
            std::fs::create_dir_all(dir)?;
            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name))
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();

    Ok(guard)
}
