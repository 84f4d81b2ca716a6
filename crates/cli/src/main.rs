// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! podcap - control client for the podcap capture agent

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod commands;
mod env;
mod exit_error;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Arg, ArgAction, CommandFactory, FromArgMatches, Parser, Subcommand};
use commands::{agent, workload};
use output::OutputFormat;
use podcap_core::WorkloadId;

use crate::client::DaemonClient;

#[derive(Parser)]
#[command(
    name = "podcap",
    version,
    about = "Control the podcap packet-capture agent"
)]
struct Cli {
    /// Output format
    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        default_value_t,
        global = true
    )]
    output: OutputFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether the agent is running
    Ping,
    /// Show CLI and agent versions
    Version,
    /// Report or change a workload (annotation, containers, node)
    Apply(workload::ApplyArgs),
    /// Report a workload as removed
    Delete {
        /// Workload as <namespace>/<name>
        id: WorkloadId,
    },
    /// Replace the agent's view with a full listing (JSON array, `-` for stdin)
    Sync { file: PathBuf },
    /// Show running captures
    Status {
        /// Only this workload; exits non-zero when it has no capture
        workload: Option<WorkloadId>,
    },
    /// Stop every capture and shut the agent down
    Shutdown,
}

/// Clap command with `-v` as the visible version flag and `-V` as a hidden alias.
fn cli_command() -> clap::Command {
    Cli::command().disable_version_flag(true).arg(
        Arg::new("version")
            .short('v')
            .short_alias('V')
            .long("version")
            .action(ArgAction::Version)
            .help("Print version"),
    )
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        let code = e
            .downcast_ref::<exit_error::ExitError>()
            .map_or(1, |c| c.code);
        let msg = format_error(&e);
        if !msg.is_empty() {
            eprintln!("Error: {}", msg);
        }
        std::process::exit(code);
    }
}

/// Format an anyhow error, deduplicating the chain.
///
/// The "Caused by" chain is skipped when the top-level message already
/// contains every source message.
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();

    let chain_redundant = err
        .chain()
        .skip(1)
        .all(|cause| top.contains(&cause.to_string()));

    if chain_redundant {
        return top;
    }

    let mut buf = top;
    for (i, cause) in err.chain().skip(1).enumerate() {
        buf.push_str(&format!("\n\nCaused by:\n    {}: {}", i, cause));
    }
    buf
}

async fn run() -> Result<()> {
    let cli = Cli::from_arg_matches(&cli_command().get_matches())?;
    let format = cli.output;

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            cli_command().print_help()?;
            println!();
            return Ok(());
        }
    };

    match command {
        // Ping reports an unreachable agent itself
        Commands::Ping => agent::ping(format).await,
        Commands::Version => agent::version(&DaemonClient::connect()?, format).await,
        Commands::Apply(args) => workload::apply(args, &DaemonClient::connect()?, format).await,
        Commands::Delete { id } => workload::delete(id, &DaemonClient::connect()?, format).await,
        Commands::Sync { file } => workload::sync(file, &DaemonClient::connect()?, format).await,
        Commands::Status { workload } => {
            agent::status(workload, &DaemonClient::connect()?, format).await
        }
        Commands::Shutdown => agent::shutdown(&DaemonClient::connect()?, format).await,
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
