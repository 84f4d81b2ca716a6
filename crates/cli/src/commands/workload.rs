// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `podcap apply|delete|sync` - Feed workload events to the agent

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Args;
use podcap_core::{Workload, WorkloadId, DEFAULT_ANNOTATION_KEY};

use crate::client::DaemonClient;
use crate::output::OutputFormat;

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Workload as <namespace>/<name>
    pub id: WorkloadId,

    /// Shorthand for the default capture annotation (number of files to keep)
    #[arg(short = 'c', long)]
    pub capture: Option<String>,

    /// Extra annotation as KEY=VALUE (repeatable)
    #[arg(
        short = 'a',
        long = "annotation",
        value_name = "KEY=VALUE",
        value_parser = parse_annotation
    )]
    pub annotations: Vec<(String, String)>,

    /// Container id in <runtime>://<id> form, primary first (repeatable)
    #[arg(long = "container-id", value_name = "ID")]
    pub container_ids: Vec<String>,

    /// Workload shares the node's network namespace
    #[arg(long)]
    pub host_network: bool,

    /// Node the workload is scheduled on (defaults to the agent's node)
    #[arg(long)]
    pub node: Option<String>,
}

impl ApplyArgs {
    pub fn into_workload(self) -> Workload {
        let mut workload = Workload::new(self.id);
        workload.node_name = self.node;
        workload.annotations.extend(self.annotations);
        if let Some(value) = self.capture {
            workload
                .annotations
                .insert(DEFAULT_ANNOTATION_KEY.to_string(), value);
        }
        workload.container_ids = self.container_ids;
        workload.host_network = self.host_network;
        workload
    }
}

fn parse_annotation(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

pub async fn apply(args: ApplyArgs, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let workload = args.into_workload();
    let id = workload.id.to_string();
    client.apply(workload).await?;
    acknowledge("applied", &id, format)
}

pub async fn delete(id: WorkloadId, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let shown = id.to_string();
    client.delete(id).await?;
    acknowledge("deleted", &shown, format)
}

/// Send a full listing read from a JSON array file, or stdin for `-`.
pub async fn sync(file: PathBuf, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let workloads = read_listing(&file)?;
    let count = workloads.len();
    client.sync(workloads).await?;
    match format {
        OutputFormat::Text => println!("Synced {} workload(s)", count),
        OutputFormat::Json => {
            let obj = serde_json::json!({ "synced": count });
            println!("{}", serde_json::to_string_pretty(&obj)?);
        }
    }
    Ok(())
}

pub(crate) fn read_listing(file: &Path) -> Result<Vec<Workload>> {
    let content = if file.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?
    };
    serde_json::from_str(&content).map_err(|e| anyhow!("invalid workload listing: {}", e))
}

fn acknowledge(action: &str, id: &str, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("Workload {} {}", id, action),
        OutputFormat::Json => {
            let obj = serde_json::json!({ "workload": id, "status": action });
            println!("{}", serde_json::to_string_pretty(&obj)?);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "workload_tests.rs"]
mod tests;
