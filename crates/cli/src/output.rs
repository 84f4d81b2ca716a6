// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::ValueEnum;
use podcap_daemon::SessionStatus;

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Format milliseconds as `"1h 2m 3s"`, dropping leading zero units.
pub fn format_uptime(ms: u64) -> String {
    let secs = ms / 1000;
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let secs = secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, mins, secs)
    } else if mins > 0 {
        format!("{}m {}s", mins, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Render running captures as an aligned table, one row per workload.
pub fn session_table(sessions: &[SessionStatus]) -> String {
    let width = sessions
        .iter()
        .map(|s| s.workload.to_string().len())
        .max()
        .unwrap_or(0)
        .max("WORKLOAD".len());

    let mut out = format!(
        "{:<width$}  {:>8}  {:>5}  {:<8}  {:<10}  STATE\n",
        "WORKLOAD", "PID", "FILES", "INSTANCE", "UPTIME"
    );
    for s in sessions {
        let state = if s.terminating { "stopping" } else { "running" };
        out.push_str(&format!(
            "{:<width$}  {:>8}  {:>5}  {:<8}  {:<10}  {}\n",
            s.workload.to_string(),
            s.pid,
            s.max_files,
            s.instance,
            format_uptime(s.uptime_ms),
            state
        ));
    }
    out
}
