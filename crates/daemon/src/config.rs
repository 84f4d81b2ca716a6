// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent configuration: optional TOML file, then environment overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use podcap_core::DEFAULT_ANNOTATION_KEY;
use podcap_engine::{ReconcilerConfig, SpecChangePolicy, DEFAULT_GRACE_PERIOD};
use serde::Deserialize;
use thiserror::Error;

use crate::env;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("node name is required (set {} or node_name)", env::NODE_NAME)]
    MissingNodeName,

    #[error("could not determine state directory (set {})", env::STATE_DIR)]
    NoStateDir,

    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value '{value}' for {key}: {message}")]
    Invalid {
        key: &'static str,
        value: String,
        message: String,
    },
}

/// How capture targets are located.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolverKind {
    /// Capture in the agent's own network namespace
    #[default]
    Host,
    /// Enter the network namespace of the workload's container process
    ProcCgroup,
}

impl std::str::FromStr for ResolverKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "host" => Ok(ResolverKind::Host),
            "proc-cgroup" => Ok(ResolverKind::ProcCgroup),
            other => Err(format!(
                "unknown resolver '{}' (expected host or proc-cgroup)",
                other
            )),
        }
    }
}

/// Contents of the config file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub node_name: Option<String>,
    pub state_dir: Option<PathBuf>,
    pub capture_dir: Option<PathBuf>,
    pub annotation_key: Option<String>,
    pub grace_period_ms: Option<u64>,
    pub tool: Option<PathBuf>,
    pub nsenter: Option<PathBuf>,
    pub interface: Option<String>,
    pub rotate_size_mb: Option<u32>,
    pub resolver: Option<ResolverKind>,
    pub proc_root: Option<PathBuf>,
    pub on_spec_change: Option<SpecChangePolicy>,
    pub log_file: Option<PathBuf>,
}

impl FileConfig {
    /// Read `path`; a missing file yields the empty config.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Resolved agent configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub node_name: String,
    /// Holds the socket and lock file
    pub state_dir: PathBuf,
    pub socket_path: PathBuf,
    pub lock_path: PathBuf,
    pub capture_dir: PathBuf,
    pub annotation_key: String,
    pub grace_period: Duration,
    pub tool: PathBuf,
    pub nsenter: PathBuf,
    pub interface: String,
    pub rotate_size_mb: u32,
    pub resolver: ResolverKind,
    pub proc_root: PathBuf,
    pub on_spec_change: SpecChangePolicy,
    /// `None` logs to stderr
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Load from the config file named by the environment, then apply
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let file = FileConfig::read(&env::config_path())?;
        Self::build(file, &env::var)
    }

    /// Merge `file` with values from `lookup`, which take precedence.
    pub fn build(
        file: FileConfig,
        lookup: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let node_name = lookup(env::NODE_NAME)
            .or(file.node_name)
            .filter(|n| !n.is_empty())
            .ok_or(ConfigError::MissingNodeName)?;

        let state_dir = lookup(env::STATE_DIR)
            .map(PathBuf::from)
            .or(file.state_dir)
            .or_else(|| env::default_state_dir(lookup))
            .ok_or(ConfigError::NoStateDir)?;

        let grace_period = match lookup(env::GRACE_MS) {
            Some(raw) => Duration::from_millis(parse_value(env::GRACE_MS, &raw)?),
            None => file
                .grace_period_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_GRACE_PERIOD),
        };
        if grace_period.is_zero() {
            return Err(ConfigError::Invalid {
                key: "grace_period_ms",
                value: "0".to_string(),
                message: "must be positive".to_string(),
            });
        }

        let resolver = match lookup(env::RESOLVER) {
            Some(raw) => parse_value(env::RESOLVER, &raw)?,
            None => file.resolver.unwrap_or_default(),
        };
        let on_spec_change = match lookup(env::ON_SPEC_CHANGE) {
            Some(raw) => parse_value(env::ON_SPEC_CHANGE, &raw)?,
            None => file.on_spec_change.unwrap_or_default(),
        };

        let rotate_size_mb = file.rotate_size_mb.unwrap_or(1);
        if rotate_size_mb == 0 {
            return Err(ConfigError::Invalid {
                key: "rotate_size_mb",
                value: "0".to_string(),
                message: "must be positive".to_string(),
            });
        }

        Ok(Self {
            node_name,
            socket_path: state_dir.join("podcapd.sock"),
            lock_path: state_dir.join("podcapd.pid"),
            state_dir,
            capture_dir: lookup(env::CAPTURE_DIR)
                .map(PathBuf::from)
                .or(file.capture_dir)
                .unwrap_or_else(|| PathBuf::from("/captures")),
            annotation_key: lookup(env::ANNOTATION)
                .or(file.annotation_key)
                .unwrap_or_else(|| DEFAULT_ANNOTATION_KEY.to_string()),
            grace_period,
            tool: lookup(env::TOOL)
                .map(PathBuf::from)
                .or(file.tool)
                .unwrap_or_else(|| PathBuf::from("tcpdump")),
            nsenter: file.nsenter.unwrap_or_else(|| PathBuf::from("nsenter")),
            interface: file.interface.unwrap_or_else(|| "any".to_string()),
            rotate_size_mb,
            resolver,
            proc_root: lookup(env::PROC_ROOT)
                .map(PathBuf::from)
                .or(file.proc_root)
                .unwrap_or_else(|| PathBuf::from("/host/proc")),
            on_spec_change,
            log_file: lookup(env::LOG_FILE).map(PathBuf::from).or(file.log_file),
        })
    }

    pub fn reconciler_config(&self) -> ReconcilerConfig {
        ReconcilerConfig {
            node_name: self.node_name.clone(),
            annotation_key: self.annotation_key.clone(),
            capture_dir: self.capture_dir.clone(),
            grace_period: self.grace_period,
            on_spec_change: self.on_spec_change,
        }
    }
}

fn parse_value<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value: raw.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
