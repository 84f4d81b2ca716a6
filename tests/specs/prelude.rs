//! Helpers for the black-box behavior tests.
//!
//! Provides a small DSL for running `podcap` against a real `podcapd`.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};

// Aggressive timeouts for fast tests.
const PODCAP_TIMEOUT_IPC_MS: &str = "1000";
const PODCAP_GRACE_MS: &str = "1000";

// Spec polling timeouts
pub const SPEC_POLL_INTERVAL_MS: u64 = 10;
pub const SPEC_WAIT_MAX_MS: u64 = 3000;

/// Stand-in capture tool: creates the `-w` output file, then idles until
/// SIGTERM. Arguments match what the tcpdump launcher passes.
const FAKE_TOOL: &str = r#"#!/bin/sh
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-w" ]; then out="$2"; fi
  shift
done
: > "$out"
trap 'exit 0' TERM
while :; do sleep 0.05; done
"#;

/// Returns the path to a binary, checking llvm-cov target directory first.
/// Falls back to resolving relative to the test binary itself.
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let llvm_cov_path = manifest_dir.join("target/llvm-cov-target/debug").join(name);
    if llvm_cov_path.exists() {
        return llvm_cov_path;
    }

    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }

    // The test binary lives at target/debug/deps/specs-<hash>
    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }

    standard
}

pub fn podcap_binary() -> PathBuf {
    binary_path("podcap")
}

pub fn podcapd_binary() -> PathBuf {
    binary_path("podcapd")
}

/// Create a CLI builder for podcap commands
pub fn cli() -> CliBuilder {
    CliBuilder::new(podcap_binary())
}

/// Create a builder for running podcapd directly
pub fn agent() -> CliBuilder {
    CliBuilder::new(podcapd_binary())
}

/// High-level CLI builder for fluent test assertions
pub struct CliBuilder {
    binary: PathBuf,
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl CliBuilder {
    fn new(binary: PathBuf) -> Self {
        Self {
            binary,
            args: Vec::new(),
            envs: vec![(
                "PODCAP_TIMEOUT_IPC_MS".into(),
                PODCAP_TIMEOUT_IPC_MS.into(),
            )],
        }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<Path>) -> Self {
        self.envs.push((
            key.to_string(),
            value.as_ref().to_string_lossy().to_string(),
        ));
        self
    }

    /// Build the command without running it
    pub fn command(self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(&self.args);

        // Keep the caller's agent configuration out of tests
        for key in [
            "NODE_NAME",
            "PODCAP_CONFIG",
            "PODCAP_SOCKET",
            "PODCAP_STATE_DIR",
            "PODCAP_CAPTURE_DIR",
            "PODCAP_TOOL",
        ] {
            cmd.env_remove(key);
        }

        for (key, value) in self.envs {
            cmd.env(key, value);
        }
        cmd
    }

    /// Run and expect success (exit code 0)
    pub fn passes(self) -> RunAssert {
        let output = self.command().output().expect("command should run");
        assert!(
            output.status.success(),
            "expected command to pass, got exit code {:?}\nstdout: {}\nstderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    /// Run and expect failure (non-zero exit code)
    pub fn fails(self) -> RunAssert {
        let output = self.command().output().expect("command should run");
        assert!(
            !output.status.success(),
            "expected command to fail, but it passed\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }
}

/// Result of a CLI run for chaining assertions
pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn code(&self) -> Option<i32> {
        self.output.status.code()
    }

    /// Assert stdout equals expected exactly (with diff on failure).
    pub fn stdout_eq(self, expected: &str) -> Self {
        let stdout = self.stdout();
        similar_asserts::assert_eq!(stdout, expected);
        self
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            stdout.contains(expected),
            "stdout does not contain '{}'\nstdout: {}",
            expected,
            stdout
        );
        self
    }

    pub fn stdout_lacks(self, unexpected: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            !stdout.contains(unexpected),
            "stdout should not contain '{}'\nstdout: {}",
            unexpected,
            stdout
        );
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(
            stderr.contains(expected),
            "stderr does not contain '{}'\nstderr: {}",
            expected,
            stderr
        );
        self
    }

    pub fn exit_code(self, expected: i32) -> Self {
        assert_eq!(self.code(), Some(expected), "stderr: {}", self.stderr());
        self
    }
}

// =============================================================================
// Polling
// =============================================================================

/// Poll a condition until it returns true or timeout is reached.
pub fn wait_for<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_millis(timeout_ms);
    let poll_interval = std::time::Duration::from_millis(SPEC_POLL_INTERVAL_MS);

    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(poll_interval);
    }
    false
}

// =============================================================================
// Node
// =============================================================================

/// An isolated node: private state and capture directories plus a fake
/// capture tool. The agent is started on demand and stopped on drop.
pub struct Node {
    root: tempfile::TempDir,
    agent: Option<Child>,
}

impl Node {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let tool = root.path().join("fake-tcpdump");
        std::fs::write(&tool, FAKE_TOOL).unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();
        Self { root, agent: None }
    }

    pub fn state_path(&self) -> PathBuf {
        self.root.path().join("state")
    }

    pub fn capture_path(&self) -> PathBuf {
        self.root.path().join("captures")
    }

    pub fn socket_path(&self) -> PathBuf {
        self.state_path().join("podcapd.sock")
    }

    pub fn log_path(&self) -> PathBuf {
        self.state_path().join("podcapd.log")
    }

    /// podcapd environment for this node
    pub fn agent_cmd(&self) -> CliBuilder {
        agent()
            .env("NODE_NAME", "node-a")
            .env("PODCAP_CONFIG", self.root.path().join("absent.toml"))
            .env("PODCAP_STATE_DIR", self.state_path())
            .env("PODCAP_CAPTURE_DIR", self.capture_path())
            .env("PODCAP_TOOL", self.root.path().join("fake-tcpdump"))
            .env("PODCAP_GRACE_MS", PODCAP_GRACE_MS)
            .env("PODCAP_LOG_FILE", self.log_path())
    }

    /// Start podcapd and wait for its socket
    pub fn start(&mut self) {
        let child = self
            .agent_cmd()
            .command()
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .unwrap();
        self.agent = Some(child);
        let socket = self.socket_path();
        assert!(
            wait_for(SPEC_WAIT_MAX_MS, || socket.exists()),
            "agent did not start\nlog: {}",
            self.agent_log()
        );
    }

    /// Wait for the agent process to exit on its own
    pub fn wait_exit(&mut self) -> bool {
        let Some(child) = self.agent.as_mut() else {
            return true;
        };
        let exited = wait_for(SPEC_WAIT_MAX_MS, || matches!(child.try_wait(), Ok(Some(_))));
        if exited {
            self.agent = None;
        }
        exited
    }

    /// Run podcap against this node's agent
    pub fn podcap(&self) -> CliBuilder {
        cli().env("PODCAP_STATE_DIR", self.state_path())
    }

    /// Capture files currently on disk, sorted
    pub fn capture_files(&self) -> Vec<String> {
        let mut files: Vec<String> = std::fs::read_dir(self.capture_path())
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        files.sort();
        files
    }

    pub fn agent_log(&self) -> String {
        std::fs::read_to_string(self.log_path()).unwrap_or_else(|_| "(no agent log)".to_string())
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        if let Some(mut child) = self.agent.take() {
            let _ = self
                .podcap()
                .args(&["shutdown"])
                .command()
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status();
            if !wait_for(SPEC_WAIT_MAX_MS, || matches!(child.try_wait(), Ok(Some(_)))) {
                let _ = child.kill();
            }
            let _ = child.wait();
        }
    }
}
