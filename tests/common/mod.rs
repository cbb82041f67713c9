//! Shared integration-test harness for spawning a `ceremony` process and
//! talking to it over stdin/stdout.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

/// Default timeout for reading a single snapshot line.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Timing profile short enough for autoplay to finish within a test.
pub const FAST_TIMING: &str = "fast_timing.yaml";

/// A running `ceremony run` process.
///
/// The child process is killed on drop via `kill_on_drop(true)`.
#[allow(clippy::missing_panics_doc)]
pub struct CeremonyProcess {
    child: Child,
    stdin: Option<ChildStdin>,
    reader: BufReader<ChildStdout>,
}

impl CeremonyProcess {
    /// Spawns `ceremony run` with `args` appended.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn(args: &[&str]) -> Self {
        let mut child = Command::new(env!("CARGO_BIN_EXE_ceremony"))
            .arg("run")
            .args(args)
            .arg("--quiet")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .expect("failed to spawn ceremony");

        let stdin = child.stdin.take().expect("stdin not captured");
        let stdout = child.stdout.take().expect("stdout not captured");

        Self {
            child,
            stdin: Some(stdin),
            reader: BufReader::new(stdout),
        }
    }

    /// Reads one snapshot line from stdout.
    ///
    /// Panics on EOF, I/O error, or if no line arrives within `timeout`.
    #[allow(clippy::missing_panics_doc)]
    pub async fn read_snapshot(&mut self, timeout: Duration) -> Value {
        let mut line = String::new();
        let result = tokio::time::timeout(timeout, async {
            loop {
                line.clear();
                let n = self
                    .reader
                    .read_line(&mut line)
                    .await
                    .expect("read_line I/O error");
                assert!(n > 0, "unexpected EOF from ceremony");
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    return serde_json::from_str::<Value>(trimmed)
                        .unwrap_or_else(|e| panic!("invalid JSON from ceremony: {e}\nline: {line}"));
                }
            }
        })
        .await;
        result.expect("timed out waiting for snapshot")
    }

    /// Reads snapshots until one satisfies `pred`.
    #[allow(clippy::missing_panics_doc)]
    pub async fn wait_for(&mut self, pred: impl Fn(&Value) -> bool) -> Value {
        loop {
            let snapshot = self.read_snapshot(DEFAULT_TIMEOUT).await;
            if pred(&snapshot) {
                return snapshot;
            }
        }
    }

    /// Writes one command line to stdin.
    #[allow(clippy::missing_panics_doc)]
    pub async fn send_line(&mut self, line: &str) {
        let stdin = self.stdin.as_mut().expect("stdin already closed");
        stdin
            .write_all(format!("{line}\n").as_bytes())
            .await
            .expect("failed to write to ceremony stdin");
        stdin.flush().await.expect("failed to flush ceremony stdin");
    }

    /// Closes stdin.
    pub fn close_stdin(&mut self) {
        self.stdin.take();
    }

    /// Waits for the process to exit and returns its exit code.
    #[allow(clippy::missing_panics_doc)]
    pub async fn wait_exit(&mut self) -> Option<i32> {
        tokio::time::timeout(DEFAULT_TIMEOUT, self.child.wait())
            .await
            .expect("timed out waiting for ceremony to exit")
            .expect("failed to wait on ceremony")
            .code()
    }

    /// Runs a one-shot `ceremony` command to completion.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn_command(args: &[&str]) -> Output {
        std::process::Command::new(env!("CARGO_BIN_EXE_ceremony"))
            .args(args)
            .output()
            .expect("failed to run ceremony")
    }

    /// Path to a file under `tests/fixtures`.
    pub fn fixture_path(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }
}
