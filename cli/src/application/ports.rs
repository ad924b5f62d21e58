//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and sibling application
//! modules, never from `crate::infra`, `crate::commands`, or `crate::output`.

use std::future::Future;
use std::io::Read;
use std::path::Path;

use anyhow::Result;

use crate::application::cancel::Cancellation;

// ── Value Types ───────────────────────────────────────────────────────────────

/// Metadata of a local file handed to `Communicator::upload`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileInfo {
    /// Size in bytes.
    pub size: u64,
    /// Unix permission bits, when known.
    pub mode: Option<u32>,
}

impl FileInfo {
    #[must_use]
    pub fn from_metadata(meta: &std::fs::Metadata) -> Self {
        #[cfg(unix)]
        let mode = {
            use std::os::unix::fs::PermissionsExt;
            Some(meta.permissions().mode() & 0o7777)
        };
        #[cfg(not(unix))]
        let mode = None;
        Self {
            size: meta.len(),
            mode,
        }
    }
}

/// A shell command line to run on the remote target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCmd {
    pub command: String,
}

impl RemoteCmd {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

/// Result of a completed remote command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteOutput {
    /// Exit code; `None` when the command was killed by a signal.
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl RemoteOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

// ── Communicator Port ─────────────────────────────────────────────────────────

/// Remote file transfer and command execution (SSH, Multipass, container exec).
#[allow(async_fn_in_trait)]
pub trait Communicator {
    /// Upload everything `reader` yields to `remote_path`.
    async fn upload(
        &self,
        remote_path: &str,
        reader: &mut dyn Read,
        info: Option<&FileInfo>,
    ) -> Result<()>;

    /// Recursively upload the contents of `local_dir` into `remote_dir`.
    async fn upload_dir(&self, remote_dir: &str, local_dir: &Path, excludes: &[String])
    -> Result<()>;

    /// Start `cmd` and wait for it to finish.
    ///
    /// A non-zero exit is reported through `RemoteOutput::exit_code`, not as `Err`.
    /// `Err` means the transport itself failed.
    async fn start(&self, cmd: &RemoteCmd) -> Result<RemoteOutput>;
}

// ── UI Port ───────────────────────────────────────────────────────────────────

/// User-facing output sink. Sync trait, no async needed.
pub trait ProvisionUi {
    /// Emit a status line.
    fn say(&self, message: &str);
    /// Emit a line of remote command output.
    fn message(&self, message: &str);
    /// Emit an error line. Never suppressed.
    fn error(&self, message: &str);
    /// Wrap `reader` so that reading from it reports transfer progress.
    fn track_progress<'a>(
        &self,
        name: &str,
        offset: u64,
        size: u64,
        reader: Box<dyn Read + 'a>,
    ) -> Box<dyn Read + 'a>;
}

// ── Retry Port ────────────────────────────────────────────────────────────────

/// Error types that can drive a retry loop.
pub trait Retryable {
    /// Whether another attempt may succeed.
    fn is_retryable(&self) -> bool;
    /// The value reported when cancellation stops the loop.
    fn cancelled() -> Self;
}

/// Re-invokes an attempt until it succeeds or the policy gives up.
#[allow(async_fn_in_trait)]
pub trait RetryPolicy {
    /// Run `attempt` (called with the 1-based attempt number).
    ///
    /// # Errors
    ///
    /// Returns the last attempt's error once the policy is exhausted, the first
    /// non-retryable error, or `E::cancelled()` when `cancel` fires.
    async fn run<T, E, F, Fut>(&self, cancel: &Cancellation, attempt: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + std::fmt::Display;
}
