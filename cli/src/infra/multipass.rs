//! `Communicator` for a Multipass instance.
//!
//! Every call goes through a `CommandRunner`, so tests can inject a mock
//! runner without spawning `multipass`.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{Communicator, FileInfo, RemoteCmd, RemoteOutput};
use crate::infra::command_runner::CommandRunner;
use crate::infra::read_upload;

const MULTIPASS: &str = "multipass";

/// Routes uploads and commands to one Multipass instance.
pub struct MultipassCommunicator<R: CommandRunner> {
    instance: String,
    runner: R,
}

impl<R: CommandRunner> MultipassCommunicator<R> {
    pub fn new(instance: impl Into<String>, runner: R) -> Self {
        Self {
            instance: instance.into(),
            runner,
        }
    }

    #[must_use]
    pub fn instance(&self) -> &str {
        &self.instance
    }

    fn target(&self, remote: &str) -> String {
        format!("{}:{remote}", self.instance)
    }
}

fn ensure_success(output: &std::process::Output, what: &str) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("{what} failed: {}", stderr.trim())
}

impl<R: CommandRunner> Communicator for MultipassCommunicator<R> {
    async fn upload(
        &self,
        remote_path: &str,
        reader: &mut dyn Read,
        _info: Option<&FileInfo>,
    ) -> Result<()> {
        let input = read_upload(reader)
            .await
            .with_context(|| format!("reading upload for {remote_path}"))?;
        let dest = self.target(remote_path);
        let output = self
            .runner
            .run_with_stdin(MULTIPASS, &["transfer", "-", &dest], &input)
            .await
            .context("multipass transfer")?;
        ensure_success(&output, "multipass transfer")
    }

    async fn upload_dir(
        &self,
        remote_dir: &str,
        local_dir: &Path,
        excludes: &[String],
    ) -> Result<()> {
        if !excludes.is_empty() {
            tracing::warn!(
                ?excludes,
                "multipass transfer cannot exclude files; uploading everything"
            );
        }
        let local = local_dir.to_string_lossy();
        let dest = self.target(remote_dir);
        let output = self
            .runner
            .run(MULTIPASS, &["transfer", "--recursive", &local, &dest])
            .await
            .context("multipass transfer --recursive")?;
        ensure_success(&output, "multipass transfer --recursive")
    }

    async fn start(&self, cmd: &RemoteCmd) -> Result<RemoteOutput> {
        let output = self
            .runner
            .run(
                MULTIPASS,
                &["exec", &self.instance, "--", "bash", "-c", &cmd.command],
            )
            .await
            .context("multipass exec")?;
        Ok(RemoteOutput {
            exit_code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
