//! `Communicator` that targets the machine provisio runs on.
//!
//! Used for container builds and CI runners where the "remote" is local, and
//! by the end-to-end tests.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::{Communicator, FileInfo, RemoteCmd, RemoteOutput};
use crate::infra::command_runner::CommandRunner;
use crate::infra::read_upload;

/// Runs commands through `bash -c` and copies files on the local filesystem.
///
/// Filesystem writes run on the blocking pool.
pub struct LocalCommunicator<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> LocalCommunicator<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    Ok(())
}

fn write_file(path: &Path, bytes: &[u8], mode: Option<u32>) -> Result<()> {
    ensure_parent(path)?;
    std::fs::write(path, bytes)
        .with_context(|| format!("Error restoring file {}", path.display()))?;

    #[cfg(unix)]
    if let Some(mode) = mode {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
            .with_context(|| format!("cannot set permissions on {}", path.display()))?;
    }
    #[cfg(not(unix))]
    let _ = mode;
    Ok(())
}

fn copy_tree(from: &Path, to: &Path, excludes: &[String]) -> Result<()> {
    std::fs::create_dir_all(to).with_context(|| format!("cannot create {}", to.display()))?;
    let entries =
        std::fs::read_dir(from).with_context(|| format!("cannot read {}", from.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("cannot read {}", from.display()))?;
        let name = entry.file_name();
        if excludes.iter().any(|e| name.to_string_lossy() == e.as_str()) {
            continue;
        }
        let src = entry.path();
        let dst = to.join(&name);
        if entry.file_type()?.is_dir() {
            copy_tree(&src, &dst, excludes)?;
        } else {
            std::fs::copy(&src, &dst)
                .with_context(|| format!("cannot copy {} to {}", src.display(), dst.display()))?;
        }
    }
    Ok(())
}

impl<R: CommandRunner> Communicator for LocalCommunicator<R> {
    async fn upload(
        &self,
        remote_path: &str,
        reader: &mut dyn Read,
        info: Option<&FileInfo>,
    ) -> Result<()> {
        let bytes = read_upload(reader)
            .await
            .with_context(|| format!("cannot read upload for {remote_path}"))?;
        let path = PathBuf::from(remote_path);
        let mode = info.and_then(|i| i.mode);
        tokio::task::spawn_blocking(move || write_file(&path, &bytes, mode))
            .await
            .map_err(|e| anyhow::anyhow!("spawn_blocking panicked: {e}"))?
    }

    async fn upload_dir(
        &self,
        remote_dir: &str,
        local_dir: &Path,
        excludes: &[String],
    ) -> Result<()> {
        let from = local_dir.to_path_buf();
        let to = PathBuf::from(remote_dir);
        let excludes = excludes.to_vec();
        tokio::task::spawn_blocking(move || copy_tree(&from, &to, &excludes))
            .await
            .map_err(|e| anyhow::anyhow!("spawn_blocking panicked: {e}"))?
    }

    async fn start(&self, cmd: &RemoteCmd) -> Result<RemoteOutput> {
        let output = self
            .runner
            .run("bash", &["-c", &cmd.command])
            .await
            .context("bash -c")?;
        Ok(RemoteOutput {
            exit_code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
