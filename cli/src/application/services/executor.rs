//! Application service: run a command batch as one script on the target.
//!
//! The batch is turned into a single script, uploaded to a fresh scratch path
//! and executed in one shell session, so exported variables and `cd` carry
//! over between commands. Each attempt uploads anew under a different path.

use std::cell::Cell;
use std::path::{Path, PathBuf};

use crate::application::cancel::Cancellation;
use crate::application::ports::{Communicator, FileInfo, ProvisionUi, RemoteCmd, RetryPolicy};
use crate::application::remote::CommandFailure;
use crate::domain::script::{self, ScriptArtifact};
use crate::domain::{ExecError, ScriptBuildError};

/// Executes command batches on a remote target.
#[derive(Debug, Clone)]
pub struct RemoteExecutor {
    scratch_dir: String,
    staging_dir: PathBuf,
}

impl RemoteExecutor {
    /// `scratch_dir` is the remote directory that receives scripts. Local
    /// files are staged in the system temp dir.
    pub fn new(scratch_dir: impl Into<String>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
            staging_dir: std::env::temp_dir(),
        }
    }

    /// Stage local scripts and generated uploads in `dir` instead.
    #[must_use]
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }

    #[must_use]
    pub fn scratch_dir(&self) -> &str {
        &self.scratch_dir
    }

    #[must_use]
    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Build, upload and run `commands` as one script, retrying through `policy`.
    ///
    /// The local script file is removed before this returns, on every path.
    ///
    /// # Errors
    ///
    /// Returns `ExecError::ScriptBuild` if the script cannot be written locally,
    /// `ExecError::Cancelled` on cancellation, or the last attempt's error once
    /// `policy` gives up.
    pub async fn execute<S: AsRef<str>>(
        &self,
        cancel: &Cancellation,
        ui: &impl ProvisionUi,
        communicator: &impl Communicator,
        policy: &impl RetryPolicy,
        commands: &[S],
    ) -> Result<(), ExecError> {
        let script = script::build(commands);
        let artifact = script.materialize_in(&self.staging_dir)?;
        tracing::debug!(
            digest = %script.digest(),
            commands = commands.len(),
            local = %artifact.path().display(),
            "script materialized"
        );

        let listed: Vec<&str> = commands.iter().map(AsRef::as_ref).collect();
        ui.say(&format!("Provisioning with [{}]", listed.join(", ")));

        let previous = Cell::new(None::<String>);
        let artifact = &artifact;
        let previous = &previous;
        policy
            .run(cancel, move |attempt| {
                self.attempt(attempt, cancel, ui, communicator, artifact, previous)
            })
            .await
    }

    async fn attempt(
        &self,
        attempt: u32,
        cancel: &Cancellation,
        ui: &impl ProvisionUi,
        communicator: &impl Communicator,
        artifact: &ScriptArtifact,
        previous: &Cell<Option<String>>,
    ) -> Result<(), ExecError> {
        let prior = previous.take();
        let path = script::scratch_path(&self.scratch_dir, prior.as_deref());
        previous.set(Some(path.clone()));
        tracing::debug!(attempt, path = %path, "uploading script");

        let mut file = artifact.reopen().map_err(ScriptBuildError::from)?;
        let info = file.metadata().ok().map(|m| FileInfo::from_metadata(&m));
        match cancel
            .guard(communicator.upload(&path, &mut file, info.as_ref()))
            .await
        {
            None => return Err(ExecError::Cancelled),
            Some(Err(e)) => {
                return Err(ExecError::Upload {
                    path,
                    reason: format!("{e:#}"),
                });
            }
            Some(Ok(())) => {}
        }

        let chmod = RemoteCmd::new(format!("chmod 0755 {path}"));
        match chmod.run(cancel, communicator).await {
            Err(CommandFailure::Cancelled) => return Err(ExecError::Cancelled),
            Err(CommandFailure::Transport(e)) => {
                return Err(ExecError::Chmod {
                    path,
                    reason: format!("{e:#}"),
                });
            }
            Ok(out) if !out.success() => {
                return Err(ExecError::Chmod {
                    path,
                    reason: describe_exit(out.exit_code),
                });
            }
            Ok(_) => {}
        }

        let run = RemoteCmd::new(format!("chmod +x {path}; {path}"));
        let out = match run.run_with_ui(cancel, communicator, ui).await {
            Ok(out) => out,
            Err(CommandFailure::Cancelled) => return Err(ExecError::Cancelled),
            Err(CommandFailure::Transport(e)) => {
                return Err(ExecError::Transport {
                    command: run.command,
                    reason: format!("{e:#}"),
                });
            }
        };
        if !out.success() {
            return Err(ExecError::NonZeroExit {
                path,
                code: out.exit_code.unwrap_or(-1),
            });
        }
        Ok(())
    }
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {code}"),
        None => "terminated by signal".to_string(),
    }
}
