//! Running a `RemoteCmd` through a `Communicator`.

use thiserror::Error;

use crate::application::cancel::Cancellation;
use crate::application::ports::{Communicator, ProvisionUi, RemoteCmd, RemoteOutput};

/// Why a remote command produced no `RemoteOutput`.
#[derive(Debug, Error)]
pub enum CommandFailure {
    #[error("cancelled")]
    Cancelled,
    #[error("{0:#}")]
    Transport(anyhow::Error),
}

impl RemoteCmd {
    /// Start the command and wait for it, racing against `cancel`.
    ///
    /// # Errors
    ///
    /// Returns `CommandFailure::Transport` if the communicator fails and
    /// `CommandFailure::Cancelled` if cancellation fires first.
    pub async fn run(
        &self,
        cancel: &Cancellation,
        communicator: &impl Communicator,
    ) -> Result<RemoteOutput, CommandFailure> {
        tracing::debug!(command = %self.command, "starting remote command");
        match cancel.guard(communicator.start(self)).await {
            None => Err(CommandFailure::Cancelled),
            Some(Err(e)) => Err(CommandFailure::Transport(e)),
            Some(Ok(out)) => {
                tracing::debug!(
                    command = %self.command,
                    exit_code = ?out.exit_code,
                    "remote command finished"
                );
                Ok(out)
            }
        }
    }

    /// Like `run`, and forwards every stdout/stderr line to `ui.message`.
    ///
    /// # Errors
    ///
    /// Same as `run`.
    pub async fn run_with_ui(
        &self,
        cancel: &Cancellation,
        communicator: &impl Communicator,
        ui: &impl ProvisionUi,
    ) -> Result<RemoteOutput, CommandFailure> {
        let out = self.run(cancel, communicator).await?;
        for stream in [&out.stdout, &out.stderr] {
            for line in String::from_utf8_lossy(stream).lines() {
                ui.message(line);
            }
        }
        Ok(out)
    }
}
