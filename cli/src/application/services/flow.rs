//! Application service: run provisioning flows: transfers, then one batch.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::application::cancel::Cancellation;
use crate::application::ports::{Communicator, ProvisionUi, RetryPolicy};
use crate::application::services::executor::RemoteExecutor;
use crate::application::services::transfer::transfer;
use crate::domain::{
    InterpolationContext, ProvisionError, ProvisioningFlow, ServicePlan, TransferError,
    TransferSource, TransferTask,
};

const UPLOAD_PREFIX: &str = "provisio-upload";
/// File name for content whose label has none.
const UNNAMED_CONTENT: &str = "content";

/// Borrowed collaborators of a provisioning run.
pub struct FlowComposer<'a, U, C, P> {
    pub ui: &'a U,
    pub communicator: &'a C,
    pub policy: &'a P,
    pub executor: &'a RemoteExecutor,
    pub ctx: &'a InterpolationContext,
}

impl<U, C, P> FlowComposer<'_, U, C, P>
where
    U: ProvisionUi,
    C: Communicator,
    P: RetryPolicy,
{
    /// Run every flow of `plan` in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing flow.
    pub async fn run_plan(
        &self,
        cancel: &Cancellation,
        plan: &ServicePlan,
    ) -> Result<(), ProvisionError> {
        tracing::info!(service = %plan.service, flows = plan.flows.len(), "provisioning service");
        for flow in &plan.flows {
            self.run(cancel, flow).await?;
        }
        Ok(())
    }

    /// Run `flow`: each transfer in order, then its command batch.
    ///
    /// Nothing is rolled back on failure.
    ///
    /// # Errors
    ///
    /// Returns `ProvisionError::Transfer` naming the failed transfer's source and
    /// destination, or `ProvisionError::Exec` if the batch fails.
    pub async fn run(
        &self,
        cancel: &Cancellation,
        flow: &ProvisioningFlow,
    ) -> Result<(), ProvisionError> {
        if cancel.is_cancelled() {
            return Err(ProvisionError::Cancelled);
        }
        tracing::info!(flow = %flow.name, transfers = flow.transfers.len(), "flow started");

        for task in &flow.transfers {
            self.transfer(cancel, task).await?;
        }

        self.executor
            .execute(cancel, self.ui, self.communicator, self.policy, &flow.commands)
            .await
            .map_err(|error| ProvisionError::Exec {
                flow: flow.name.clone(),
                error,
            })?;

        tracing::info!(flow = %flow.name, "flow finished");
        Ok(())
    }

    async fn transfer(
        &self,
        cancel: &Cancellation,
        task: &TransferTask,
    ) -> Result<(), ProvisionError> {
        let wrap = |error: TransferError| ProvisionError::Transfer {
            source_path: task.source.describe(),
            destination: task.destination.clone(),
            error,
        };

        match &task.source {
            TransferSource::Path { path } => {
                transfer(cancel, self.ui, self.communicator, self.ctx, path, &task.destination)
                    .await
                    .map_err(wrap)
            }
            TransferSource::Content { label, bytes } => {
                // Removed when `_staged` drops, after the upload.
                let (_staged, file) =
                    stage(self.executor.staging_dir(), label, bytes).map_err(wrap)?;
                let local = file.to_string_lossy().into_owned();
                transfer(cancel, self.ui, self.communicator, self.ctx, &local, &task.destination)
                    .await
                    .map_err(wrap)
            }
        }
    }
}

/// Write `bytes` to `<fresh dir>/<label file name>` so a destination ending
/// in `/` resolves to the label rather than a random temp name.
fn stage(dir: &Path, label: &str, bytes: &[u8]) -> Result<(TempDir, PathBuf), TransferError> {
    let open = |source| TransferError::Open {
        path: label.to_string(),
        source,
    };
    let staged = tempfile::Builder::new()
        .prefix(UPLOAD_PREFIX)
        .tempdir_in(dir)
        .map_err(open)?;
    let name = Path::new(label)
        .file_name()
        .unwrap_or_else(|| OsStr::new(UNNAMED_CONTENT));
    let file = staged.path().join(name);
    std::fs::write(&file, bytes).map_err(open)?;
    Ok((staged, file))
}
