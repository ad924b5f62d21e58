//! Application service: the `provision` use-case.
//!
//! Imports only from `crate::domain`, `crate::application` and the
//! `Provisioner` seam in `crate::plugins`.

use std::collections::BTreeMap;

use crate::application::cancel::Cancellation;
use crate::application::ports::{Communicator, ProvisionUi, RetryPolicy};
use crate::application::services::executor::RemoteExecutor;
use crate::application::services::flow::FlowComposer;
use crate::domain::{InterpolationContext, ProvisionError};
use crate::plugins::Provisioner;

/// Plan the service and run every flow of the plan against the target.
///
/// `generated` is build-generated data, available to templates as
/// ``{{ build `Key` }}``.
///
/// # Errors
///
/// Returns `ProvisionError::Config` if planning fails, otherwise the error of
/// the first failing flow.
pub async fn provision(
    cancel: &Cancellation,
    ui: &impl ProvisionUi,
    communicator: &impl Communicator,
    policy: &impl RetryPolicy,
    executor: &RemoteExecutor,
    plugin: &dyn Provisioner,
    generated: &BTreeMap<String, String>,
) -> Result<(), ProvisionError> {
    let plan = plugin.plan()?;
    let ctx = InterpolationContext::with_generated(generated.clone());
    let composer = FlowComposer {
        ui,
        communicator,
        policy,
        executor,
        ctx: &ctx,
    };
    composer.run_plan(cancel, &plan).await
}
