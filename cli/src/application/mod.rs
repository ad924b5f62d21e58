//! Application layer: port trait definitions and use-case orchestration.
//!
//! This module depends only on `crate::domain` and the `Provisioner` seam,
//! never on `crate::infra`, `crate::commands`, or `crate::output`.

pub mod cancel;
pub mod ports;
pub mod remote;
pub mod retry;
pub mod services;

pub use cancel::{CancelHandle, Cancellation, cancellation};
pub use ports::{
    Communicator, FileInfo, ProvisionUi, RemoteCmd, RemoteOutput, RetryPolicy, Retryable,
};
pub use remote::CommandFailure;
pub use services::executor::RemoteExecutor;
pub use services::flow::FlowComposer;
pub use services::provision::provision;
pub use services::transfer::transfer;
