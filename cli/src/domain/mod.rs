//! Domain layer: pure provisioning types, builders and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, or `std::process`.
//! Everything here is synchronous and takes data in, returning data out.

pub mod config;
pub mod error;
pub mod flow;
pub mod interpolate;
pub mod retry;
pub mod script;
pub mod transfer;

pub use config::{
    DEFAULT_HOME_DIR, FieldSpec, RunConfig, TargetConfig, decode_base64, resolve_home_dir,
    validate_run_config,
};
pub use error::{
    ConfigError, ExecError, ProvisionError, ScriptBuildError, TemplateError, TransferError,
};
pub use flow::{ProvisioningFlow, ServicePlan};
pub use interpolate::{InterpolationContext, render};
pub use retry::BackoffPolicy;
pub use transfer::{TransferSource, TransferTask, resolve_destination};
