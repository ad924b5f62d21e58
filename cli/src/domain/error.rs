//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, or `std::process`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors raised while decoding or validating provisioner configuration.
///
/// Always fatal: never retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown provisioner '{name}'.\n\nRegistered provisioners: {known}")]
    UnknownPlugin { name: String, known: String },

    #[error("Configuration for '{plugin}' must be a mapping of keys to values")]
    NotAMapping { plugin: String },

    #[error("'{plugin}' requires '{field}' to be set")]
    MissingField { plugin: String, field: String },

    #[error("'{field}' is not valid base64: {source}")]
    InvalidBase64 {
        field: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("Invalid configuration for '{plugin}': {reason}")]
    Decode { plugin: String, reason: String },

    #[error("Rendering {what}: {source}")]
    Template {
        what: String,
        #[source]
        source: TemplateError,
    },
}

// ── Interpolation errors ──────────────────────────────────────────────────────

/// Errors raised by `domain::interpolate::render`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template references undefined {kind} '{name}'")]
    Undefined { kind: &'static str, name: String },

    #[error("malformed template expression at byte {offset}: {expr}")]
    Malformed { offset: usize, expr: String },
}

// ── Script errors ─────────────────────────────────────────────────────────────

/// Materializing a script to a local temporary file failed.
#[derive(Debug, Error)]
#[error("error while loading commands into a shell script: {0}")]
pub struct ScriptBuildError(#[from] pub std::io::Error);

// ── Transfer errors ───────────────────────────────────────────────────────────

/// Errors raised by the remote transfer client. Never retried.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("error interpolating {which}: {source}")]
    Interpolate {
        which: &'static str,
        #[source]
        source: TemplateError,
    },

    #[error("cannot stat {path}: {source}")]
    Stat {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("upload to {destination} failed: {reason}")]
    Upload {
        destination: String,
        reason: String,
    },

    /// The transport could not restore the file at its destination, which
    /// usually means the destination is a folder missing a trailing slash.
    #[error(
        "upload to {destination} failed: {reason}; this can occur when the destination is a folder without a trailing slash"
    )]
    Restore {
        destination: String,
        reason: String,
    },

    #[error("upload cancelled")]
    Cancelled,
}

// ── Execution errors ──────────────────────────────────────────────────────────

/// Errors raised by the remote executor while running a command batch.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error(transparent)]
    ScriptBuild(#[from] ScriptBuildError),

    #[error("error uploading script to {path}: {reason}")]
    Upload { path: String, reason: String },

    #[error("error chmodding script file to 0755 in remote machine ({path}): {reason}")]
    Chmod { path: String, reason: String },

    #[error("remote command '{command}' failed: {reason}")]
    Transport { command: String, reason: String },

    #[error("script {path} exited with status {code}")]
    NonZeroExit { path: String, code: i32 },

    #[error("execution cancelled")]
    Cancelled,
}

impl ExecError {
    /// Whether another upload-and-run attempt may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::ScriptBuild(_) | Self::Cancelled)
    }
}

// ── Provisioning errors ───────────────────────────────────────────────────────

/// Top-level error of one provisioning flow or plan.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("error uploading '{source_path}' to '{destination}': {error}")]
    Transfer {
        source_path: String,
        destination: String,
        #[source]
        error: TransferError,
    },

    #[error("flow '{flow}': {error}")]
    Exec {
        flow: String,
        #[source]
        error: ExecError,
    },

    #[error("provisioning cancelled")]
    Cancelled,
}

impl ProvisionError {
    /// Whether this error stems from cancellation rather than a failure.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            Self::Cancelled
                | Self::Transfer {
                    error: TransferError::Cancelled,
                    ..
                }
                | Self::Exec {
                    error: ExecError::Cancelled,
                    ..
                }
        )
    }
}
