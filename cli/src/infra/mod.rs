//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution,
//! Multipass and local communicators, and the provisioning file loader.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod command_runner;
pub mod config;
pub mod local;
pub mod multipass;

use std::io::{self, Read};
use std::time::Duration;

use anyhow::Result;

use crate::application::ports::{Communicator, FileInfo, RemoteCmd, RemoteOutput};
use crate::domain::TargetConfig;
use command_runner::TokioCommandRunner;
use local::LocalCommunicator;
use multipass::MultipassCommunicator;

const READ_CHUNK: usize = 64 * 1024;

/// Drain `reader` into an owned buffer, yielding to the runtime between
/// chunks so a racing cancellation can drop the upload part-way.
pub(crate) async fn read_upload(reader: &mut dyn Read) -> io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        match reader.read(&mut chunk) {
            Ok(0) => return Ok(bytes),
            Ok(n) => bytes.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
        tokio::task::yield_now().await;
    }
}

/// The communicator selected by `target:` in the provisioning file.
pub enum TargetCommunicator {
    Multipass(MultipassCommunicator<TokioCommandRunner>),
    Local(LocalCommunicator<TokioCommandRunner>),
}

impl TargetCommunicator {
    #[must_use]
    pub fn new(target: &TargetConfig, exec_timeout: Duration) -> Self {
        let runner = TokioCommandRunner::new(exec_timeout);
        match target {
            TargetConfig::Multipass { instance } => {
                Self::Multipass(MultipassCommunicator::new(instance.clone(), runner))
            }
            TargetConfig::Local => Self::Local(LocalCommunicator::new(runner)),
        }
    }
}

impl Communicator for TargetCommunicator {
    async fn upload(
        &self,
        remote_path: &str,
        reader: &mut dyn Read,
        info: Option<&FileInfo>,
    ) -> Result<()> {
        match self {
            Self::Multipass(c) => c.upload(remote_path, reader, info).await,
            Self::Local(c) => c.upload(remote_path, reader, info).await,
        }
    }

    async fn upload_dir(
        &self,
        remote_dir: &str,
        local_dir: &std::path::Path,
        excludes: &[String],
    ) -> Result<()> {
        match self {
            Self::Multipass(c) => c.upload_dir(remote_dir, local_dir, excludes).await,
            Self::Local(c) => c.upload_dir(remote_dir, local_dir, excludes).await,
        }
    }

    async fn start(&self, cmd: &RemoteCmd) -> Result<RemoteOutput> {
        match self {
            Self::Multipass(c) => c.start(cmd).await,
            Self::Local(c) => c.start(cmd).await,
        }
    }
}
