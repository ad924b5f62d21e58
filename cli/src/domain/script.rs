//! Command script builder.
//!
//! Remote shells do not keep exported variables or the working directory
//! between separately started commands, so `export JAVA_HOME=...` in one
//! command is invisible to a later `java -jar ...`. A command batch is
//! therefore concatenated into a single script and executed in one shell
//! session.

use std::io::Write;
use std::path::Path;

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::domain::error::ScriptBuildError;

/// Interpreter line of every generated script.
pub const SHEBANG: &str = "#!/bin/bash";
/// Echo each command before it runs.
pub const TRACE_DIRECTIVE: &str = "set -x";
/// Abort the script on the first failing command.
pub const FAIL_FAST_DIRECTIVE: &str = "set -e";

const TEMP_PREFIX: &str = "provisio-shell";

/// Upper bound (exclusive) of the numeric suffix of remote scratch paths.
pub const SCRATCH_RANGE: u64 = 9999;

/// Generated script text. A pure function of the command batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptContent(String);

impl ScriptContent {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hex SHA-256 of the script body.
    #[must_use]
    pub fn digest(&self) -> String {
        let hash = Sha256::digest(self.0.as_bytes());
        hash.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Write the script into a uniquely named file in the system temp dir.
    ///
    /// # Errors
    ///
    /// Returns an error if the temp file cannot be created or written.
    pub fn materialize(&self) -> Result<ScriptArtifact, ScriptBuildError> {
        self.materialize_in(&std::env::temp_dir())
    }

    /// Like [`ScriptContent::materialize`], inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the temp file cannot be created or written.
    pub fn materialize_in(&self, dir: &Path) -> Result<ScriptArtifact, ScriptBuildError> {
        let mut file = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(".sh")
            .tempfile_in(dir)?;
        file.write_all(self.0.as_bytes())?;
        file.flush()?;
        Ok(ScriptArtifact { file })
    }
}

/// A script materialized on local disk. The file is deleted on drop.
#[derive(Debug)]
pub struct ScriptArtifact {
    file: NamedTempFile,
}

impl ScriptArtifact {
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Open a fresh handle positioned at offset 0, one per upload attempt.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be reopened.
    pub fn reopen(&self) -> std::io::Result<std::fs::File> {
        self.file.reopen()
    }
}

/// Build the script for a command batch.
///
/// Commands are opaque and copied verbatim, one per line, in input order.
#[must_use]
pub fn build<S: AsRef<str>>(commands: &[S]) -> ScriptContent {
    let mut body = format!("{SHEBANG}\n{TRACE_DIRECTIVE}\n{FAIL_FAST_DIRECTIVE}\n");
    for command in commands {
        body.push_str(command.as_ref());
        body.push('\n');
    }
    ScriptContent(body)
}

/// Pick a remote scratch path `{dir}/script_{n}.sh` with `n` in `0..9999`.
///
/// `avoid` is the path used by the previous attempt; the result never equals it.
#[must_use]
pub fn scratch_path(dir: &str, avoid: Option<&str>) -> String {
    let dir = dir.trim_end_matches('/');
    loop {
        let path = format!("{dir}/script_{}.sh", random_below(SCRATCH_RANGE));
        if avoid != Some(path.as_str()) {
            return path;
        }
    }
}

fn random_below(bound: u64) -> u64 {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};

    let mut hasher = RandomState::new().build_hasher();
    hasher.write_u128(
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0),
    );
    hasher.write_u64(RandomState::new().build_hasher().finish());
    hasher.finish() % bound
}
