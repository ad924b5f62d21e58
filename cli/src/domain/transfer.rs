//! Transfer tasks and remote destination resolution.

use std::path::Path;

use serde::Serialize;

/// Where the bytes of a transfer come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TransferSource {
    /// A local file or directory. Interpolated before use.
    Path { path: String },
    /// In-memory content (a decoded secret, a rendered template). Written to a
    /// scoped temp file right before the transfer and removed afterwards.
    Content {
        label: String,
        #[serde(skip)]
        bytes: Vec<u8>,
    },
}

impl TransferSource {
    pub fn path(path: impl Into<String>) -> Self {
        Self::Path { path: path.into() }
    }

    pub fn content(label: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::Content {
            label: label.into(),
            bytes: bytes.into(),
        }
    }

    /// Human-readable description used in plans and messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Path { path } => path.clone(),
            Self::Content { label, bytes } => format!("<{label}, {} bytes>", bytes.len()),
        }
    }
}

/// One file or directory pushed to the remote target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferTask {
    pub source: TransferSource,
    pub destination: String,
}

impl TransferTask {
    pub fn new(source: TransferSource, destination: impl Into<String>) -> Self {
        Self {
            source,
            destination: destination.into(),
        }
    }
}

/// Final remote file path for uploading `source` to `destination`.
///
/// A trailing `/` on the destination means "place under this directory using
/// the source's base name"; otherwise the destination is the exact path.
#[must_use]
pub fn resolve_destination(destination: &str, source: &str) -> String {
    if !destination.ends_with('/') {
        return destination.to_string();
    }
    match Path::new(source).file_name() {
        Some(name) => format!("{destination}{}", name.to_string_lossy()),
        None => destination.to_string(),
    }
}
