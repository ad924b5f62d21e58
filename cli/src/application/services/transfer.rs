//! Application service: upload one local file or directory to the target.
//!
//! Imports only from `crate::domain` and `crate::application`.

use std::path::Path;

use crate::application::cancel::Cancellation;
use crate::application::ports::{Communicator, FileInfo, ProvisionUi};
use crate::domain::{InterpolationContext, TransferError, render, resolve_destination};

const RESTORE_MARKER: &str = "Error restoring file";

/// Upload `source` to `destination` after interpolating both.
///
/// Directories are uploaded recursively into `destination`. Files go to
/// `resolve_destination(destination, source)` with progress reported through
/// `ui`. No retry happens here.
///
/// # Errors
///
/// Returns a `TransferError` describing the first failing step.
pub async fn transfer(
    cancel: &Cancellation,
    ui: &impl ProvisionUi,
    communicator: &impl Communicator,
    ctx: &InterpolationContext,
    source: &str,
    destination: &str,
) -> Result<(), TransferError> {
    let src = render(source, ctx).map_err(|source| TransferError::Interpolate {
        which: "source",
        source,
    })?;
    let dst = render(destination, ctx).map_err(|source| TransferError::Interpolate {
        which: "destination",
        source,
    })?;

    ui.say(&format!("Uploading {src} => {dst}"));

    let meta = std::fs::metadata(&src).map_err(|source| TransferError::Stat {
        path: src.clone(),
        source,
    })?;

    let outcome = if meta.is_dir() {
        tracing::debug!(source = %src, destination = %dst, "uploading directory");
        cancel
            .guard(communicator.upload_dir(&dst, Path::new(&src), &[]))
            .await
    } else {
        let file = std::fs::File::open(&src).map_err(|source| TransferError::Open {
            path: src.clone(),
            source,
        })?;
        let info = FileInfo::from_metadata(&meta);
        let name = Path::new(&src)
            .file_name()
            .map_or_else(|| src.clone(), |n| n.to_string_lossy().into_owned());
        let remote = resolve_destination(&dst, &src);
        tracing::debug!(source = %src, destination = %remote, size = info.size, "uploading file");

        let mut reader = ui.track_progress(&name, 0, info.size, Box::new(file));
        cancel
            .guard(communicator.upload(&remote, &mut *reader, Some(&info)))
            .await
    };

    match outcome {
        None => Err(TransferError::Cancelled),
        Some(Ok(())) => Ok(()),
        Some(Err(e)) => {
            let reason = format!("{e:#}");
            if reason.contains(RESTORE_MARKER) {
                ui.error(&format!(
                    "Upload failed: {reason}; this can occur when your file destination is a folder without a trailing slash."
                ));
                ui.error(&format!("Upload failed: {reason}"));
                Err(TransferError::Restore {
                    destination: dst,
                    reason,
                })
            } else {
                ui.error(&format!("Upload failed: {reason}"));
                Err(TransferError::Upload {
                    destination: dst,
                    reason,
                })
            }
        }
    }
}
