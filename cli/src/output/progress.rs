//! Progress indicators using indicatif

#![allow(clippy::expect_used)] // Templates are compile-time constants

use std::io::{self, Read};

use indicatif::{ProgressBar, ProgressBarIter, ProgressStyle};

/// Create a progress bar for determinate progress.
///
/// # Panics
///
/// Panics if the progress bar template string is invalid. It is a constant,
/// so this does not happen.
#[must_use]
pub fn bar(len: u64, msg: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  {msg}\n    {bar:40.cyan/dim} {percent}%  {bytes}/{total_bytes}")
            .expect("valid template")
            .progress_chars("━━─"),
    );
    pb.set_message(msg.to_string());
    pb
}

/// Finish a progress bar with a success message.
pub fn finish_success(pb: &ProgressBar, msg: &str) {
    pb.finish_with_message(format!("✓ {msg}"));
}

/// Finish a progress bar with an error message.
pub fn finish_error(pb: &ProgressBar, msg: &str) {
    pb.finish_with_message(format!("✗ {msg}"));
}

/// A reader that advances a progress bar and finishes it at end of input.
///
/// A reader dropped before end of input marks the bar as failed.
pub struct TrackedRead<R: Read> {
    inner: ProgressBarIter<R>,
    name: String,
    done: bool,
}

/// Wrap `reader` so every byte read advances a bar labelled `name`.
#[must_use]
pub fn track<R: Read>(name: &str, offset: u64, size: u64, reader: R) -> TrackedRead<R> {
    let pb = bar(size, &format!("Uploading {name}"));
    pb.set_position(offset);
    TrackedRead {
        inner: pb.wrap_read(reader),
        name: name.to_string(),
        done: false,
    }
}

impl<R: Read> Read for TrackedRead<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n == 0 && !buf.is_empty() && !self.done {
            self.done = true;
            finish_success(&self.inner.progress, &self.name);
        }
        Ok(n)
    }
}

impl<R: Read> Drop for TrackedRead<R> {
    fn drop(&mut self) {
        if !self.done {
            finish_error(&self.inner.progress, &self.name);
        }
    }
}
