//! `TerminalUi`: Presentation-layer implementation of `ProvisionUi`.
//!
//! Wraps `&OutputContext` and implements the `application::ports::ProvisionUi`
//! trait so application services can emit progress events without depending on
//! any presentation type directly.

use std::io::Read;

use crate::application::ports::ProvisionUi;
use crate::output::{OutputContext, progress};

/// Terminal UI that wraps an `OutputContext`.
///
/// - `say()` prints `"  → {message}"` (suppressed when `ctx.quiet`)
/// - `message()` prints the dimmed remote line indented (suppressed when `ctx.quiet`)
/// - `error()` prints `"  ✗ {message}"` to stderr (never suppressed)
/// - `track_progress()` draws a byte bar when `ctx.show_progress()`
pub struct TerminalUi<'a> {
    ctx: &'a OutputContext,
}

impl<'a> TerminalUi<'a> {
    /// Create a new `TerminalUi` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }
}

impl ProvisionUi for TerminalUi<'_> {
    fn say(&self, message: &str) {
        self.ctx.step(message);
    }

    fn message(&self, message: &str) {
        self.ctx.remote(message);
    }

    fn error(&self, message: &str) {
        self.ctx.error(message);
    }

    fn track_progress<'r>(
        &self,
        name: &str,
        offset: u64,
        size: u64,
        reader: Box<dyn Read + 'r>,
    ) -> Box<dyn Read + 'r> {
        if self.ctx.show_progress() {
            Box::new(progress::track(name, offset, size, reader))
        } else {
            reader
        }
    }
}
