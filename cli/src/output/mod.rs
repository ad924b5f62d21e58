//! Terminal output for provisioning runs

pub mod json;
pub mod progress;
pub mod reporter;
pub mod styles;

use console::Term;
use owo_colors::{OwoColorize as _, Style};
pub use reporter::TerminalUi;
pub use styles::Styles;

/// Styling and terminal state shared by commands and `TerminalUi`.
pub struct OutputContext {
    pub styles: Styles,
    /// Whether stdout is a TTY.
    pub is_tty: bool,
    /// Whether to suppress non-error output.
    pub quiet: bool,
}

impl OutputContext {
    /// `no_color` comes from `--no-color` or `NO_COLOR`; colours also stay
    /// off when stdout is not a terminal.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stdout().is_term();
        let mut styles = Styles::default();
        if is_tty && !no_color {
            styles.colorize();
        }
        Self {
            styles,
            is_tty,
            quiet,
        }
    }

    /// Upload progress bars are drawn only on an interactive, non-quiet stdout.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        self.is_tty && !self.quiet
    }

    fn marked(glyph: &str, style: Style, msg: &str) -> String {
        format!("  {} {msg}", glyph.style(style))
    }

    /// `✓` line for a finished run.
    #[must_use]
    pub fn success_line(&self, msg: &str) -> String {
        Self::marked("✓", self.styles.success, msg)
    }

    /// `→` line for a provisioning step (uploads, script runs).
    #[must_use]
    pub fn step_line(&self, msg: &str) -> String {
        Self::marked("→", self.styles.step, msg)
    }

    /// A line of remote command output, indented under its step.
    #[must_use]
    pub fn remote_line(&self, line: &str) -> String {
        format!("    {}", line.style(self.styles.dim))
    }

    fn print(&self, line: &str) {
        if !self.quiet {
            println!("{line}");
        }
    }

    pub fn success(&self, msg: &str) {
        self.print(&self.success_line(msg));
    }

    pub fn step(&self, msg: &str) {
        self.print(&self.step_line(msg));
    }

    pub fn remote(&self, line: &str) {
        self.print(&self.remote_line(line));
    }

    /// Flow heading in plans.
    pub fn info(&self, msg: &str) {
        self.print(&Self::marked("ℹ", self.styles.info, msg));
    }

    pub fn header(&self, msg: &str) {
        self.print(&format!("  {}", msg.style(self.styles.header)));
    }

    /// Dimmed key, then value. Used for plan entries and field listings.
    pub fn kv(&self, key: &str, value: &str) {
        self.print(&format!("  {}  {value}", key.style(self.styles.dim)));
    }

    /// Errors go to stderr and ignore `quiet`.
    pub fn error(&self, msg: &str) {
        eprintln!("{}", Self::marked("✗", self.styles.error, msg));
    }
}
