//! Terminal Output
//!
//! Styled console output for the CLI. All user-facing text goes through
//! here; analyzers and loaders only emit tracing events.

use console::style;

#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    quiet: bool,
}

impl Output {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn header(&self, text: &str) {
        if !self.quiet {
            println!("{}", style(text).bold().cyan());
        }
    }

    pub fn info(&self, text: &str) {
        if !self.quiet {
            println!("{text}");
        }
    }

    pub fn success(&self, text: &str) {
        if !self.quiet {
            println!("{} {text}", style("✓").green());
        }
    }

    pub fn warn(&self, text: &str) {
        eprintln!("{} {text}", style("!").yellow());
    }

    pub fn error(&self, text: &str) {
        eprintln!("{} {text}", style("✗").red());
    }

    /// Raw passthrough for rendered report bodies.
    pub fn raw(&self, text: &str) {
        println!("{text}");
    }
}
