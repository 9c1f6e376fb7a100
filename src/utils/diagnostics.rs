//! Operator-facing diagnostics.
//!
//! The inventory run narrates what it skips and degrades as colored lines on
//! stderr: `info` in blue, `warning` in yellow, `error` in red. Every line is
//! also emitted as a `debug` tracing event under the `rolegraph::diagnostics`
//! target so that `RUST_LOG` captures them without doubling the console output.

use colored::Colorize;
use std::fmt::Display;

/// Severity of a diagnostic line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Expected condition, processing continues (blue)
    Info,
    /// Degraded record, processing continues (yellow)
    Warning,
    /// Reported failure (red); fatal ones additionally abort through an error value
    Error,
}

impl Severity {
    const fn label(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// Console sink for diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct Diagnostics {
    quiet: bool,
}

impl Diagnostics {
    /// Create a sink; `quiet` suppresses info lines.
    #[must_use]
    pub const fn new(quiet: bool) -> Self {
        Self {
            quiet,
        }
    }

    /// Report an expected condition.
    pub fn info(&self, message: impl Display) {
        self.emit(Severity::Info, &message);
    }

    /// Report a degraded record.
    pub fn warning(&self, message: impl Display) {
        self.emit(Severity::Warning, &message);
    }

    /// Report a failure.
    pub fn error(&self, message: impl Display) {
        self.emit(Severity::Error, &message);
    }

    fn emit(&self, severity: Severity, message: &dyn Display) {
        tracing::debug!(target: "rolegraph::diagnostics", severity = severity.label(), "{message}");

        if self.quiet && severity == Severity::Info {
            return;
        }

        let line = format!("{}: {}", severity.label(), message);
        let line = match severity {
            Severity::Info => line.blue(),
            Severity::Warning => line.yellow(),
            Severity::Error => line.red(),
        };
        eprintln!("{line}");
    }
}
