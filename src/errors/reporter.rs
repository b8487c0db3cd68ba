use std::fmt::Display;

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Generation continues.
    Recoverable,
    /// Generation of the current module stops.
    Fatal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub severity: Severity,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.severity {
            Severity::Recoverable => write!(f, "error: {}", self.message),
            Severity::Fatal => write!(f, "fatal: {}", self.message),
        }
    }
}

/// Append-only collector of diagnostics.
///
/// Nothing in here ever fails; callers keep going after an `emit` and read
/// the list back with [`Reporter::all`] once the pass is done.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    diagnostics: Vec<Diagnostic>,
}

impl Reporter {
    pub fn new() -> Self {
        Reporter {
            diagnostics: vec![],
        }
    }

    /// Records a recoverable diagnostic.
    pub fn emit(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(%message, "diagnostic");
        self.diagnostics.push(Diagnostic {
            message,
            severity: Severity::Recoverable,
        });
    }

    /// Records the diagnostic that halted generation.
    pub fn fatal(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(%message, "fatal diagnostic");
        self.diagnostics.push(Diagnostic {
            message,
            severity: Severity::Fatal,
        });
    }

    pub fn all(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn messages(&self) -> Vec<&str> {
        self.diagnostics.iter().map(|d| d.message.as_str()).collect()
    }

    pub fn has_fatal(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Fatal)
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }
}
