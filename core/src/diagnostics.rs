//! Accumulated, path-tagged diagnostics.
//!
//! Stages never short-circuit on the first problem (spec §4.G "Failure
//! semantics"): every violation found during a single pass is collected here
//! and logged via `tracing`, and the stage itself returns a bool/Result only
//! after the full sweep.

use std::fmt;

/// One collected diagnostic: a path and a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Dotted path of the value the diagnostic is about.
    pub path: String,
    /// Description of the violation.
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// An append-only log of diagnostics produced during one checker/engine pass.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    header: String,
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty log, tagged with the checker/stage's header string
    /// (spec §4.A: "logs each violation with the checker's header string").
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            entries: Vec::new(),
        }
    }

    /// Record a violation at `path` and emit it through `tracing`.
    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        let diag = Diagnostic {
            path: path.into(),
            message: message.into(),
        };
        tracing::error!(header = %self.header, path = %diag.path, message = %diag.message);
        self.entries.push(diag);
    }

    /// True if no violations were recorded.
    pub fn is_ok(&self) -> bool {
        self.entries.is_empty()
    }

    /// All recorded diagnostics, in the order they were pushed.
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Merge another log's entries into this one (used when a sub-model's
    /// pass is folded into its parent's).
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{}", entry)?;
        }
        Ok(())
    }
}
