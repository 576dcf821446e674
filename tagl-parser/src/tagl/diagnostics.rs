//! Diagnostic collection
//!
//! Every stage of the pipeline records problems here instead of failing:
//! parsing, reconciliation and the downstream analyses are all total, so a
//! single malformed construct never masks unrelated errors elsewhere in
//! the file. Diagnostics accumulate in discovery order and are sorted by
//! position before reporting.

use super::ast::span::{LineIndex, Pos};
use std::fmt;

/// Diagnostic severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A recorded problem tied to a source position.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Diagnostic {
    pub pos: Pos,
    pub severity: Severity,
    pub message: String,
    /// Stable machine-readable code, e.g. `unclosed-tag`.
    pub code: Option<&'static str>,
}

impl Diagnostic {
    pub fn error(pos: Pos, message: impl Into<String>) -> Self {
        Self { pos, severity: Severity::Error, message: message.into(), code: None }
    }

    pub fn warning(pos: Pos, message: impl Into<String>) -> Self {
        Self { pos, severity: Severity::Warning, message: message.into(), code: None }
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    /// Render with a line:column location for terminal output.
    pub fn display_with(&self, index: &LineIndex) -> String {
        format!("{}: {}: {}", index.line_col(self.pos), self.severity, self.message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} at {}", self.severity, self.message, self.pos)
    }
}

/// An append-only diagnostic list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, pos: Pos, message: impl Into<String>) {
        self.items.push(Diagnostic::error(pos, message));
    }

    pub fn push(&mut self, diag: Diagnostic) {
        self.items.push(diag);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.severity == Severity::Error)
    }

    /// Sort by position (stable, so same-position diagnostics keep their
    /// discovery order) and return the final list.
    pub fn into_sorted(mut self) -> Vec<Diagnostic> {
        self.items.sort_by_key(|d| d.pos);
        self.items
    }
}
