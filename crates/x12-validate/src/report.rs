//! Validation report accumulated across every pipeline stage.

use serde::{Deserialize, Serialize};

use crate::finding::Finding;

/// Outcome of validating one document.
///
/// `passed` holds iff `errors` is empty. Warnings never affect it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Whether the document is free of errors.
    pub passed: bool,
    /// Errors, in the order they were detected.
    pub errors: Vec<String>,
    /// Informational findings.
    pub warnings: Vec<String>,
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::ok()
    }
}

impl ValidationReport {
    /// An empty, passing report.
    pub fn ok() -> Self {
        Self {
            passed: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add an error. Marks the report as failed.
    pub fn add_error(&mut self, error: impl Into<String>) {
        self.passed = false;
        self.errors.push(error.into());
    }

    /// Add a warning (does not affect `passed`).
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// File a finding under errors or warnings according to its kind.
    pub fn record(&mut self, finding: Finding) {
        if finding.is_warning() {
            self.add_warning(finding.to_string());
        } else {
            self.add_error(finding.to_string());
        }
    }

    /// Recompute `passed` from the error list.
    pub fn finalize(&mut self) {
        self.passed = self.errors.is_empty();
    }

    /// Errors whose message starts with the given kind, e.g. `Count Mismatch`.
    pub fn errors_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.errors
            .iter()
            .map(String::as_str)
            .filter(move |e| e.strip_prefix(kind).is_some_and(|rest| rest.starts_with(':')))
    }
}
