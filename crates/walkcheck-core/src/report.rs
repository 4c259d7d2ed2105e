//! Collected audit results.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::diagnostic::Severity;

/// One reported diagnostic with its rendered message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedDiagnostic {
    /// 1-based line, 0 for file-level entries.
    pub line: usize,
    /// 0-based column.
    pub column: usize,
    /// Severity.
    pub severity: Severity,
    /// Emitting check name.
    pub check: String,
    /// Emitting check id, if configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Message key.
    pub key: String,
    /// Rendered message.
    pub message: String,
}

/// Results for one file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileReport {
    /// File path.
    pub path: PathBuf,
    /// Diagnostics in report order.
    pub diagnostics: Vec<ReportedDiagnostic>,
    /// Check faults, read errors and parse errors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exceptions: Vec<ReportedDiagnostic>,
}

/// Result of an audit run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditReport {
    /// Files with at least one entry, in processing order.
    pub files: Vec<FileReport>,
    /// Number of files processed.
    pub files_checked: usize,
}

impl AuditReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All diagnostics with their file.
    pub fn diagnostics(&self) -> impl Iterator<Item = (&PathBuf, &ReportedDiagnostic)> {
        self.files
            .iter()
            .flat_map(|f| f.diagnostics.iter().map(move |d| (&f.path, d)))
    }

    /// All exceptions with their file.
    pub fn exceptions(&self) -> impl Iterator<Item = (&PathBuf, &ReportedDiagnostic)> {
        self.files
            .iter()
            .flat_map(|f| f.exceptions.iter().map(move |d| (&f.path, d)))
    }

    /// Counts diagnostics as (errors, warnings, infos).
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        let count = |severity: Severity| {
            self.diagnostics()
                .filter(|(_, d)| d.severity == severity)
                .count()
        };
        (
            count(Severity::Error),
            count(Severity::Warning),
            count(Severity::Info),
        )
    }

    /// Returns true if any diagnostic meets the threshold or any exception
    /// was recorded.
    #[must_use]
    pub fn has_violations_at(&self, severity: Severity) -> bool {
        self.exceptions().next().is_some()
            || self
                .diagnostics()
                .any(|(_, d)| d.severity != Severity::Ignore && d.severity >= severity)
    }

    /// Formats the report as a multi-line failure message for test
    /// assertions.
    #[must_use]
    pub fn format_test_report(&self, fail_on: Severity) -> String {
        use std::fmt::Write;

        let failing: Vec<_> = self
            .diagnostics()
            .filter(|(_, d)| d.severity != Severity::Ignore && d.severity >= fail_on)
            .chain(self.exceptions())
            .collect();

        let mut report = String::new();
        let _ = writeln!(
            report,
            "\n=== walkcheck: {} violation(s) ===\n",
            failing.len()
        );
        for (path, d) in &failing {
            let _ = writeln!(
                report,
                "{} [{}] at {}:{}:{}",
                d.check,
                d.key,
                path.display(),
                d.line,
                d.column
            );
            let _ = writeln!(report, "  {}: {}", d.severity, d.message);
            let _ = writeln!(report);
        }

        let (errors, warnings, infos) = self.count_by_severity();
        let _ = writeln!(
            report,
            "Total: {} error(s), {} warning(s), {} info(s) in {} file(s)",
            errors, warnings, infos, self.files_checked
        );
        report
    }
}
