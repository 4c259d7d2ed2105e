//! Audit listeners: observers of the audit lifecycle.

use std::io::Write;
use std::path::Path;

use crate::diagnostic::Severity;
use crate::filter::AuditEvent;
use crate::report::{AuditReport, FileReport, ReportedDiagnostic};

/// Receives audit events in order: `audit_started`, then per file
/// `file_started`, any `add_error` / `add_exception`, `file_finished`, and
/// finally `audit_finished`.
pub trait AuditListener {
    /// The audit is about to process its first file.
    fn audit_started(&mut self) {}

    /// Every file has been processed, or the audit was cancelled.
    fn audit_finished(&mut self) {}

    /// A file is about to be processed.
    fn file_started(&mut self, file: &Path) {
        let _ = file;
    }

    /// A file has been processed.
    fn file_finished(&mut self, file: &Path) {
        let _ = file;
    }

    /// A diagnostic survived the filters.
    fn add_error(&mut self, event: &AuditEvent<'_>) {
        let _ = event;
    }

    /// A check fault, read failure or parse failure.
    fn add_exception(&mut self, event: &AuditEvent<'_>, cause: &dyn std::error::Error) {
        let _ = (event, cause);
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Ignore => "IGNORE",
        Severity::Info => "INFO",
        Severity::Warning => "WARN",
        Severity::Error => "ERROR",
    }
}

/// Counts diagnostics at or above a threshold, plus every exception.
#[derive(Debug, Clone, Copy)]
pub struct SeverityCounter {
    threshold: Severity,
    count: usize,
}

impl SeverityCounter {
    /// Counter for `threshold` and above. `ignore` diagnostics never count.
    #[must_use]
    pub fn new(threshold: Severity) -> Self {
        Self {
            threshold,
            count: 0,
        }
    }

    /// Current count.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }
}

impl AuditListener for SeverityCounter {
    fn audit_started(&mut self) {
        self.count = 0;
    }

    fn add_error(&mut self, event: &AuditEvent<'_>) {
        let severity = event.diagnostic.severity;
        if severity != Severity::Ignore && severity >= self.threshold {
            self.count += 1;
        }
    }

    fn add_exception(&mut self, _event: &AuditEvent<'_>, _cause: &dyn std::error::Error) {
        self.count += 1;
    }
}

/// Builds an [`AuditReport`] from events.
#[derive(Debug, Default)]
pub struct RecordingListener {
    report: AuditReport,
    current: Option<FileReport>,
}

fn reported(event: &AuditEvent<'_>) -> ReportedDiagnostic {
    let d = event.diagnostic;
    ReportedDiagnostic {
        line: d.line,
        column: d.column,
        severity: d.severity,
        check: d.check.name.clone(),
        id: d.check.id.clone(),
        key: d.key.clone(),
        message: event.message.to_string(),
    }
}

impl RecordingListener {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report collected so far.
    #[must_use]
    pub fn report(&self) -> &AuditReport {
        &self.report
    }

    /// Consumes the recorder.
    #[must_use]
    pub fn into_report(self) -> AuditReport {
        self.report
    }

    fn current(&mut self, file: &Path) -> &mut FileReport {
        self.current.get_or_insert_with(|| FileReport {
            path: file.to_path_buf(),
            ..FileReport::default()
        })
    }
}

impl AuditListener for RecordingListener {
    fn audit_started(&mut self) {
        self.report = AuditReport::new();
        self.current = None;
    }

    fn file_started(&mut self, file: &Path) {
        self.report.files_checked += 1;
        self.current = Some(FileReport {
            path: file.to_path_buf(),
            ..FileReport::default()
        });
    }

    fn file_finished(&mut self, _file: &Path) {
        if let Some(file) = self.current.take() {
            if !file.diagnostics.is_empty() || !file.exceptions.is_empty() {
                self.report.files.push(file);
            }
        }
    }

    fn add_error(&mut self, event: &AuditEvent<'_>) {
        let entry = reported(event);
        self.current(event.file).diagnostics.push(entry);
    }

    fn add_exception(&mut self, event: &AuditEvent<'_>, _cause: &dyn std::error::Error) {
        let entry = reported(event);
        self.current(event.file).exceptions.push(entry);
    }
}

/// Writes one line per event, in the classic console layout:
///
/// ```text
/// Starting audit...
/// [WARN] src/A.java:3:10: Avoid inline conditionals. [AvoidInlineConditionals]
/// Audit done.
/// ```
#[derive(Debug)]
pub struct PlainTextLogger<W: Write> {
    out: W,
}

impl<W: Write> PlainTextLogger<W> {
    /// Logger writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> AuditListener for PlainTextLogger<W> {
    fn audit_started(&mut self) {
        let _ = writeln!(self.out, "Starting audit...");
    }

    fn audit_finished(&mut self) {
        let _ = writeln!(self.out, "Audit done.");
        let _ = self.out.flush();
    }

    fn add_error(&mut self, event: &AuditEvent<'_>) {
        let d = event.diagnostic;
        if d.severity == Severity::Ignore {
            return;
        }
        let position = if d.is_file_level() {
            String::new()
        } else {
            format!(":{}:{}", d.line, d.column)
        };
        let _ = writeln!(
            self.out,
            "[{}] {}{}: {} [{}]",
            severity_label(d.severity),
            event.file.display(),
            position,
            event.message,
            d.check.name
        );
    }

    fn add_exception(&mut self, event: &AuditEvent<'_>, cause: &dyn std::error::Error) {
        let _ = writeln!(
            self.out,
            "[EXCEPTION] {}: {} ({cause})",
            event.file.display(),
            event.message
        );
    }
}
