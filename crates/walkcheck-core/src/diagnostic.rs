//! Diagnostic model and the per-file aggregator.

use std::cmp::Ordering;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::filter::{AuditEvent, FilterChain};
use crate::messages::MessageBundle;

/// Severity level of a diagnostic.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Reported to listeners but never counted.
    Ignore,
    /// Informational message.
    Info,
    /// Should be addressed.
    Warning,
    /// Must be fixed.
    #[default]
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ignore => write!(f, "ignore"),
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "info" => Ok(Self::Info),
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown severity `{other}`")),
        }
    }
}

/// Who produced a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckIdentity {
    /// Registered check name, e.g. `MagicNumber`.
    pub name: String,
    /// Optional user-assigned id from configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl CheckIdentity {
    /// Identity without an id.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
        }
    }

    /// Returns true if `name` equals this check's name or id.
    #[must_use]
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.id.as_deref() == Some(name)
    }
}

impl std::fmt::Display for CheckIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.id {
            Some(id) if id != &self.name => write!(f, "{} ({id})", self.name),
            _ => f.write_str(&self.name),
        }
    }
}

/// A single reported finding.
///
/// The message text is not stored: it is rendered from `key` and `args`
/// through a [`MessageBundle`] when listeners are notified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// 1-based line, 0 for file-level diagnostics.
    pub line: usize,
    /// 0-based column.
    pub column: usize,
    /// Message key.
    pub key: String,
    /// Positional message arguments.
    pub args: Vec<String>,
    /// Severity as configured for the emitting check.
    pub severity: Severity,
    /// Emitting check.
    pub check: CheckIdentity,
    /// Template override configured for this check and key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_template: Option<String>,
}

impl Diagnostic {
    /// Creates a diagnostic at a position.
    #[must_use]
    pub fn new(
        line: usize,
        column: usize,
        key: impl Into<String>,
        args: Vec<String>,
        severity: Severity,
        check: CheckIdentity,
    ) -> Self {
        Self {
            line,
            column,
            key: key.into(),
            args,
            severity,
            check,
            custom_template: None,
        }
    }

    /// Creates a file-level diagnostic.
    #[must_use]
    pub fn file_level(
        key: impl Into<String>,
        args: Vec<String>,
        severity: Severity,
        check: CheckIdentity,
    ) -> Self {
        Self::new(0, 0, key, args, severity, check)
    }

    /// Sets the template override.
    #[must_use]
    pub fn with_template(mut self, template: Option<String>) -> Self {
        self.custom_template = template;
        self
    }

    /// Returns true for diagnostics not tied to a line.
    #[must_use]
    pub fn is_file_level(&self) -> bool {
        self.line == 0
    }

    /// Report order: line, then column, then key.
    #[must_use]
    pub fn position_cmp(&self, other: &Self) -> Ordering {
        (self.line, self.column, self.key.as_str()).cmp(&(
            other.line,
            other.column,
            other.key.as_str(),
        ))
    }

    /// Formats the diagnostic as a single line for terminal output.
    #[must_use]
    pub fn render(&self, file: &Path, bundle: &MessageBundle) -> String {
        let message = bundle.format(self);
        if self.is_file_level() {
            format!(
                "[{}] {}: {} [{}]",
                self.severity.to_string().to_uppercase(),
                file.display(),
                message,
                self.check.name
            )
        } else {
            format!(
                "[{}] {}:{}:{}: {} [{}]",
                self.severity.to_string().to_uppercase(),
                file.display(),
                self.line,
                self.column,
                message,
                self.check.name
            )
        }
    }
}

/// Per-file diagnostic buffer.
///
/// Diagnostics are kept in insertion order until [`flush`](Self::flush)
/// sorts them by position. Identical entries are all kept.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    pending: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers one diagnostic.
    pub fn record(&mut self, diagnostic: Diagnostic) {
        self.pending.push(diagnostic);
    }

    /// Buffers many diagnostics, keeping their order.
    pub fn record_all(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.pending.extend(diagnostics);
    }

    /// Number of buffered diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns true if nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Sorts the buffer, drops what the filter chain rejects and returns the
    /// rest. The collector is empty afterwards.
    pub fn flush(
        &mut self,
        file: &Path,
        filters: &FilterChain,
        bundle: &MessageBundle,
    ) -> Vec<Diagnostic> {
        let mut pending = std::mem::take(&mut self.pending);
        // sort_by is stable, equal positions keep insertion order
        pending.sort_by(Diagnostic::position_cmp);
        if filters.is_empty() {
            return pending;
        }
        pending
            .into_iter()
            .filter(|diagnostic| {
                let message = bundle.format(diagnostic);
                filters.accept(&AuditEvent {
                    file,
                    diagnostic,
                    message: &message,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diag(line: usize, column: usize, key: &str, arg: &str) -> Diagnostic {
        Diagnostic::new(
            line,
            column,
            key,
            vec![arg.to_string()],
            Severity::Error,
            CheckIdentity::named("Test"),
        )
    }

    #[test]
    fn severity_order_and_parsing() {
        assert!(Severity::Ignore < Severity::Info);
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert_eq!("WARN".parse::<Severity>(), Ok(Severity::Warning));
        assert!("fatal".parse::<Severity>().is_err());
        assert_eq!(Severity::default(), Severity::Error);
    }

    #[test]
    fn flush_sorts_stably_without_dedup() {
        let mut collector = DiagnosticCollector::new();
        collector.record(diag(3, 0, "b", "first"));
        collector.record(diag(1, 4, "a", "x"));
        collector.record(diag(3, 0, "b", "second"));
        collector.record(diag(3, 0, "a", "y"));
        collector.record(diag(1, 4, "a", "x"));

        let flushed = collector.flush(Path::new("F"), &FilterChain::new(), &MessageBundle::new());
        let summary: Vec<(usize, &str, &str)> = flushed
            .iter()
            .map(|d| (d.line, d.key.as_str(), d.args[0].as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (1, "a", "x"),
                (1, "a", "x"),
                (3, "a", "y"),
                (3, "b", "first"),
                (3, "b", "second"),
            ]
        );
        assert!(collector.is_empty());
    }

    #[test]
    fn render_uses_bundle_and_override() {
        let mut bundle = MessageBundle::new();
        bundle.insert("magic", "''{0}'' is magic.");
        let d = diag(2, 5, "magic", "42");
        assert_eq!(
            d.render(Path::new("A.java"), &bundle),
            "[ERROR] A.java:2:5: '42' is magic. [Test]"
        );
        let d = d.with_template(Some("no {0}".to_string()));
        assert_eq!(
            d.render(Path::new("A.java"), &bundle),
            "[ERROR] A.java:2:5: no 42 [Test]"
        );
        let file = Diagnostic::file_level("magic", vec!["1".into()], Severity::Info, CheckIdentity::named("T"));
        assert_eq!(
            file.render(Path::new("A.java"), &bundle),
            "[INFO] A.java: '1' is magic. [T]"
        );
    }

    #[test]
    fn identity_matches_name_or_id() {
        let identity = CheckIdentity {
            name: "MagicNumber".into(),
            id: Some("magic".into()),
        };
        assert!(identity.answers_to("MagicNumber"));
        assert!(identity.answers_to("magic"));
        assert!(!identity.answers_to("Other"));
        assert_eq!(identity.to_string(), "MagicNumber (magic)");
    }
}
