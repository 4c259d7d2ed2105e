//! Context handed to check hooks.

use std::collections::BTreeMap;
use std::path::Path;

use crate::diagnostic::{CheckIdentity, Diagnostic, Severity};
use crate::tree::NodeRef;

/// Empty argument list for [`CheckContext::log`].
pub const NO_ARGS: [&str; 0] = [];

/// Per-hook view of the file being walked.
///
/// The context only lets a check append diagnostics for the current file.
/// Identity, severity and message overrides are stamped from the check's
/// registration, so a check cannot report on behalf of another.
#[derive(Debug)]
pub struct CheckContext<'a> {
    file: &'a Path,
    identity: &'a CheckIdentity,
    severity: Severity,
    messages: &'a BTreeMap<String, String>,
    sink: &'a mut Vec<Diagnostic>,
}

impl<'a> CheckContext<'a> {
    /// Creates a context writing into `sink`.
    #[must_use]
    pub fn new(
        file: &'a Path,
        identity: &'a CheckIdentity,
        severity: Severity,
        messages: &'a BTreeMap<String, String>,
        sink: &'a mut Vec<Diagnostic>,
    ) -> Self {
        Self {
            file,
            identity,
            severity,
            messages,
            sink,
        }
    }

    /// Path of the file being walked.
    #[must_use]
    pub fn file(&self) -> &Path {
        self.file
    }

    /// Name of the running check.
    #[must_use]
    pub fn check_name(&self) -> &str {
        &self.identity.name
    }

    /// Severity configured for the running check.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Logs a diagnostic at the node's position.
    pub fn log<I, S>(&mut self, node: NodeRef<'_>, key: &str, args: I)
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.log_at(node.line(), node.column(), key, args);
    }

    /// Logs a diagnostic at an explicit position. Line 0 marks a file-level
    /// diagnostic.
    pub fn log_at<I, S>(&mut self, line: usize, column: usize, key: &str, args: I)
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        let args = args.into_iter().map(|arg| arg.to_string()).collect();
        let diagnostic = Diagnostic::new(
            line,
            column,
            key,
            args,
            self.severity,
            self.identity.clone(),
        )
        .with_template(self.messages.get(key).cloned());
        self.sink.push(diagnostic);
    }
}
