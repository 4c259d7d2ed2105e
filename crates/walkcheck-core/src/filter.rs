//! Suppression filters applied to flushed diagnostics.
//!
//! A [`FilterChain`] holds filters in configuration order. A diagnostic is
//! reported only if every filter accepts it; the first rejection wins.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use regex::Regex;

use crate::config::SuppressionConfig;
use crate::diagnostic::{Diagnostic, Severity};

/// What filters and listeners see for one diagnostic.
#[derive(Debug, Clone, Copy)]
pub struct AuditEvent<'a> {
    /// File the diagnostic belongs to.
    pub file: &'a Path,
    /// The diagnostic.
    pub diagnostic: &'a Diagnostic,
    /// Message rendered through the bundle.
    pub message: &'a str,
}

/// Decides whether a diagnostic is reported.
pub trait Filter: Send + Sync {
    /// Returns false to suppress the event.
    fn accept(&self, event: &AuditEvent<'_>) -> bool;
}

/// Errors building a suppression rule.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum SuppressionError {
    /// A pattern is not a valid regular expression.
    #[error("invalid `{field}` pattern `{pattern}`: {source}")]
    #[diagnostic(
        code(walkcheck::suppress::pattern),
        help("suppression patterns use Rust regex syntax")
    )]
    Pattern {
        /// Which field held the pattern.
        field: &'static str,
        /// The pattern as written.
        pattern: String,
        /// Regex compile error.
        source: regex::Error,
    },

    /// A line or column range is malformed.
    #[error("invalid range list `{0}`")]
    #[diagnostic(
        code(walkcheck::suppress::range),
        help("use a comma-separated list such as \"5\", \"10-20\" or \"1,3,10-20\"")
    )]
    Range(String),

    /// The rule would match every diagnostic.
    #[error("suppression rule needs at least one of `files`, `checks` or `message`")]
    #[diagnostic(code(walkcheck::suppress::empty))]
    Unconstrained,
}

/// A set of inclusive integer ranges, e.g. `1,3,10-20`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntRangeSet {
    ranges: Vec<(usize, usize)>,
}

impl IntRangeSet {
    /// Parses a comma-separated list of values and `low-high` ranges.
    ///
    /// # Errors
    ///
    /// Returns [`SuppressionError::Range`] for empty items, non-numbers or
    /// ranges whose low end exceeds the high end.
    pub fn parse(text: &str) -> Result<Self, SuppressionError> {
        let invalid = || SuppressionError::Range(text.to_string());
        let mut ranges = Vec::new();
        for item in text.split(',') {
            let item = item.trim();
            let (low, high) = match item.split_once('-') {
                Some((low, high)) => (low.trim(), high.trim()),
                None => (item, item),
            };
            let low: usize = low.parse().map_err(|_| invalid())?;
            let high: usize = high.parse().map_err(|_| invalid())?;
            if low > high {
                return Err(invalid());
            }
            ranges.push((low, high));
        }
        Ok(Self { ranges })
    }

    /// Returns true if `value` falls in any range.
    #[must_use]
    pub fn contains(&self, value: usize) -> bool {
        self.ranges
            .iter()
            .any(|&(low, high)| (low..=high).contains(&value))
    }
}

/// Suppresses diagnostics matching every configured constraint.
#[derive(Debug, Clone)]
pub struct SuppressionRule {
    files: Option<Regex>,
    checks: Option<Regex>,
    message: Option<Regex>,
    lines: Option<IntRangeSet>,
    columns: Option<IntRangeSet>,
}

fn compile(field: &'static str, pattern: Option<&str>) -> Result<Option<Regex>, SuppressionError> {
    pattern
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| SuppressionError::Pattern {
                field,
                pattern: pattern.to_string(),
                source,
            })
        })
        .transpose()
}

impl SuppressionRule {
    /// Compiles a rule from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid patterns or ranges, or when the rule has
    /// none of `files`, `checks` and `message`.
    pub fn from_config(config: &SuppressionConfig) -> Result<Self, SuppressionError> {
        if config.files.is_none() && config.checks.is_none() && config.message.is_none() {
            return Err(SuppressionError::Unconstrained);
        }
        Ok(Self {
            files: compile("files", config.files.as_deref())?,
            checks: compile("checks", config.checks.as_deref())?,
            message: compile("message", config.message.as_deref())?,
            lines: config.lines.as_deref().map(IntRangeSet::parse).transpose()?,
            columns: config
                .columns
                .as_deref()
                .map(IntRangeSet::parse)
                .transpose()?,
        })
    }

    /// Returns true if every present constraint matches the event.
    #[must_use]
    pub fn matches(&self, event: &AuditEvent<'_>) -> bool {
        let diagnostic = event.diagnostic;
        let file_ok = self
            .files
            .as_ref()
            .map_or(true, |re| re.is_match(&event.file.to_string_lossy()));
        let check_ok = self.checks.as_ref().map_or(true, |re| {
            re.is_match(&diagnostic.check.name)
                || diagnostic.check.id.as_deref().is_some_and(|id| re.is_match(id))
        });
        let message_ok = self
            .message
            .as_ref()
            .map_or(true, |re| re.is_match(event.message));
        let line_ok = self
            .lines
            .as_ref()
            .map_or(true, |lines| lines.contains(diagnostic.line));
        let column_ok = self
            .columns
            .as_ref()
            .map_or(true, |columns| columns.contains(diagnostic.column));
        file_ok && check_ok && message_ok && line_ok && column_ok
    }
}

impl Filter for SuppressionRule {
    fn accept(&self, event: &AuditEvent<'_>) -> bool {
        !self.matches(event)
    }
}

/// Accepts or rejects by exact severity.
#[derive(Debug, Clone, Copy)]
pub struct SeverityMatchFilter {
    /// Severity to compare against.
    pub severity: Severity,
    /// Verdict when the severity matches; the opposite otherwise.
    pub accept_on_match: bool,
}

impl Filter for SeverityMatchFilter {
    fn accept(&self, event: &AuditEvent<'_>) -> bool {
        (event.diagnostic.severity == self.severity) == self.accept_on_match
    }
}

/// Ordered set of filters.
#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn Filter>>,
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChain")
            .field("filters", &self.filters.len())
            .finish()
    }
}

impl FilterChain {
    /// Creates an empty chain that accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a chain from configured suppression rules.
    ///
    /// # Errors
    ///
    /// Returns the first rule that fails to compile.
    pub fn from_config(rules: &[SuppressionConfig]) -> Result<Self, SuppressionError> {
        let mut chain = Self::new();
        for rule in rules {
            chain.push(SuppressionRule::from_config(rule)?);
        }
        Ok(chain)
    }

    /// Appends a filter.
    pub fn push(&mut self, filter: impl Filter + 'static) {
        self.filters.push(Box::new(filter));
    }

    /// Appends an already boxed filter.
    pub fn push_boxed(&mut self, filter: Box<dyn Filter>) {
        self.filters.push(filter);
    }

    /// Consumes the chain, returning its filters in order.
    #[must_use]
    pub fn into_filters(self) -> Vec<Box<dyn Filter>> {
        self.filters
    }

    /// Number of filters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns true if the chain has no filters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Returns true only if every filter accepts.
    #[must_use]
    pub fn accept(&self, event: &AuditEvent<'_>) -> bool {
        self.filters.iter().all(|filter| filter.accept(event))
    }
}

/// Source range covered by one `@SuppressWarnings` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationSuppression {
    /// Check name, alias, id or `all`.
    pub check: String,
    /// Line of the annotated element.
    pub first_line: usize,
    /// Column of the annotated element.
    pub first_column: usize,
    /// Line where the next sibling starts, `usize::MAX` if there is none.
    pub last_line: usize,
    /// Column where the next sibling starts.
    pub last_column: usize,
}

impl AnnotationSuppression {
    fn covers(&self, diagnostic: &Diagnostic) -> bool {
        let (line, column) = (diagnostic.line, diagnostic.column);
        let after_start = self.first_line < line
            || (self.first_line == line && (column == 0 || self.first_column <= column));
        let before_end =
            self.last_line > line || (self.last_line == line && self.last_column >= column);
        after_start && before_end && self.names(diagnostic)
    }

    fn names(&self, diagnostic: &Diagnostic) -> bool {
        self.check.eq_ignore_ascii_case("all")
            || diagnostic.check.id.as_deref() == Some(self.check.as_str())
            || alias(&self.check) == alias(&diagnostic.check.name)
    }
}

/// Lowercase name with any package prefix and `check` suffix removed.
fn alias(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    let base = match lower.rfind('.') {
        Some(dot) => &lower[dot + 1..],
        None => lower.as_str(),
    };
    base.strip_suffix("check").unwrap_or(base).to_string()
}

/// Annotation suppressions recorded while walking, keyed by file.
///
/// Clones share the same entries, so the check that records them and the
/// filter that reads them can live on different sides of the walker.
#[derive(Debug, Clone, Default)]
pub struct SuppressWarningsRegistry {
    entries: Arc<Mutex<HashMap<PathBuf, Vec<AnnotationSuppression>>>>,
}

impl SuppressWarningsRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<PathBuf, Vec<AnnotationSuppression>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records a suppression for `file`.
    pub fn add(&self, file: &Path, suppression: AnnotationSuppression) {
        self.entries()
            .entry(file.to_path_buf())
            .or_default()
            .push(suppression);
    }

    /// Drops everything recorded for `file`.
    pub fn forget(&self, file: &Path) {
        self.entries().remove(file);
    }

    /// Suppressions recorded for `file`.
    #[must_use]
    pub fn for_file(&self, file: &Path) -> Vec<AnnotationSuppression> {
        self.entries().get(file).cloned().unwrap_or_default()
    }

    /// Returns true if an annotation in `file` covers `diagnostic`.
    #[must_use]
    pub fn is_suppressed(&self, file: &Path, diagnostic: &Diagnostic) -> bool {
        self.entries()
            .get(file)
            .is_some_and(|list| list.iter().any(|s| s.covers(diagnostic)))
    }
}

/// Rejects diagnostics covered by a recorded `@SuppressWarnings` annotation.
#[derive(Debug, Clone, Default)]
pub struct SuppressWarningsFilter {
    registry: SuppressWarningsRegistry,
}

impl SuppressWarningsFilter {
    /// Creates a filter reading `registry`.
    #[must_use]
    pub fn new(registry: SuppressWarningsRegistry) -> Self {
        Self { registry }
    }

    /// The registry this filter reads.
    #[must_use]
    pub fn registry(&self) -> &SuppressWarningsRegistry {
        &self.registry
    }
}

impl Filter for SuppressWarningsFilter {
    fn accept(&self, event: &AuditEvent<'_>) -> bool {
        !self.registry.is_suppressed(event.file, event.diagnostic)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::diagnostic::CheckIdentity;

    fn diagnostic(line: usize, column: usize, check: &str) -> Diagnostic {
        Diagnostic::new(
            line,
            column,
            "key",
            Vec::new(),
            Severity::Warning,
            CheckIdentity::named(check),
        )
    }

    fn event<'a>(file: &'a Path, diagnostic: &'a Diagnostic, message: &'a str) -> AuditEvent<'a> {
        AuditEvent {
            file,
            diagnostic,
            message,
        }
    }

    fn rule(config: SuppressionConfig) -> SuppressionRule {
        SuppressionRule::from_config(&config).unwrap()
    }

    #[test]
    fn range_set_parsing() {
        let set = IntRangeSet::parse("1,3, 10-20").unwrap();
        assert!(set.contains(1));
        assert!(!set.contains(2));
        assert!(set.contains(3));
        assert!(set.contains(15));
        assert!(set.contains(20));
        assert!(!set.contains(21));

        for bad in ["", "a", "5-", "7-3", "1,,2"] {
            assert!(
                matches!(IntRangeSet::parse(bad), Err(SuppressionError::Range(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn rule_matches_only_when_all_constraints_match() {
        let r = rule(SuppressionConfig {
            files: Some(r"Foo\.java$".into()),
            checks: Some("MagicNumber".into()),
            lines: Some("10-20".into()),
            ..SuppressionConfig::default()
        });
        let d = diagnostic(15, 0, "MagicNumber");
        assert!(!r.accept(&event(Path::new("src/Foo.java"), &d, "m")));
        assert!(r.accept(&event(Path::new("src/Bar.java"), &d, "m")));

        let outside = diagnostic(25, 0, "MagicNumber");
        assert!(r.accept(&event(Path::new("src/Foo.java"), &outside, "m")));

        let other = diagnostic(15, 0, "EqualsHashCode");
        assert!(r.accept(&event(Path::new("src/Foo.java"), &other, "m")));
    }

    #[test]
    fn rule_matches_check_id_and_message() {
        let r = rule(SuppressionConfig {
            checks: Some("^magic$".into()),
            message: Some("'42'".into()),
            ..SuppressionConfig::default()
        });
        let mut d = diagnostic(1, 0, "MagicNumber");
        d.check.id = Some("magic".into());
        assert!(!r.accept(&event(Path::new("A"), &d, "'42' is a magic number.")));
        assert!(r.accept(&event(Path::new("A"), &d, "'7' is a magic number.")));
    }

    #[test]
    fn invalid_rules_are_rejected() {
        let bad_regex = SuppressionRule::from_config(&SuppressionConfig {
            files: Some("(".into()),
            ..SuppressionConfig::default()
        });
        assert!(matches!(
            bad_regex,
            Err(SuppressionError::Pattern { field: "files", .. })
        ));
        assert!(matches!(
            SuppressionRule::from_config(&SuppressionConfig::default()),
            Err(SuppressionError::Unconstrained)
        ));
    }

    #[test]
    fn severity_filter() {
        let d = diagnostic(1, 0, "X");
        let e = event(Path::new("A"), &d, "");
        let drop_warnings = SeverityMatchFilter {
            severity: Severity::Warning,
            accept_on_match: false,
        };
        assert!(!drop_warnings.accept(&e));
        let keep_errors = SeverityMatchFilter {
            severity: Severity::Error,
            accept_on_match: true,
        };
        assert!(!keep_errors.accept(&e));
    }

    struct Counting {
        verdict: bool,
        calls: Arc<AtomicUsize>,
    }

    impl Filter for Counting {
        fn accept(&self, _event: &AuditEvent<'_>) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.verdict
        }
    }

    #[test]
    fn chain_short_circuits_on_first_rejection() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let mut chain = FilterChain::new();
        chain.push(Counting {
            verdict: false,
            calls: Arc::clone(&first),
        });
        chain.push(Counting {
            verdict: true,
            calls: Arc::clone(&second),
        });

        let d = diagnostic(1, 0, "X");
        assert!(!chain.accept(&event(Path::new("A"), &d, "")));
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
        assert!(FilterChain::new().accept(&event(Path::new("A"), &d, "")));
    }

    fn annotation(check: &str, first: (usize, usize), last: (usize, usize)) -> AnnotationSuppression {
        AnnotationSuppression {
            check: check.to_string(),
            first_line: first.0,
            first_column: first.1,
            last_line: last.0,
            last_column: last.1,
        }
    }

    #[test]
    fn annotation_range_covers_the_element_up_to_its_sibling() {
        let file = Path::new("A.ast");
        let registry = SuppressWarningsRegistry::new();
        registry.add(file, annotation("MagicNumber", (3, 4), (7, 4)));
        let filter = SuppressWarningsFilter::new(registry.clone());

        let verdict = |line, column, check: &str| {
            let d = diagnostic(line, column, check);
            filter.accept(&event(file, &d, ""))
        };
        assert!(!verdict(3, 4, "MagicNumber"));
        assert!(!verdict(5, 0, "MagicNumber"));
        assert!(!verdict(7, 4, "MagicNumber"));
        assert!(verdict(3, 2, "MagicNumber"));
        assert!(verdict(7, 5, "MagicNumber"));
        assert!(verdict(5, 0, "RedundantModifier"));

        let d = diagnostic(5, 0, "MagicNumber");
        assert!(filter.accept(&event(Path::new("B.ast"), &d, "")));

        registry.forget(file);
        assert!(verdict(5, 0, "MagicNumber"));
    }

    #[test]
    fn annotation_names_match_alias_id_or_all() {
        let file = Path::new("A.ast");
        let registry = SuppressWarningsRegistry::new();
        registry.add(file, annotation("magicnumber", (1, 0), (usize::MAX, usize::MAX)));
        registry.add(file, annotation("com.acme.RedundantModifierCheck", (1, 0), (2, 0)));
        registry.add(file, annotation("noSwitch", (3, 0), (4, 0)));
        registry.add(file, annotation("ALL", (10, 0), (11, 0)));

        let mut with_id = diagnostic(3, 2, "MissingSwitchDefault");
        with_id.check.id = Some("noSwitch".into());
        assert!(registry.is_suppressed(file, &diagnostic(50, 1, "MagicNumber")));
        assert!(registry.is_suppressed(file, &diagnostic(1, 3, "RedundantModifier")));
        assert!(registry.is_suppressed(file, &with_id));
        assert!(!registry.is_suppressed(file, &diagnostic(3, 2, "MissingSwitchDefault")));
        assert!(registry.is_suppressed(file, &diagnostic(10, 9, "EqualsHashCode")));
        assert_eq!(registry.for_file(file).len(), 4);
    }
}
