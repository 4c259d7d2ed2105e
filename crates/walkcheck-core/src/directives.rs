//! Comment-based suppression directives.
//!
//! Supports directives like:
//! ```text
//! // walkcheck: allow(MagicNumber) reason="protocol constant"
//! // walkcheck: allow(MagicNumber) range=3
//! // walkcheck: allow(MagicNumber) range=-2
//! // walkcheck: off(MagicNumber, AvoidInlineConditionals)
//! // walkcheck: on(MagicNumber, AvoidInlineConditionals)
//! ```
//!
//! `allow` covers the comment's own line plus `range` lines after it, or
//! before it when the range is negative. Without `range=` the file-wide
//! default applies, one following line unless configured otherwise. `off`
//! and `on` bracket a region. `all` names every check.

use std::collections::HashSet;

use crate::diagnostic::Diagnostic;
use crate::tokens::TokenKind;
use crate::tree::NodeRef;

/// Lines an `allow` covers after its own when no range is given.
pub const DEFAULT_ALLOW_RANGE: i64 = 1;

/// What a directive does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    /// Suppress on this line and a range of nearby lines.
    Allow,
    /// Start a suppressed region.
    Off,
    /// End a suppressed region.
    On,
}

/// Parsed directive.
#[derive(Debug, Clone)]
pub struct Directive {
    /// Directive kind.
    pub kind: DirectiveKind,
    /// Check names or ids covered.
    pub checks: HashSet<String>,
    /// Optional reason for the suppression.
    pub reason: Option<String>,
    /// Signed number of nearby lines an `allow` covers.
    pub range: Option<i64>,
    /// Line of the comment.
    pub line: usize,
}

impl Directive {
    /// True if an `allow` on this line with `range` reaches `line`.
    fn reaches(&self, line: usize, default_range: i64) -> bool {
        let range = self.range.unwrap_or(default_range);
        let (Ok(own), Ok(target)) = (i64::try_from(self.line), i64::try_from(line)) else {
            return false;
        };
        let (low, high) = if range < 0 {
            (own.saturating_add(range), own)
        } else {
            (own, own.saturating_add(range))
        };
        (low..=high).contains(&target)
    }

    fn covers(&self, diagnostic: &Diagnostic) -> bool {
        self.checks.contains("all")
            || self
                .checks
                .iter()
                .any(|name| diagnostic.check.answers_to(name))
    }
}

/// Parses a directive from the text of one comment.
///
/// Leading comment markers (`//`, `/*`, `*`) and trailing `*/` are ignored.
#[must_use]
pub fn parse_directive(comment: &str, line: usize) -> Option<Directive> {
    let mut text = comment.trim();
    for prefix in ["///", "//", "/**", "/*", "*"] {
        if let Some(rest) = text.strip_prefix(prefix) {
            text = rest.trim_start();
            break;
        }
    }
    let text = text.trim_end().trim_end_matches("*/").trim_end();

    let directive = text.strip_prefix("walkcheck:")?.trim_start();
    let (kind, rest) = if let Some(rest) = directive.strip_prefix("allow") {
        (DirectiveKind::Allow, rest)
    } else if let Some(rest) = directive.strip_prefix("off") {
        (DirectiveKind::Off, rest)
    } else if let Some(rest) = directive.strip_prefix("on") {
        (DirectiveKind::On, rest)
    } else {
        return None;
    };

    let rest = rest.trim_start();
    let (checks, rest) = if let Some(inner) = rest.strip_prefix('(') {
        let paren_end = inner.find(')')?;
        let checks: HashSet<String> = inner[..paren_end]
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if checks.is_empty() {
            return None;
        }
        (checks, inner[paren_end + 1..].trim())
    } else if kind == DirectiveKind::Allow {
        // allow must name what it allows
        return None;
    } else {
        (HashSet::from(["all".to_string()]), rest)
    };

    let mut reason = None;
    let mut range = None;
    let mut rest = rest;
    loop {
        if let Some(option) = rest.strip_prefix("reason=") {
            let Some((text, after)) = option
                .trim_start()
                .strip_prefix('"')
                .and_then(|quoted| quoted.split_once('"'))
            else {
                break;
            };
            reason = Some(text.to_string());
            rest = after.trim_start();
        } else if let Some(option) = rest.strip_prefix("range=") {
            let end = option.find(char::is_whitespace).unwrap_or(option.len());
            range = Some(option[..end].parse::<i64>().ok()?);
            rest = option[end..].trim_start();
        } else {
            break;
        }
    }

    Some(Directive {
        kind,
        checks,
        reason,
        range,
        line,
    })
}

/// Directives collected from the comments of one file.
#[derive(Debug, Clone)]
pub struct CommentSuppressions {
    allows: Vec<Directive>,
    toggles: Vec<Directive>,
    sorted: bool,
    default_range: i64,
}

impl Default for CommentSuppressions {
    fn default() -> Self {
        Self::with_default_range(DEFAULT_ALLOW_RANGE)
    }
}

impl CommentSuppressions {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty set where `allow` without `range=` covers
    /// `default_range` nearby lines.
    #[must_use]
    pub fn with_default_range(default_range: i64) -> Self {
        Self {
            allows: Vec::new(),
            toggles: Vec::new(),
            sorted: true,
            default_range,
        }
    }

    /// Records the directive carried by a comment node, if any.
    ///
    /// Accepts `SINGLE_LINE_COMMENT` and `BLOCK_COMMENT_BEGIN` nodes; the
    /// text is read from their `COMMENT_CONTENT` child when present.
    pub fn observe(&mut self, comment: NodeRef<'_>) {
        if !matches!(
            comment.kind(),
            TokenKind::SingleLineComment | TokenKind::BlockCommentBegin
        ) {
            return;
        }
        let text = comment
            .find_first_token(TokenKind::CommentContent)
            .map_or_else(|| comment.text(), |content| content.text());
        for (offset, line_text) in text.lines().enumerate() {
            if let Some(directive) = parse_directive(line_text, comment.line() + offset) {
                self.push(directive);
            }
        }
    }

    /// Adds a parsed directive.
    pub fn push(&mut self, directive: Directive) {
        match directive.kind {
            DirectiveKind::Allow => self.allows.push(directive),
            DirectiveKind::Off | DirectiveKind::On => {
                self.toggles.push(directive);
                self.sorted = false;
            }
        }
    }

    /// Returns true if no directive was seen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.allows.is_empty() && self.toggles.is_empty()
    }

    /// Returns true if a directive suppresses the diagnostic.
    ///
    /// File-level diagnostics are never suppressed by comments.
    pub fn is_suppressed(&mut self, diagnostic: &Diagnostic) -> bool {
        if diagnostic.is_file_level() || self.is_empty() {
            return false;
        }
        if !self.sorted {
            self.toggles.sort_by_key(|d| d.line);
            self.sorted = true;
        }

        let line = diagnostic.line;
        let allowed = self
            .allows
            .iter()
            .any(|d| d.reaches(line, self.default_range) && d.covers(diagnostic));
        if allowed {
            return true;
        }

        self.toggles
            .iter()
            .rev()
            .find(|d| d.line <= line && d.covers(diagnostic))
            .is_some_and(|d| d.kind == DirectiveKind::Off)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::{CheckIdentity, Severity};

    fn diag(line: usize, check: &str) -> Diagnostic {
        Diagnostic::new(
            line,
            0,
            "k",
            Vec::new(),
            Severity::Error,
            CheckIdentity::named(check),
        )
    }

    #[test]
    fn test_parse_allow_directive() {
        let directive = parse_directive("// walkcheck: allow(MagicNumber)", 3).unwrap();
        assert_eq!(directive.kind, DirectiveKind::Allow);
        assert!(directive.checks.contains("MagicNumber"));
        assert!(directive.reason.is_none());
        assert_eq!(directive.line, 3);
    }

    #[test]
    fn test_parse_allow_directive_with_reason() {
        let directive =
            parse_directive(" walkcheck: allow(MagicNumber) reason=\"wire format\"", 1).unwrap();
        assert_eq!(directive.reason.as_deref(), Some("wire format"));
    }

    #[test]
    fn test_parse_multiple_checks_and_block_comment() {
        let directive = parse_directive("/* walkcheck: off(A, B, C) */", 1).unwrap();
        assert_eq!(directive.kind, DirectiveKind::Off);
        assert_eq!(directive.checks.len(), 3);

        let bare = parse_directive("walkcheck: on", 9).unwrap();
        assert!(bare.checks.contains("all"));
        assert!(parse_directive("walkcheck: allow", 1).is_none());
        assert!(parse_directive("walkcheck: allow()", 1).is_none());
        assert!(parse_directive("just a comment", 1).is_none());
    }

    #[test]
    fn allow_covers_own_and_next_line() {
        let mut suppressions = CommentSuppressions::new();
        suppressions.push(parse_directive("walkcheck: allow(MagicNumber)", 5).unwrap());

        assert!(suppressions.is_suppressed(&diag(5, "MagicNumber")));
        assert!(suppressions.is_suppressed(&diag(6, "MagicNumber")));
        assert!(!suppressions.is_suppressed(&diag(7, "MagicNumber")));
        assert!(!suppressions.is_suppressed(&diag(6, "EqualsHashCode")));
        assert!(!suppressions.is_suppressed(&diag(0, "MagicNumber")));
    }

    #[test]
    fn off_on_regions() {
        let mut suppressions = CommentSuppressions::new();
        // pushed out of order on purpose
        suppressions.push(parse_directive("walkcheck: on(MagicNumber)", 20).unwrap());
        suppressions.push(parse_directive("walkcheck: off(MagicNumber)", 10).unwrap());
        suppressions.push(parse_directive("walkcheck: off", 30).unwrap());

        assert!(!suppressions.is_suppressed(&diag(9, "MagicNumber")));
        assert!(suppressions.is_suppressed(&diag(15, "MagicNumber")));
        assert!(!suppressions.is_suppressed(&diag(15, "Other")));
        assert!(!suppressions.is_suppressed(&diag(25, "MagicNumber")));
        assert!(suppressions.is_suppressed(&diag(31, "Other")));
        assert!(suppressions.is_suppressed(&diag(31, "MagicNumber")));
    }

    #[test]
    fn test_parse_range_option() {
        let directive =
            parse_directive("walkcheck: allow(A) range=-2 reason=\"moved up\"", 4).unwrap();
        assert_eq!(directive.range, Some(-2));
        assert_eq!(directive.reason.as_deref(), Some("moved up"));

        let directive = parse_directive("walkcheck: allow(A) reason=\"x\" range=+3", 4).unwrap();
        assert_eq!(directive.range, Some(3));
        assert!(parse_directive("walkcheck: allow(A) range=many", 4).is_none());
    }

    #[test]
    fn allow_range_reaches_nearby_lines() {
        let mut suppressions = CommentSuppressions::new();
        suppressions.push(parse_directive("walkcheck: allow(A) range=3", 10).unwrap());
        suppressions.push(parse_directive("walkcheck: allow(B) range=-2", 10).unwrap());
        suppressions.push(parse_directive("walkcheck: allow(C) range=0", 10).unwrap());

        let covered = |suppressions: &mut CommentSuppressions, check: &str| -> Vec<usize> {
            (5..=15)
                .filter(|&line| suppressions.is_suppressed(&diag(line, check)))
                .collect()
        };
        assert_eq!(covered(&mut suppressions, "A"), vec![10, 11, 12, 13]);
        assert_eq!(covered(&mut suppressions, "B"), vec![8, 9, 10]);
        assert_eq!(covered(&mut suppressions, "C"), vec![10]);
    }

    #[test]
    fn default_range_is_configurable() {
        let mut suppressions = CommentSuppressions::with_default_range(2);
        suppressions.push(parse_directive("walkcheck: allow(A)", 1).unwrap());
        suppressions.push(parse_directive("walkcheck: allow(B) range=0", 1).unwrap());

        assert!(suppressions.is_suppressed(&diag(3, "A")));
        assert!(!suppressions.is_suppressed(&diag(4, "A")));
        assert!(!suppressions.is_suppressed(&diag(2, "B")));
    }
}
