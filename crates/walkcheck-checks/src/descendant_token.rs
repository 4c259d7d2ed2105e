//! Check: descendant-token
//!
//! Counts descendants of configured kinds below each subscribed node and
//! reports counts outside a range.
//!
//! # Rationale
//!
//! Many structural rules reduce to "at most N of these under one of
//! those": no `return` inside `finally`, at most one `return` per method,
//! every `switch` has a `default`. One configurable counter covers them all
//! without a bespoke check per rule.
//!
//! # Configuration
//!
//! ```toml
//! [[checks]]
//! name = "DescendantToken"
//! tokens = ["LITERAL_FINALLY"]
//! [checks.properties]
//! limited_tokens = ["LITERAL_RETURN"]
//! maximum_number = 0
//! maximum_message = "Return from finally is not allowed."
//! ```
//!
//! | Property | Default | Meaning |
//! |----------|---------|---------|
//! | `limited_tokens` | none | kinds to count |
//! | `minimum_depth` | 0 | shallowest depth counted (the node itself is 0) |
//! | `maximum_depth` | unbounded | deepest depth counted |
//! | `minimum_number` | 0 | fewer is reported |
//! | `maximum_number` | unbounded | more is reported |
//! | `sum_token_counts` | false | compare the total instead of each kind |
//! | `minimum_message` | key | message or key for the minimum violation |
//! | `maximum_message` | key | message or key for the maximum violation |
//!
//! The check subscribes to nothing by default; `tokens` must be configured.

use walkcheck_core::{
    property, Check, CheckContext, CheckResult, NodeRef, PropertyError, TokenKind, TokenSet,
};

/// Registered check name.
pub const NAME: &str = "DescendantToken";

/// Count of a single kind below the minimum.
pub const MSG_KEY_MIN: &str = "descendant.token.min";
/// Count of a single kind above the maximum.
pub const MSG_KEY_MAX: &str = "descendant.token.max";
/// Total count below the minimum.
pub const MSG_KEY_SUM_MIN: &str = "descendant.token.sum.min";
/// Total count above the maximum.
pub const MSG_KEY_SUM_MAX: &str = "descendant.token.sum.max";

/// Counts nodes of the given kinds in the subtree of `node`, depth
/// relative to `node` in `min_depth..=max_depth`. Results follow the order
/// of `kinds`.
pub(crate) fn count_descendants(
    node: NodeRef<'_>,
    kinds: &[TokenKind],
    min_depth: usize,
    max_depth: usize,
) -> Vec<usize> {
    let mut counts = vec![0; kinds.len()];
    let mut stack = vec![(node, 0usize)];
    while let Some((current, depth)) = stack.pop() {
        if depth >= min_depth {
            for (count, kind) in counts.iter_mut().zip(kinds) {
                if current.is(*kind) {
                    *count += 1;
                }
            }
        }
        if depth < max_depth {
            stack.extend(current.children().map(|c| (c, depth + 1)));
        }
    }
    counts
}

/// Configurable descendant counter.
#[derive(Debug, Clone)]
pub struct DescendantToken {
    limited_tokens: Vec<TokenKind>,
    minimum_depth: usize,
    maximum_depth: usize,
    minimum_number: usize,
    maximum_number: usize,
    sum_token_counts: bool,
    minimum_message: Option<String>,
    maximum_message: Option<String>,
}

impl Default for DescendantToken {
    fn default() -> Self {
        Self::new()
    }
}

impl DescendantToken {
    /// Creates the check with no limited tokens and unbounded limits.
    #[must_use]
    pub fn new() -> Self {
        Self {
            limited_tokens: Vec::new(),
            minimum_depth: 0,
            maximum_depth: usize::MAX,
            minimum_number: 0,
            maximum_number: usize::MAX,
            sum_token_counts: false,
            minimum_message: None,
            maximum_message: None,
        }
    }

    /// Sets the kinds to count.
    #[must_use]
    pub fn limited_tokens(mut self, kinds: &[TokenKind]) -> Self {
        self.limited_tokens = kinds.to_vec();
        self
    }

    /// Sets the depth range counted.
    #[must_use]
    pub fn depth(mut self, minimum: usize, maximum: usize) -> Self {
        self.minimum_depth = minimum;
        self.maximum_depth = maximum;
        self
    }

    /// Sets the minimum count.
    #[must_use]
    pub fn minimum_number(mut self, minimum: usize) -> Self {
        self.minimum_number = minimum;
        self
    }

    /// Sets the maximum count.
    #[must_use]
    pub fn maximum_number(mut self, maximum: usize) -> Self {
        self.maximum_number = maximum;
        self
    }

    /// Compares the sum of all counts instead of each count.
    #[must_use]
    pub fn sum_token_counts(mut self, sum: bool) -> Self {
        self.sum_token_counts = sum;
        self
    }

    /// Message (or key) used for minimum violations.
    #[must_use]
    pub fn minimum_message(mut self, message: impl Into<String>) -> Self {
        self.minimum_message = Some(message.into());
        self
    }

    /// Message (or key) used for maximum violations.
    #[must_use]
    pub fn maximum_message(mut self, message: impl Into<String>) -> Self {
        self.maximum_message = Some(message.into());
        self
    }

    fn log_separately(&self, ctx: &mut CheckContext<'_>, node: NodeRef<'_>, counts: &[usize]) {
        let min_key = self.minimum_message.as_deref().unwrap_or(MSG_KEY_MIN);
        let max_key = self.maximum_message.as_deref().unwrap_or(MSG_KEY_MAX);
        for (kind, &count) in self.limited_tokens.iter().zip(counts) {
            if count < self.minimum_number {
                ctx.log(
                    node,
                    min_key,
                    [
                        count.to_string(),
                        self.minimum_number.to_string(),
                        node.kind().name().to_string(),
                        kind.name().to_string(),
                    ],
                );
            }
            if count > self.maximum_number {
                ctx.log(
                    node,
                    max_key,
                    [
                        count.to_string(),
                        self.maximum_number.to_string(),
                        node.kind().name().to_string(),
                        kind.name().to_string(),
                    ],
                );
            }
        }
    }

    fn log_total(&self, ctx: &mut CheckContext<'_>, node: NodeRef<'_>, counts: &[usize]) {
        let total: usize = counts.iter().sum();
        let args = |limit: usize| {
            [
                total.to_string(),
                limit.to_string(),
                node.kind().name().to_string(),
            ]
        };
        if total < self.minimum_number {
            let key = self.minimum_message.as_deref().unwrap_or(MSG_KEY_SUM_MIN);
            ctx.log(node, key, args(self.minimum_number));
        }
        if total > self.maximum_number {
            let key = self.maximum_message.as_deref().unwrap_or(MSG_KEY_SUM_MAX);
            ctx.log(node, key, args(self.maximum_number));
        }
    }
}

impl Check for DescendantToken {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Limits the number of descendants of given kinds below a node"
    }

    fn default_tokens(&self) -> TokenSet {
        TokenSet::EMPTY
    }

    fn acceptable_tokens(&self) -> TokenSet {
        TokenSet::all()
    }

    fn wants_leave_events(&self) -> bool {
        false
    }

    fn default_messages(&self) -> &'static [(&'static str, &'static str)] {
        &[
            (
                MSG_KEY_MIN,
                "Count of {0} for ''{2}'' descendant ''{3}'' is less than minimum count {1}.",
            ),
            (
                MSG_KEY_MAX,
                "Count of {0} for ''{2}'' descendant ''{3}'' exceeds maximum count {1}.",
            ),
            (
                MSG_KEY_SUM_MIN,
                "Total count of {0} is less than minimum count {1} under ''{2}''.",
            ),
            (
                MSG_KEY_SUM_MAX,
                "Total count of {0} exceeds maximum count {1} under ''{2}''.",
            ),
        ]
    }

    fn set_property(&mut self, name: &str, value: &toml::Value) -> Result<(), PropertyError> {
        match name {
            "limited_tokens" => {
                self.limited_tokens = property::as_token_set(name, value)?.iter().collect();
            }
            "minimum_depth" => self.minimum_depth = property::as_usize(name, value)?,
            "maximum_depth" => self.maximum_depth = property::as_usize(name, value)?,
            "minimum_number" => self.minimum_number = property::as_usize(name, value)?,
            "maximum_number" => self.maximum_number = property::as_usize(name, value)?,
            "sum_token_counts" => self.sum_token_counts = property::as_bool(name, value)?,
            "minimum_message" => self.minimum_message = Some(property::as_string(name, value)?),
            "maximum_message" => self.maximum_message = Some(property::as_string(name, value)?),
            other => return Err(PropertyError::Unknown(other.to_string())),
        }
        Ok(())
    }

    fn visit_token(&mut self, ctx: &mut CheckContext<'_>, node: NodeRef<'_>) -> CheckResult {
        let counts = count_descendants(
            node,
            &self.limited_tokens,
            self.minimum_depth,
            self.maximum_depth,
        );
        if self.sum_token_counts {
            self.log_total(ctx, node, &counts);
        } else {
            self.log_separately(ctx, node, &counts);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{check_tree_with, message, summary, tree};
    use walkcheck_core::CheckSettings;

    // try { return 1; } finally { if (x) { return 2; } return 3; }
    const FINALLY: &str = r"COMPILATION_UNIT -> COMPILATION_UNIT [1:0]
`--LITERAL_TRY -> try [1:0]
    |--SLIST -> { [1:4]
    |   |--LITERAL_RETURN -> return [1:6]
    |   |   |--EXPR -> EXPR [1:13]
    |   |   |   `--NUM_INT -> 1 [1:13]
    |   |   `--SEMI -> ; [1:14]
    |   `--RCURLY -> } [1:16]
    `--LITERAL_FINALLY -> finally [1:18]
        `--SLIST -> { [1:26]
            |--LITERAL_IF -> if [1:28]
            |   |--LPAREN -> ( [1:31]
            |   |--EXPR -> EXPR [1:32]
            |   |   `--IDENT -> x [1:32]
            |   |--RPAREN -> ) [1:33]
            |   `--SLIST -> { [1:35]
            |       |--LITERAL_RETURN -> return [1:37]
            |       |   |--EXPR -> EXPR [1:44]
            |       |   |   `--NUM_INT -> 2 [1:44]
            |       |   `--SEMI -> ; [1:45]
            |       `--RCURLY -> } [1:47]
            |--LITERAL_RETURN -> return [1:49]
            |   |--EXPR -> EXPR [1:56]
            |   |   `--NUM_INT -> 3 [1:56]
            |   `--SEMI -> ; [1:57]
            `--RCURLY -> } [1:59]
";

    fn on(kinds: &[TokenKind]) -> CheckSettings {
        CheckSettings::default().tokens(TokenSet::of(kinds))
    }

    #[test]
    fn test_count_descendants_respects_depth() {
        let t = tree(FINALLY);
        let finally = t
            .root()
            .descendants()
            .find(|n| n.is(TokenKind::LiteralFinally))
            .unwrap();
        let returns = [TokenKind::LiteralReturn];
        assert_eq!(count_descendants(finally, &returns, 0, usize::MAX), vec![2]);
        assert_eq!(count_descendants(finally, &returns, 0, 2), vec![1]);
        assert_eq!(count_descendants(finally, &returns, 3, usize::MAX), vec![1]);
        assert_eq!(
            count_descendants(finally, &[TokenKind::LiteralFinally], 0, 0),
            vec![1]
        );
    }

    #[test]
    fn test_reports_maximum_per_kind() {
        let check = DescendantToken::new()
            .limited_tokens(&[TokenKind::LiteralReturn])
            .maximum_number(0);
        let diagnostics = check_tree_with(
            Box::new(check),
            on(&[TokenKind::LiteralFinally]),
            FINALLY,
        );
        assert_eq!(
            summary(&diagnostics),
            vec![r#"1:18 descendant.token.max ["2", "0", "LITERAL_FINALLY", "LITERAL_RETURN"]"#]
        );
        assert_eq!(
            message(&DescendantToken::new(), &diagnostics[0]),
            "Count of 2 for 'LITERAL_FINALLY' descendant 'LITERAL_RETURN' exceeds maximum count 0."
        );
    }

    #[test]
    fn test_reports_minimum_and_sum() {
        let check = DescendantToken::new()
            .limited_tokens(&[TokenKind::LiteralIf, TokenKind::LiteralReturn])
            .minimum_number(3);
        let diagnostics = check_tree_with(
            Box::new(check),
            on(&[TokenKind::LiteralFinally]),
            FINALLY,
        );
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|d| d.key == MSG_KEY_MIN));

        let summed = DescendantToken::new()
            .limited_tokens(&[TokenKind::LiteralIf, TokenKind::LiteralReturn])
            .minimum_number(3)
            .sum_token_counts(true);
        let diagnostics = check_tree_with(
            Box::new(summed),
            on(&[TokenKind::LiteralFinally]),
            FINALLY,
        );
        assert!(diagnostics.is_empty(), "1 if + 2 returns meets the minimum");
    }

    #[test]
    fn test_custom_message_replaces_key() {
        let check = DescendantToken::new()
            .limited_tokens(&[TokenKind::LiteralReturn])
            .maximum_number(0)
            .sum_token_counts(true)
            .maximum_message("Return from finally is not allowed.");
        let diagnostics = check_tree_with(
            Box::new(check),
            on(&[TokenKind::LiteralFinally]),
            FINALLY,
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            message(&DescendantToken::new(), &diagnostics[0]),
            "Return from finally is not allowed."
        );
    }

    #[test]
    fn test_properties() {
        let mut check = DescendantToken::new();
        check
            .set_property(
                "limited_tokens",
                &toml::Value::from(vec!["LITERAL_RETURN", "LITERAL_THROW"]),
            )
            .unwrap();
        check
            .set_property("maximum_depth", &toml::Value::Integer(2))
            .unwrap();
        check
            .set_property("sum_token_counts", &toml::Value::Boolean(true))
            .unwrap();
        assert_eq!(
            check.limited_tokens,
            vec![TokenKind::LiteralReturn, TokenKind::LiteralThrow]
        );
        assert_eq!(check.maximum_depth, 2);
        assert!(check.sum_token_counts);

        assert!(matches!(
            check.set_property("maximum_depth", &toml::Value::Integer(-1)),
            Err(PropertyError::InvalidValue { .. })
        ));
        assert!(matches!(
            check.set_property("limited_tokens", &toml::Value::from("NOPE")),
            Err(PropertyError::Token(_))
        ));
        assert!(matches!(
            check.set_property("colour", &toml::Value::Boolean(true)),
            Err(PropertyError::Unknown(_))
        ));
    }
}
