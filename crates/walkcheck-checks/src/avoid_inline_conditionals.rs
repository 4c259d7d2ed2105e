//! Check: avoid-inline-conditionals
//!
//! Reports every conditional (`?:`) expression.
//!
//! # Rationale
//!
//! Inline conditionals pack a branch into an expression. Nested or long ones
//! are hard to read and hard to set a breakpoint on; an `if` statement says
//! the same thing with visible structure.
//!
//! # Detected Patterns
//!
//! ```text
//! int max = a > b ? a : b;    // reported at the `?`
//! ```

use walkcheck_core::{Check, CheckContext, CheckResult, NodeRef, TokenKind, TokenSet, NO_ARGS};

/// Registered check name.
pub const NAME: &str = "AvoidInlineConditionals";

/// Message key.
pub const MSG_KEY: &str = "inline.conditional.avoid";

/// Reports `QUESTION` nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AvoidInlineConditionals;

impl AvoidInlineConditionals {
    /// Creates the check.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Check for AvoidInlineConditionals {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Reports inline conditional (?:) expressions"
    }

    fn default_tokens(&self) -> TokenSet {
        TokenSet::of(&[TokenKind::Question])
    }

    fn required_tokens(&self) -> TokenSet {
        TokenSet::of(&[TokenKind::Question])
    }

    fn wants_leave_events(&self) -> bool {
        false
    }

    fn default_messages(&self) -> &'static [(&'static str, &'static str)] {
        &[(MSG_KEY, "Avoid inline conditionals.")]
    }

    fn visit_token(&mut self, ctx: &mut CheckContext<'_>, node: NodeRef<'_>) -> CheckResult {
        ctx.log(node, MSG_KEY, NO_ARGS);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{check_tree, summary};

    // class A { int f(boolean a, int b, int c) { return a ? b : c; } }
    const TERNARY: &str = r"COMPILATION_UNIT -> COMPILATION_UNIT [1:0]
`--CLASS_DEF -> CLASS_DEF [1:0]
    |--MODIFIERS -> MODIFIERS [1:0]
    |--LITERAL_CLASS -> class [1:0]
    |--IDENT -> A [1:6]
    `--OBJBLOCK -> OBJBLOCK [1:8]
        `--METHOD_DEF -> METHOD_DEF [2:4]
            |--MODIFIERS -> MODIFIERS [2:4]
            |--TYPE -> TYPE [2:4]
            |   `--LITERAL_INT -> int [2:4]
            |--IDENT -> f [2:8]
            |--LPAREN -> ( [2:9]
            |--PARAMETERS -> PARAMETERS [2:10]
            |--RPAREN -> ) [2:10]
            `--SLIST -> { [2:12]
                |--LITERAL_RETURN -> return [3:8]
                |   |--EXPR -> EXPR [3:17]
                |   |   `--QUESTION -> ? [3:17]
                |   |       |--IDENT -> a [3:15]
                |   |       |--IDENT -> b [3:19]
                |   |       |--COLON -> : [3:21]
                |   |       `--IDENT -> c [3:23]
                |   `--SEMI -> ; [3:24]
                `--RCURLY -> } [4:4]
";

    #[test]
    fn test_reports_ternary_at_question_mark() {
        let diagnostics = check_tree(Box::new(AvoidInlineConditionals::new()), TERNARY);
        assert_eq!(
            summary(&diagnostics),
            vec![r#"3:17 inline.conditional.avoid []"#]
        );
        assert_eq!(diagnostics[0].check.name, NAME);
    }

    #[test]
    fn test_no_ternary_no_diagnostics() {
        let plain = TERNARY.replace("QUESTION -> ?", "PLUS -> +");
        assert!(check_tree(Box::new(AvoidInlineConditionals::new()), &plain).is_empty());
    }
}
