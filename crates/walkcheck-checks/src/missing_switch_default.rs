//! Check: missing-switch-default
//!
//! Reports `switch` statements and expressions without a `default` label.
//!
//! # Rationale
//!
//! A `default` branch documents that every other value was considered, even
//! if it only throws. Without one, a new enum constant or an unexpected input
//! falls through silently.
//!
//! # Detected Patterns
//!
//! A `LITERAL_SWITCH` with no `LITERAL_DEFAULT` within two levels below it,
//! i.e. directly under one of its `CASE_GROUP` or `SWITCH_RULE` children.
//! Defaults of nested switches sit deeper and do not count.

use walkcheck_core::{Check, CheckContext, CheckResult, NodeRef, TokenKind, TokenSet, NO_ARGS};

use crate::descendant_token::count_descendants;

/// Registered check name.
pub const NAME: &str = "MissingSwitchDefault";

/// Message key.
pub const MSG_KEY: &str = "missing.switch.default";

const DEFAULT_DEPTH: usize = 2;

/// Reports switches without a default label.
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingSwitchDefault;

impl MissingSwitchDefault {
    /// Creates the check.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Check for MissingSwitchDefault {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Requires a default label in every switch"
    }

    fn default_tokens(&self) -> TokenSet {
        TokenSet::of(&[TokenKind::LiteralSwitch])
    }

    fn required_tokens(&self) -> TokenSet {
        TokenSet::of(&[TokenKind::LiteralSwitch])
    }

    fn wants_leave_events(&self) -> bool {
        false
    }

    fn default_messages(&self) -> &'static [(&'static str, &'static str)] {
        &[(MSG_KEY, "switch without \"default\" clause.")]
    }

    fn visit_token(&mut self, ctx: &mut CheckContext<'_>, node: NodeRef<'_>) -> CheckResult {
        let defaults = count_descendants(node, &[TokenKind::LiteralDefault], 1, DEFAULT_DEPTH);
        if defaults[0] == 0 {
            ctx.log(node, MSG_KEY, NO_ARGS);
        }
        Ok(())
    }
}
