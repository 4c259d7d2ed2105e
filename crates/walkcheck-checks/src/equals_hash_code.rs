//! Check: equals-hash-code
//!
//! Reports types that override `equals(Object)` without `hashCode()`, or
//! the other way round.
//!
//! # Rationale
//!
//! Equal objects must have equal hash codes. A type that only overrides one
//! of the pair breaks every hash-based collection it is put into.
//!
//! # Detected Patterns
//!
//! Definitions are collected per type body during the walk and matched at
//! the end of the file:
//!
//! ```text
//! class A {
//!     public boolean equals(Object o) { ... }   // equals.noHashCode
//! }
//! class B {
//!     public int hashCode() { ... }             // equals.noEquals
//! }
//! ```
//!
//! Only `equals` with exactly one parameter of type `Object` (or
//! `java.lang.Object`) and a zero-argument `hashCode` count. Static and
//! abstract methods are ignored.

use std::collections::BTreeMap;

use walkcheck_core::{
    Check, CheckContext, CheckError, CheckResult, NodeId, NodeRef, TokenKind, TokenSet, NO_ARGS,
};

/// Registered check name.
pub const NAME: &str = "EqualsHashCode";

/// `equals` without `hashCode`.
pub const MSG_KEY_HASHCODE: &str = "equals.noHashCode";

/// `hashCode` without `equals`.
pub const MSG_KEY_EQUALS: &str = "equals.noEquals";

/// Position of a collected method definition.
#[derive(Debug, Clone, Copy)]
struct Definition {
    line: usize,
    column: usize,
}

/// Cross-references `equals` and `hashCode` per type body.
#[derive(Debug, Default)]
pub struct EqualsHashCode {
    // keyed by the OBJBLOCK holding the method
    equals: BTreeMap<NodeId, Definition>,
    hash_code: BTreeMap<NodeId, Definition>,
}

impl EqualsHashCode {
    /// Creates the check.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn method_name(method: NodeRef<'_>) -> Option<&str> {
    method.find_first_token(TokenKind::Ident).map(NodeRef::text)
}

fn modifier(method: NodeRef<'_>, kind: TokenKind) -> bool {
    method
        .find_first_token(TokenKind::Modifiers)
        .is_some_and(|mods| mods.find_first_token(kind).is_some())
}

fn parameters(method: NodeRef<'_>) -> Vec<NodeRef<'_>> {
    method
        .find_first_token(TokenKind::Parameters)
        .map(|params| {
            params
                .children()
                .filter(|p| p.is(TokenKind::ParameterDef))
                .collect()
        })
        .unwrap_or_default()
}

fn is_object_type(parameter: NodeRef<'_>) -> bool {
    let Some(ty) = parameter
        .find_first_token(TokenKind::Type)
        .and_then(NodeRef::first_child)
    else {
        return false;
    };
    match ty.kind() {
        TokenKind::Ident => ty.text() == "Object",
        TokenKind::Dot => {
            let mut parts = Vec::new();
            let mut stack = vec![ty];
            while let Some(node) = stack.pop() {
                if node.is(TokenKind::Ident) {
                    parts.push(node.text());
                }
                stack.extend(node.children().rev());
            }
            parts == ["java", "lang", "Object"]
        }
        _ => false,
    }
}

fn is_equals(method: NodeRef<'_>) -> bool {
    let params = parameters(method);
    method_name(method) == Some("equals")
        && !modifier(method, TokenKind::LiteralStatic)
        && (method.find_first_token(TokenKind::Slist).is_some()
            || modifier(method, TokenKind::LiteralNative))
        && params.len() == 1
        && is_object_type(params[0])
}

fn is_hash_code(method: NodeRef<'_>) -> bool {
    method_name(method) == Some("hashCode")
        && !modifier(method, TokenKind::LiteralStatic)
        && !modifier(method, TokenKind::Abstract)
        && parameters(method).is_empty()
}

impl Check for EqualsHashCode {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Requires equals(Object) and hashCode() to be overridden together"
    }

    fn default_tokens(&self) -> TokenSet {
        TokenSet::of(&[TokenKind::MethodDef])
    }

    fn required_tokens(&self) -> TokenSet {
        TokenSet::of(&[TokenKind::MethodDef])
    }

    fn wants_leave_events(&self) -> bool {
        false
    }

    fn default_messages(&self) -> &'static [(&'static str, &'static str)] {
        &[
            (
                MSG_KEY_HASHCODE,
                "Definition of ''equals()'' without corresponding definition of ''hashCode()''.",
            ),
            (
                MSG_KEY_EQUALS,
                "Definition of ''hashCode()'' without corresponding definition of ''equals()''.",
            ),
        ]
    }

    fn begin_tree(&mut self, _ctx: &mut CheckContext<'_>, _root: NodeRef<'_>) -> CheckResult {
        self.equals.clear();
        self.hash_code.clear();
        Ok(())
    }

    fn visit_token(&mut self, _ctx: &mut CheckContext<'_>, node: NodeRef<'_>) -> CheckResult {
        if !node.is(TokenKind::MethodDef) {
            return Err(CheckError::unexpected(node));
        }
        let target = if is_equals(node) {
            &mut self.equals
        } else if is_hash_code(node) {
            &mut self.hash_code
        } else {
            return Ok(());
        };
        let Some(body) = node.parent() else {
            return Err(CheckError::malformed(node, "method without enclosing body"));
        };
        target.insert(
            body.id(),
            Definition {
                line: node.line(),
                column: node.column(),
            },
        );
        Ok(())
    }

    fn finish_tree(&mut self, ctx: &mut CheckContext<'_>, _root: NodeRef<'_>) -> CheckResult {
        for (body, def) in &self.equals {
            if !self.hash_code.contains_key(body) {
                ctx.log_at(def.line, def.column, MSG_KEY_HASHCODE, NO_ARGS);
            }
        }
        for (body, def) in &self.hash_code {
            if !self.equals.contains_key(body) {
                ctx.log_at(def.line, def.column, MSG_KEY_EQUALS, NO_ARGS);
            }
        }
        self.equals.clear();
        self.hash_code.clear();
        Ok(())
    }
}
