//! Checks: super-clone, super-finalize
//!
//! Reports overrides of `clone()` and `finalize()` that never call the
//! superclass implementation.
//!
//! # Rationale
//!
//! `Object.clone()` allocates the copy and `Object.finalize()` releases
//! resources held by the superclass chain. An override that skips
//! `super.clone()` returns an object of the wrong class for subclasses; one
//! that skips `super.finalize()` leaks whatever the parent meant to clean up.
//!
//! # Detected Patterns
//!
//! ```text
//! protected Object clone() {        // missing.super.call, reported here
//!     return new Foo(this);
//! }
//! ```
//!
//! A method counts as an override when it has the watched name, no
//! parameters, is not `native` and is declared in a class body. A call
//! counts when `super.<name>()` with no arguments appears anywhere in its
//! body outside nested type declarations. Calls inside lambdas count for
//! the enclosing method.
//!
//! Open methods are tracked on a stack so local and anonymous classes
//! inside an override are checked independently.

use walkcheck_core::{
    scope, Check, CheckContext, CheckError, CheckResult, NodeRef, TokenKind, TokenSet,
};

/// Registered name of the `clone()` check.
pub const CLONE_NAME: &str = "SuperClone";

/// Registered name of the `finalize()` check.
pub const FINALIZE_NAME: &str = "SuperFinalize";

/// Message key.
pub const MSG_KEY: &str = "missing.super.call";

const MESSAGES: &[(&str, &str)] = &[(MSG_KEY, "Method ''{0}'' should call ''super.{0}''.")];

#[derive(Debug)]
struct OpenMethod {
    calls_super: bool,
}

/// Shared logic for checks that require a super call from an override.
#[derive(Debug)]
struct SuperCallTracker {
    method_name: &'static str,
    open: Vec<OpenMethod>,
}

impl SuperCallTracker {
    fn new(method_name: &'static str) -> Self {
        Self {
            method_name,
            open: Vec::new(),
        }
    }

    fn tokens() -> TokenSet {
        TokenSet::of(&[TokenKind::MethodDef, TokenKind::LiteralSuper])
    }

    fn is_overriding(&self, method: NodeRef<'_>) -> bool {
        method.is(TokenKind::MethodDef)
            && !scope::is_in_interface_or_annotation_block(method)
            && method
                .find_first_token(TokenKind::Ident)
                .is_some_and(|ident| ident.text() == self.method_name)
            && !scope::has_modifier(method, TokenKind::LiteralNative)
            && method
                .find_first_token(TokenKind::Parameters)
                .is_some_and(|params| !params.has_children())
    }

    /// `super.<name>()` with no arguments, where the nearest enclosing
    /// method is a watched override.
    fn is_super_call(&self, literal_super: NodeRef<'_>) -> bool {
        let Some(dot) = literal_super.parent().filter(|p| p.is(TokenKind::Dot)) else {
            return false;
        };
        let same_name = literal_super
            .next_sibling()
            .is_some_and(|ident| ident.is(TokenKind::Ident) && ident.text() == self.method_name);
        let no_arguments = dot
            .next_sibling()
            .is_some_and(|elist| elist.is(TokenKind::Elist) && !elist.has_children());
        if !same_name || !no_arguments {
            return false;
        }
        for ancestor in dot.ancestors() {
            if ancestor.is(TokenKind::MethodDef) {
                return self.is_overriding(ancestor);
            }
            if ancestor.kind().is_type_declaration()
                || ancestor.is(TokenKind::LiteralNew)
                || ancestor.is(TokenKind::EnumConstantDef)
            {
                return false;
            }
        }
        false
    }

    fn begin(&mut self) {
        self.open.clear();
    }

    fn visit(&mut self, node: NodeRef<'_>) -> CheckResult {
        match node.kind() {
            TokenKind::MethodDef => {
                if self.is_overriding(node) {
                    self.open.push(OpenMethod { calls_super: false });
                }
            }
            TokenKind::LiteralSuper => {
                if self.is_super_call(node) {
                    if let Some(top) = self.open.last_mut() {
                        top.calls_super = true;
                    }
                }
            }
            _ => return Err(CheckError::unexpected(node)),
        }
        Ok(())
    }

    fn leave(&mut self, ctx: &mut CheckContext<'_>, node: NodeRef<'_>) -> CheckResult {
        if !node.is(TokenKind::MethodDef) || !self.is_overriding(node) {
            return Ok(());
        }
        let Some(method) = self.open.pop() else {
            return Err(CheckError::malformed(node, "override left without being entered"));
        };
        if !method.calls_super {
            ctx.log(node, MSG_KEY, [self.method_name]);
        }
        Ok(())
    }
}

macro_rules! super_call_check {
    ($(#[$meta:meta])* $ty:ident, $name:expr, $method:literal, $description:literal) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $ty {
            tracker: SuperCallTracker,
        }

        impl $ty {
            /// Creates the check.
            #[must_use]
            pub fn new() -> Self {
                Self {
                    tracker: SuperCallTracker::new($method),
                }
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Check for $ty {
            fn name(&self) -> &'static str {
                $name
            }

            fn description(&self) -> &'static str {
                $description
            }

            fn default_tokens(&self) -> TokenSet {
                SuperCallTracker::tokens()
            }

            fn required_tokens(&self) -> TokenSet {
                SuperCallTracker::tokens()
            }

            fn default_messages(&self) -> &'static [(&'static str, &'static str)] {
                MESSAGES
            }

            fn begin_tree(&mut self, _ctx: &mut CheckContext<'_>, _root: NodeRef<'_>) -> CheckResult {
                self.tracker.begin();
                Ok(())
            }

            fn visit_token(&mut self, _ctx: &mut CheckContext<'_>, node: NodeRef<'_>) -> CheckResult {
                self.tracker.visit(node)
            }

            fn leave_token(&mut self, ctx: &mut CheckContext<'_>, node: NodeRef<'_>) -> CheckResult {
                self.tracker.leave(ctx, node)
            }
        }
    };
}

super_call_check!(
    /// Requires `clone()` overrides to call `super.clone()`.
    SuperClone,
    CLONE_NAME,
    "clone",
    "Requires clone() overrides to call super.clone()"
);

super_call_check!(
    /// Requires `finalize()` overrides to call `super.finalize()`.
    SuperFinalize,
    FINALIZE_NAME,
    "finalize",
    "Requires finalize() overrides to call super.finalize()"
);
