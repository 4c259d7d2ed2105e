//! Check: redundant-modifier
//!
//! Reports modifiers that repeat what the language already implies.
//!
//! # Rationale
//!
//! `public abstract` on an interface method, `static` on a nested enum or
//! `final` on a method of a final class change nothing. They add noise and
//! suggest to readers that leaving them out would mean something else.
//!
//! # Detected Patterns
//!
//! - `abstract` or `static` on interface and annotation declarations
//! - `public`, `static`, `abstract` and `final` on interface and annotation
//!   members, where implied (`static` is allowed on interface methods,
//!   `abstract`/`final` on nested classes)
//! - `static` on nested enums, `final` and `static` on records
//! - any modifier on enum constructors, `public` on constructors of
//!   non-public classes
//! - `final` on methods of final classes, private methods, methods of
//!   anonymous classes and enum constant bodies, `static` enum methods
//! - `final` on parameters of abstract and interface methods
//! - `final` on try-with-resources variables
//! - `strictfp` from Java 17, `final` on unnamed (`_`) variables from Java 22
//!
//! # Configuration
//!
//! ```toml
//! [checks.properties]
//! jdk_version = "11"   # default "22"; "1.8" style is accepted
//! ```

use walkcheck_core::{
    property, Check, CheckContext, CheckError, CheckResult, NodeRef, PropertyError, TokenKind,
    TokenSet,
};

/// Registered check name.
pub const NAME: &str = "RedundantModifier";

/// Message key.
pub const MSG_KEY: &str = "redundantModifier";

const JDK_17: u32 = 17;
const JDK_22: u32 = 22;

/// Reports implied modifiers.
#[derive(Debug, Clone)]
pub struct RedundantModifier {
    jdk_version: u32,
}

impl Default for RedundantModifier {
    fn default() -> Self {
        Self::new()
    }
}

impl RedundantModifier {
    /// Creates the check targeting Java 22.
    #[must_use]
    pub fn new() -> Self {
        Self {
            jdk_version: JDK_22,
        }
    }

    /// Sets the targeted Java version.
    #[must_use]
    pub fn jdk_version(mut self, version: u32) -> Self {
        self.jdk_version = version;
        self
    }

    fn check_unnamed_variable(&self, ctx: &mut CheckContext<'_>, variable: NodeRef<'_>) {
        let unnamed = variable
            .find_first_token(TokenKind::Ident)
            .is_some_and(|ident| ident.text() == "_");
        if self.jdk_version >= JDK_22 && unnamed {
            report_modifiers(ctx, variable, &[TokenKind::Final]);
        }
    }
}

fn parse_jdk_version(name: &str, value: &toml::Value) -> Result<u32, PropertyError> {
    let text = match value {
        toml::Value::Integer(_) => property::as_usize(name, value)?.to_string(),
        _ => property::as_string(name, value)?,
    };
    let single = text.strip_prefix("1.").unwrap_or(&text);
    single.trim().parse().map_err(|_| PropertyError::InvalidValue {
        name: name.to_string(),
        expected: "a Java version such as \"17\" or \"1.8\"",
    })
}

fn modifiers(node: NodeRef<'_>) -> Option<NodeRef<'_>> {
    node.find_first_token(TokenKind::Modifiers)
}

fn has(node: NodeRef<'_>, kind: TokenKind) -> bool {
    modifiers(node).is_some_and(|mods| mods.find_first_token(kind).is_some())
}

/// Reports every modifier of `node` whose kind is in `kinds`.
fn report_modifiers(ctx: &mut CheckContext<'_>, node: NodeRef<'_>, kinds: &[TokenKind]) {
    let Some(mods) = modifiers(node) else {
        return;
    };
    for modifier in mods.children().filter(|m| kinds.contains(&m.kind())) {
        ctx.log(modifier, MSG_KEY, [modifier.text()]);
    }
}

/// Type declaration whose body directly holds `member`.
fn owner(member: NodeRef<'_>) -> Option<NodeRef<'_>> {
    member.parent().and_then(NodeRef::parent)
}

fn is_interface_or_annotation_member(node: NodeRef<'_>) -> bool {
    owner(node).is_some_and(|o| {
        matches!(o.kind(), TokenKind::InterfaceDef | TokenKind::AnnotationDef)
    })
}

/// `public` class reachable from outside its package.
fn is_class_public(class: NodeRef<'_>) -> bool {
    let public = has(class, TokenKind::LiteralPublic);
    match class.parent() {
        None => public,
        Some(parent) if parent.parent().is_none() => public,
        Some(_) => match owner(class) {
            Some(outer) if public || outer.is(TokenKind::InterfaceDef) => is_class_public(outer),
            _ => false,
        },
    }
}

fn is_annotated_with_safe_varargs(method: NodeRef<'_>) -> bool {
    modifiers(method).is_some_and(|mods| {
        mods.children()
            .filter(|m| m.is(TokenKind::Annotation))
            .any(|a| a.last_child().is_some_and(|n| n.text() == "SafeVarargs"))
    })
}

fn check_interface_or_annotation_member(ctx: &mut CheckContext<'_>, node: NodeRef<'_>) {
    let Some(mods) = modifiers(node) else {
        return;
    };
    let kind = node.kind();
    for modifier in mods.children() {
        let redundant = match modifier.kind() {
            TokenKind::LiteralPublic => true,
            TokenKind::LiteralStatic => kind != TokenKind::MethodDef,
            TokenKind::Abstract | TokenKind::Final => kind != TokenKind::ClassDef,
            _ => false,
        };
        if redundant {
            ctx.log(modifier, MSG_KEY, [modifier.text()]);
        }
    }
}

fn check_method(ctx: &mut CheckContext<'_>, method: NodeRef<'_>) {
    let mut check_final = has(method, TokenKind::LiteralPrivate);
    if !check_final {
        for ancestor in method.ancestors() {
            match ancestor.kind() {
                TokenKind::ClassDef => {
                    check_final = has(ancestor, TokenKind::Final);
                    break;
                }
                TokenKind::LiteralNew | TokenKind::EnumConstantDef => {
                    check_final = true;
                    break;
                }
                TokenKind::EnumDef => {
                    check_final = has(method, TokenKind::LiteralStatic);
                    break;
                }
                _ => {}
            }
        }
    }
    if check_final && !is_annotated_with_safe_varargs(method) {
        report_modifiers(ctx, method, &[TokenKind::Final]);
    }
    if method.find_first_token(TokenKind::Slist).is_none() {
        if let Some(params) = method.find_first_token(TokenKind::Parameters) {
            for param in params.children().filter(|p| p.is(TokenKind::ParameterDef)) {
                report_modifiers(ctx, param, &[TokenKind::Final]);
            }
        }
    }
}

fn check_constructor(ctx: &mut CheckContext<'_>, ctor: NodeRef<'_>) {
    let Some(class) = owner(ctor) else {
        return;
    };
    if class.is(TokenKind::EnumDef) {
        if let Some(modifier) =
            modifiers(ctor).and_then(|mods| mods.children().find(|m| !m.is(TokenKind::Annotation)))
        {
            ctx.log(modifier, MSG_KEY, [modifier.text()]);
        }
    } else if !is_class_public(class) && !has(class, TokenKind::LiteralProtected) {
        report_modifiers(ctx, ctor, &[TokenKind::LiteralPublic]);
    }
}

impl Check for RedundantModifier {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Reports modifiers implied by the declaration context"
    }

    fn default_tokens(&self) -> TokenSet {
        self.acceptable_tokens()
    }

    fn acceptable_tokens(&self) -> TokenSet {
        TokenSet::of(&[
            TokenKind::MethodDef,
            TokenKind::VariableDef,
            TokenKind::AnnotationFieldDef,
            TokenKind::InterfaceDef,
            TokenKind::CtorDef,
            TokenKind::ClassDef,
            TokenKind::EnumDef,
            TokenKind::Resource,
            TokenKind::AnnotationDef,
            TokenKind::RecordDef,
            TokenKind::PatternVariableDef,
            TokenKind::LiteralCatch,
            TokenKind::Lambda,
        ])
    }

    fn wants_leave_events(&self) -> bool {
        false
    }

    fn default_messages(&self) -> &'static [(&'static str, &'static str)] {
        &[(MSG_KEY, "Redundant ''{0}'' modifier.")]
    }

    fn set_property(&mut self, name: &str, value: &toml::Value) -> Result<(), PropertyError> {
        match name {
            "jdk_version" => self.jdk_version = parse_jdk_version(name, value)?,
            other => return Err(PropertyError::Unknown(other.to_string())),
        }
        Ok(())
    }

    fn visit_token(&mut self, ctx: &mut CheckContext<'_>, node: NodeRef<'_>) -> CheckResult {
        match node.kind() {
            TokenKind::InterfaceDef | TokenKind::AnnotationDef => {
                report_modifiers(ctx, node, &[TokenKind::LiteralStatic, TokenKind::Abstract]);
            }
            TokenKind::EnumDef => report_modifiers(ctx, node, &[TokenKind::LiteralStatic]),
            TokenKind::CtorDef => check_constructor(ctx, node),
            TokenKind::MethodDef => check_method(ctx, node),
            TokenKind::Resource => report_modifiers(ctx, node, &[TokenKind::Final]),
            TokenKind::RecordDef => {
                report_modifiers(ctx, node, &[TokenKind::Final, TokenKind::LiteralStatic]);
            }
            TokenKind::VariableDef | TokenKind::PatternVariableDef => {
                self.check_unnamed_variable(ctx, node);
            }
            TokenKind::LiteralCatch => {
                if let Some(param) = node.find_first_token(TokenKind::ParameterDef) {
                    self.check_unnamed_variable(ctx, param);
                }
            }
            TokenKind::Lambda => {
                if let Some(params) = node.find_first_token(TokenKind::Parameters) {
                    for param in params.children().filter(|p| p.is(TokenKind::ParameterDef)) {
                        self.check_unnamed_variable(ctx, param);
                    }
                }
            }
            TokenKind::ClassDef | TokenKind::AnnotationFieldDef => {}
            _ => return Err(CheckError::unexpected(node)),
        }

        if is_interface_or_annotation_member(node) {
            check_interface_or_annotation_member(ctx, node);
        }
        if self.jdk_version >= JDK_17 {
            report_modifiers(ctx, node, &[TokenKind::Strictfp]);
        }
        Ok(())
    }
}
