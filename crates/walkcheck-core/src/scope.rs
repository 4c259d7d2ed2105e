//! Scope and context queries over the ancestor chain of a node.
//!
//! All functions here are pure: they only look at the shape of the tree and
//! give the same answer no matter where the walk currently is.

use std::fmt;
use std::str::FromStr;

use crate::tokens::TokenKind;
use crate::tree::NodeRef;

/// Visibility scope of a declaration.
///
/// Ordered from widest to narrowest; `AnonInner` sits outside the ordinary
/// visibility ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope {
    /// No scope at all.
    Nothing,
    /// `public`.
    Public,
    /// `protected`.
    Protected,
    /// No explicit modifier.
    Package,
    /// `private`.
    Private,
    /// Member of an anonymous inner class.
    AnonInner,
}

impl Scope {
    /// Returns true if this scope is at least as wide as `other`, so a
    /// member with this scope is included when checking down to `other`.
    #[must_use]
    pub fn is_in(self, other: Scope) -> bool {
        self <= other
    }

    /// Lower-case name of the scope.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Scope::Nothing => "nothing",
            Scope::Public => "public",
            Scope::Protected => "protected",
            Scope::Package => "package",
            Scope::Private => "private",
            Scope::AnonInner => "anoninner",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nothing" => Ok(Scope::Nothing),
            "public" => Ok(Scope::Public),
            "protected" => Ok(Scope::Protected),
            "package" => Ok(Scope::Package),
            "private" => Ok(Scope::Private),
            "anoninner" => Ok(Scope::AnonInner),
            other => Err(format!("unknown scope `{other}`")),
        }
    }
}

/// Reads the scope from a `MODIFIERS` node. No visibility keyword means
/// package scope.
#[must_use]
pub fn scope_from_modifiers(modifiers: NodeRef<'_>) -> Scope {
    modifiers
        .children()
        .find_map(|m| match m.kind() {
            TokenKind::LiteralPublic => Some(Scope::Public),
            TokenKind::LiteralProtected => Some(Scope::Protected),
            TokenKind::LiteralPrivate => Some(Scope::Private),
            _ => None,
        })
        .unwrap_or(Scope::Package)
}

/// Scope of a declaration node, read from its `MODIFIERS` child.
#[must_use]
pub fn declared_scope(declaration: NodeRef<'_>) -> Scope {
    declaration
        .find_first_token(TokenKind::Modifiers)
        .map_or(Scope::Package, scope_from_modifiers)
}

/// The narrowest scope imposed by the enclosing type declarations.
///
/// Returns `None` for nodes outside any type declaration.
#[must_use]
pub fn surrounding_scope(node: NodeRef<'_>) -> Option<Scope> {
    let mut result: Option<Scope> = None;
    for ancestor in node.ancestors() {
        let kind = ancestor.kind();
        if kind.is_type_declaration() {
            let scope = declared_scope(ancestor);
            if result.map_or(true, |current| current.is_in(scope)) {
                result = Some(scope);
            }
        } else if kind == TokenKind::LiteralNew {
            result = Some(Scope::AnonInner);
            break;
        }
    }
    result
}

fn is_in_block_of(node: NodeRef<'_>, kind: TokenKind) -> bool {
    for ancestor in node.ancestors() {
        if ancestor.is(kind) {
            return true;
        }
        if ancestor.is(TokenKind::LiteralNew) || ancestor.kind().is_type_declaration() {
            return false;
        }
    }
    false
}

/// True if the nearest enclosing type body is a class.
#[must_use]
pub fn is_in_class_block(node: NodeRef<'_>) -> bool {
    is_in_block_of(node, TokenKind::ClassDef)
}

/// True if the nearest enclosing type body is an interface.
#[must_use]
pub fn is_in_interface_block(node: NodeRef<'_>) -> bool {
    is_in_block_of(node, TokenKind::InterfaceDef)
}

/// True if the nearest enclosing type body is an annotation type.
#[must_use]
pub fn is_in_annotation_block(node: NodeRef<'_>) -> bool {
    is_in_block_of(node, TokenKind::AnnotationDef)
}

/// True if the nearest enclosing type body is an interface or annotation type.
#[must_use]
pub fn is_in_interface_or_annotation_block(node: NodeRef<'_>) -> bool {
    is_in_interface_block(node) || is_in_annotation_block(node)
}

/// True if the nearest enclosing type body is an enum.
#[must_use]
pub fn is_in_enum_block(node: NodeRef<'_>) -> bool {
    is_in_block_of(node, TokenKind::EnumDef)
}

/// True if the nearest enclosing type body is a record.
#[must_use]
pub fn is_in_record_block(node: NodeRef<'_>) -> bool {
    is_in_block_of(node, TokenKind::RecordDef)
}

/// True if the node sits inside executable code (method, constructor,
/// initializer or lambda body).
#[must_use]
pub fn is_in_code_block(node: NodeRef<'_>) -> bool {
    node.ancestors().any(|a| {
        matches!(
            a.kind(),
            TokenKind::MethodDef
                | TokenKind::CtorDef
                | TokenKind::InstanceInit
                | TokenKind::StaticInit
                | TokenKind::Lambda
                | TokenKind::CompactCtorDef
        )
    })
}

/// True if no ancestor is a type declaration.
#[must_use]
pub fn is_outer_most_type(node: NodeRef<'_>) -> bool {
    !node.ancestors().any(|a| a.kind().is_type_declaration())
}

/// True for local variables and catch parameters.
#[must_use]
pub fn is_local_variable_def(node: NodeRef<'_>) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    match node.kind() {
        TokenKind::VariableDef => matches!(
            parent.kind(),
            TokenKind::Slist | TokenKind::ForInit | TokenKind::ForEachClause
        ),
        TokenKind::ParameterDef => parent.is(TokenKind::LiteralCatch),
        _ => false,
    }
}

/// Nearest ancestor of the given kind.
#[must_use]
pub fn find_enclosing<'t>(node: NodeRef<'t>, kind: TokenKind) -> Option<NodeRef<'t>> {
    node.ancestors().find(|a| a.is(kind))
}

/// True if the declaration's `MODIFIERS` child contains `modifier`.
#[must_use]
pub fn has_modifier(declaration: NodeRef<'_>, modifier: TokenKind) -> bool {
    declaration
        .find_first_token(TokenKind::Modifiers)
        .is_some_and(|mods| mods.find_first_token(modifier).is_some())
}
