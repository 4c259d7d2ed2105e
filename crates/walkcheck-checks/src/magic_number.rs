//! Check: magic-number
//!
//! Reports numeric literals that are not part of a constant definition.
//!
//! # Rationale
//!
//! A bare `86400` in the middle of an expression says nothing about what it
//! means and has to be found and changed in every place it appears. Named
//! constants give the value a meaning and a single definition.
//!
//! # Detected Patterns
//!
//! ```text
//! int timeout = 3600;                  // magic.number
//! static final int TIMEOUT = 3600;     // ok: constant definition
//! int next = i + 1;                    // ok: in the ignore list
//! ```
//!
//! A literal is part of a constant when its nearest enclosing variable is
//! `final`, declared in an interface or annotation body, or is an enum
//! constant, and every node between the literal and that definition is an
//! arithmetic or grouping node (see `constant_waiver_parent_token`).
//!
//! # Configuration
//!
//! | Property | Default |
//! |----------|---------|
//! | `ignore_numbers` | `[-1, 0, 1, 2]` |
//! | `ignore_hash_code_method` | `false` |
//! | `ignore_annotation` | `false` |
//! | `ignore_field_declaration` | `false` |
//! | `ignore_annotation_element_defaults` | `true` |
//! | `constant_waiver_parent_token` | arithmetic, comparison and grouping kinds |

use walkcheck_core::{
    property, scope, Check, CheckContext, CheckError, CheckResult, NodeRef, PropertyError,
    TokenKind, TokenSet,
};

/// Registered check name.
pub const NAME: &str = "MagicNumber";

/// Message key.
pub const MSG_KEY: &str = "magic.number";

const DEFAULT_IGNORE_NUMBERS: [f64; 4] = [-1.0, 0.0, 1.0, 2.0];

fn default_waiver_tokens() -> TokenSet {
    TokenSet::of(&[
        TokenKind::Assign,
        TokenKind::ArrayInit,
        TokenKind::Expr,
        TokenKind::UnaryPlus,
        TokenKind::UnaryMinus,
        TokenKind::Typecast,
        TokenKind::Elist,
        TokenKind::LiteralNew,
        TokenKind::MethodCall,
        TokenKind::Star,
        TokenKind::Div,
        TokenKind::Plus,
        TokenKind::Minus,
        TokenKind::Question,
        TokenKind::Colon,
        TokenKind::Equal,
        TokenKind::NotEqual,
        TokenKind::Mod,
        TokenKind::Sr,
        TokenKind::Bsr,
        TokenKind::Ge,
        TokenKind::Gt,
        TokenKind::Sl,
        TokenKind::Le,
        TokenKind::Lt,
        TokenKind::Bxor,
        TokenKind::Bor,
        TokenKind::Bnot,
        TokenKind::Band,
    ])
}

/// Reports numeric literals outside constant definitions.
#[derive(Debug, Clone)]
pub struct MagicNumber {
    ignore_numbers: Vec<f64>,
    ignore_hash_code_method: bool,
    ignore_annotation: bool,
    ignore_field_declaration: bool,
    ignore_annotation_element_defaults: bool,
    waiver_tokens: TokenSet,
}

impl Default for MagicNumber {
    fn default() -> Self {
        Self::new()
    }
}

impl MagicNumber {
    /// Creates the check with the default ignore list `-1, 0, 1, 2`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ignore_numbers: DEFAULT_IGNORE_NUMBERS.to_vec(),
            ignore_hash_code_method: false,
            ignore_annotation: false,
            ignore_field_declaration: false,
            ignore_annotation_element_defaults: true,
            waiver_tokens: default_waiver_tokens(),
        }
    }

    /// Replaces the ignore list.
    #[must_use]
    pub fn ignore_numbers(mut self, numbers: &[f64]) -> Self {
        self.ignore_numbers = numbers.to_vec();
        self
    }

    /// Skips literals inside `hashCode()`.
    #[must_use]
    pub fn ignore_hash_code_method(mut self, ignore: bool) -> Self {
        self.ignore_hash_code_method = ignore;
        self
    }

    /// Skips literals inside annotations.
    #[must_use]
    pub fn ignore_annotation(mut self, ignore: bool) -> Self {
        self.ignore_annotation = ignore;
        self
    }

    /// Skips literals initializing fields.
    #[must_use]
    pub fn ignore_field_declaration(mut self, ignore: bool) -> Self {
        self.ignore_field_declaration = ignore;
        self
    }

    fn is_ignored_value(&self, node: NodeRef<'_>) -> bool {
        let Some(mut value) = parse_number(node.text(), node.kind()) else {
            return false;
        };
        if node.parent().is_some_and(|p| p.is(TokenKind::UnaryMinus)) {
            value = -value;
        }
        self.ignore_numbers
            .iter()
            .any(|ignored| ignored.total_cmp(&value).is_eq())
    }

    fn is_waived(&self, node: NodeRef<'_>) -> bool {
        (self.ignore_annotation && is_inside(node, TokenKind::Annotation))
            || (self.ignore_annotation_element_defaults
                && is_inside(node, TokenKind::LiteralDefault))
            || (self.ignore_hash_code_method && is_in_hash_code_method(node))
            || (self.ignore_field_declaration && is_field_declaration(node))
            || self.is_ignored_value(node)
    }

    /// True unless every node between `node` and its constant definition is
    /// a waiver kind.
    fn is_magic(&self, node: NodeRef<'_>, constant: Option<NodeRef<'_>>) -> bool {
        for ancestor in node.ancestors() {
            if Some(ancestor) == constant {
                return false;
            }
            if !self.waiver_tokens.contains(ancestor.kind()) {
                return true;
            }
        }
        false
    }
}

/// Value of a numeric literal, following Java literal syntax: underscores,
/// type suffixes, hex, binary and octal prefixes. `int` literals wrap to 32
/// bits.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss
)]
fn parse_number(text: &str, kind: TokenKind) -> Option<f64> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    match kind {
        TokenKind::NumFloat | TokenKind::NumDouble => {
            let digits = cleaned.trim_end_matches(|c: char| matches!(c, 'f' | 'F' | 'd' | 'D'));
            match digits
                .strip_prefix("0x")
                .or_else(|| digits.strip_prefix("0X"))
            {
                Some(hex) => parse_hex_float(hex),
                None => digits.parse().ok(),
            }
        }
        TokenKind::NumInt | TokenKind::NumLong => {
            let digits = cleaned.trim_end_matches(|c: char| matches!(c, 'l' | 'L'));
            let (digits, radix) = if let Some(hex) = digits
                .strip_prefix("0x")
                .or_else(|| digits.strip_prefix("0X"))
            {
                (hex, 16)
            } else if let Some(bin) = digits
                .strip_prefix("0b")
                .or_else(|| digits.strip_prefix("0B"))
            {
                (bin, 2)
            } else if digits.len() > 1 && digits.starts_with('0') {
                (&digits[1..], 8)
            } else {
                (digits, 10)
            };
            let value = u64::from_str_radix(digits, radix).ok()?;
            Some(if kind == TokenKind::NumInt {
                f64::from(value as u32 as i32)
            } else {
                value as i64 as f64
            })
        }
        _ => None,
    }
}

/// Hex floating-point literal after the `0x` prefix: hex mantissa with an
/// optional fraction, then a mandatory binary exponent (`1.8p1` is 3.0).
fn parse_hex_float(hex: &str) -> Option<f64> {
    let (mantissa, exponent) = hex.split_once(['p', 'P'])?;
    let exponent: i32 = exponent.parse().ok()?;
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }

    let mut value = 0.0_f64;
    for c in whole.chars().chain(fraction.chars()) {
        value = value * 16.0 + f64::from(c.to_digit(16)?);
    }
    let shift = i32::try_from(fraction.len()).ok()?.checked_mul(4)?;
    Some(value * 2.0_f64.powi(exponent.checked_sub(shift)?))
}

fn is_inside(node: NodeRef<'_>, kind: TokenKind) -> bool {
    node.is(kind) || node.ancestors().any(|a| a.is(kind))
}

fn is_in_hash_code_method(node: NodeRef<'_>) -> bool {
    scope::find_enclosing(node, TokenKind::MethodDef).is_some_and(|method| {
        method
            .find_first_token(TokenKind::Ident)
            .is_some_and(|ident| ident.text() == "hashCode")
            && method
                .find_first_token(TokenKind::Parameters)
                .is_some_and(|params| !params.has_children())
    })
}

/// The literal initializes a field of a class, record or anonymous class.
fn is_field_declaration(node: NodeRef<'_>) -> bool {
    let variable = node
        .ancestors()
        .take_while(|a| !a.is(TokenKind::Objblock))
        .find(|a| a.is(TokenKind::VariableDef));
    variable
        .and_then(NodeRef::parent)
        .and_then(NodeRef::parent)
        .is_some_and(|owner| {
            matches!(
                owner.kind(),
                TokenKind::ClassDef | TokenKind::RecordDef | TokenKind::LiteralNew
            )
        })
}

/// The nearest variable or enum constant, if it defines a constant.
fn containing_constant(node: NodeRef<'_>) -> Option<NodeRef<'_>> {
    let definition = node
        .ancestors()
        .find(|a| matches!(a.kind(), TokenKind::VariableDef | TokenKind::EnumConstantDef))?;
    let is_constant = definition.is(TokenKind::EnumConstantDef)
        || scope::is_in_interface_or_annotation_block(definition)
        || scope::has_modifier(definition, TokenKind::Final);
    is_constant.then_some(definition)
}

impl Check for MagicNumber {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Reports numeric literals outside constant definitions"
    }

    fn default_tokens(&self) -> TokenSet {
        TokenSet::of(&[
            TokenKind::NumDouble,
            TokenKind::NumFloat,
            TokenKind::NumInt,
            TokenKind::NumLong,
        ])
    }

    fn wants_leave_events(&self) -> bool {
        false
    }

    fn default_messages(&self) -> &'static [(&'static str, &'static str)] {
        &[(MSG_KEY, "''{0}'' is a magic number.")]
    }

    fn set_property(&mut self, name: &str, value: &toml::Value) -> Result<(), PropertyError> {
        match name {
            "ignore_numbers" => self.ignore_numbers = property::as_number_list(name, value)?,
            "ignore_hash_code_method" => {
                self.ignore_hash_code_method = property::as_bool(name, value)?;
            }
            "ignore_annotation" => self.ignore_annotation = property::as_bool(name, value)?,
            "ignore_field_declaration" => {
                self.ignore_field_declaration = property::as_bool(name, value)?;
            }
            "ignore_annotation_element_defaults" => {
                self.ignore_annotation_element_defaults = property::as_bool(name, value)?;
            }
            "constant_waiver_parent_token" => {
                self.waiver_tokens = property::as_token_set(name, value)?;
            }
            other => return Err(PropertyError::Unknown(other.to_string())),
        }
        Ok(())
    }

    fn visit_token(&mut self, ctx: &mut CheckContext<'_>, node: NodeRef<'_>) -> CheckResult {
        if !node.kind().is_number_literal() {
            return Err(CheckError::unexpected(node));
        }
        if self.is_waived(node) || !self.is_magic(node, containing_constant(node)) {
            return Ok(());
        }
        match node.parent() {
            Some(sign) if sign.is(TokenKind::UnaryMinus) => {
                ctx.log(sign, MSG_KEY, [format!("-{}", node.text())]);
            }
            Some(sign) if sign.is(TokenKind::UnaryPlus) => {
                ctx.log(sign, MSG_KEY, [format!("+{}", node.text())]);
            }
            _ => ctx.log(node, MSG_KEY, [node.text()]),
        }
        Ok(())
    }
}
