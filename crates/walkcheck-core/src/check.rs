//! The check plugin contract.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::context::CheckContext;
use crate::diagnostic::Severity;
use crate::tokens::{TokenKind, TokenSet, UnknownTokenKind};
use crate::tree::NodeRef;

/// Result of a check hook.
pub type CheckResult = Result<(), CheckError>;

/// A failure raised by a check hook.
///
/// The walker turns it into a fault for the current file and stops calling
/// the check until the next file.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// The check was handed a node kind it never subscribed to.
    #[error("unexpected token {kind} at {line}:{column}")]
    UnexpectedToken {
        /// Kind that arrived.
        kind: TokenKind,
        /// Line of the node.
        line: usize,
        /// Column of the node.
        column: usize,
    },

    /// The tree does not have the shape the check relies on.
    #[error("malformed {kind} at {line}:{column}: {detail}")]
    MalformedTree {
        /// Kind of the offending node.
        kind: TokenKind,
        /// Line of the node.
        line: usize,
        /// Column of the node.
        column: usize,
        /// What was missing.
        detail: String,
    },

    /// Any other failure.
    #[error("{0}")]
    Failed(String),
}

impl CheckError {
    /// Error for a node kind outside the subscription.
    #[must_use]
    pub fn unexpected(node: NodeRef<'_>) -> Self {
        Self::UnexpectedToken {
            kind: node.kind(),
            line: node.line(),
            column: node.column(),
        }
    }

    /// Error for a node missing an expected child.
    #[must_use]
    pub fn malformed(node: NodeRef<'_>, detail: impl Into<String>) -> Self {
        Self::MalformedTree {
            kind: node.kind(),
            line: node.line(),
            column: node.column(),
            detail: detail.into(),
        }
    }
}

/// Errors applying a configured property to a check.
#[derive(Debug, thiserror::Error)]
pub enum PropertyError {
    /// The check has no property with this name.
    #[error("unknown property `{0}`")]
    Unknown(String),

    /// The value has the wrong type or is out of range.
    #[error("property `{name}` expects {expected}")]
    InvalidValue {
        /// Property name.
        name: String,
        /// Human-readable description of an acceptable value.
        expected: &'static str,
    },

    /// A token-kind list names an unknown kind.
    #[error(transparent)]
    Token(#[from] UnknownTokenKind),
}

/// Typed readers for property values.
pub mod property {
    use super::PropertyError;
    use crate::tokens::TokenSet;

    fn invalid(name: &str, expected: &'static str) -> PropertyError {
        PropertyError::InvalidValue {
            name: name.to_string(),
            expected,
        }
    }

    /// Reads a boolean.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::InvalidValue`] for any other type.
    pub fn as_bool(name: &str, value: &toml::Value) -> Result<bool, PropertyError> {
        value.as_bool().ok_or_else(|| invalid(name, "a boolean"))
    }

    /// Reads a non-negative integer.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::InvalidValue`] for negative or non-integer values.
    pub fn as_usize(name: &str, value: &toml::Value) -> Result<usize, PropertyError> {
        value
            .as_integer()
            .and_then(|v| usize::try_from(v).ok())
            .ok_or_else(|| invalid(name, "a non-negative integer"))
    }

    /// Reads a string.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::InvalidValue`] for any other type.
    pub fn as_string(name: &str, value: &toml::Value) -> Result<String, PropertyError> {
        value
            .as_str()
            .map(ToString::to_string)
            .ok_or_else(|| invalid(name, "a string"))
    }

    /// Reads a list of strings. A single string is split on commas.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::InvalidValue`] if any element is not a string.
    pub fn as_string_list(name: &str, value: &toml::Value) -> Result<Vec<String>, PropertyError> {
        match value {
            toml::Value::String(s) => Ok(s
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
                .collect()),
            toml::Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(ToString::to_string)
                        .ok_or_else(|| invalid(name, "a list of strings"))
                })
                .collect(),
            _ => Err(invalid(name, "a list of strings")),
        }
    }

    /// Reads a list of numbers; integers are widened to floats.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::InvalidValue`] if any element is not a number.
    pub fn as_number_list(name: &str, value: &toml::Value) -> Result<Vec<f64>, PropertyError> {
        let number = |item: &toml::Value| {
            #[allow(clippy::cast_precision_loss)]
            match item {
                toml::Value::Integer(i) => Some(*i as f64),
                toml::Value::Float(f) => Some(*f),
                _ => None,
            }
        };
        match value {
            toml::Value::Array(items) => items
                .iter()
                .map(|item| number(item).ok_or_else(|| invalid(name, "a list of numbers")))
                .collect(),
            other => number(other)
                .map(|n| vec![n])
                .ok_or_else(|| invalid(name, "a list of numbers")),
        }
    }

    /// Reads a list of token kind names.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::Token`] for unknown names.
    pub fn as_token_set(name: &str, value: &toml::Value) -> Result<TokenSet, PropertyError> {
        let names = as_string_list(name, value)?;
        Ok(TokenSet::parse_names(&names)?)
    }
}

/// A pluggable check.
///
/// The walker calls [`begin_tree`](Check::begin_tree) once per file, then
/// [`visit_token`](Check::visit_token) on entering and
/// [`leave_token`](Check::leave_token) on leaving every subscribed node in
/// pre-order, then [`finish_tree`](Check::finish_tree). State kept between
/// files must be reset in `begin_tree`.
///
/// # Example
///
/// ```ignore
/// use walkcheck_core::{Check, CheckContext, CheckResult, NodeRef, TokenKind, TokenSet, NO_ARGS};
///
/// #[derive(Default)]
/// struct NoTernary;
///
/// impl Check for NoTernary {
///     fn name(&self) -> &'static str { "NoTernary" }
///     fn default_tokens(&self) -> TokenSet { TokenSet::of(&[TokenKind::Question]) }
///
///     fn visit_token(&mut self, ctx: &mut CheckContext<'_>, node: NodeRef<'_>) -> CheckResult {
///         ctx.log(node, "no.ternary", NO_ARGS);
///         Ok(())
///     }
/// }
/// ```
pub trait Check: Send {
    /// Registered name, e.g. `MagicNumber`.
    fn name(&self) -> &'static str;

    /// One-line description for listings.
    fn description(&self) -> &'static str {
        ""
    }

    /// Tokens visited when configuration does not override them.
    fn default_tokens(&self) -> TokenSet;

    /// Tokens configuration may choose from. Must contain the default and
    /// required sets.
    fn acceptable_tokens(&self) -> TokenSet {
        self.default_tokens()
    }

    /// Tokens that must stay subscribed whatever configuration says.
    fn required_tokens(&self) -> TokenSet {
        TokenSet::EMPTY
    }

    /// Whether the check needs `leave_token` calls.
    fn wants_leave_events(&self) -> bool {
        true
    }

    /// Message templates keyed by message key.
    fn default_messages(&self) -> &'static [(&'static str, &'static str)] {
        &[]
    }

    /// Applies one configured property.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::Unknown`] for names the check does not know.
    fn set_property(&mut self, name: &str, value: &toml::Value) -> Result<(), PropertyError> {
        let _ = value;
        Err(PropertyError::Unknown(name.to_string()))
    }

    /// Called once per file before any node.
    ///
    /// # Errors
    ///
    /// An error disables the check for the rest of the file.
    fn begin_tree(&mut self, ctx: &mut CheckContext<'_>, root: NodeRef<'_>) -> CheckResult {
        let _ = (ctx, root);
        Ok(())
    }

    /// Called when the walk enters a subscribed node.
    ///
    /// # Errors
    ///
    /// An error disables the check for the rest of the file.
    fn visit_token(&mut self, ctx: &mut CheckContext<'_>, node: NodeRef<'_>) -> CheckResult {
        let _ = (ctx, node);
        Ok(())
    }

    /// Called after every descendant of a subscribed node was visited.
    ///
    /// # Errors
    ///
    /// An error disables the check for the rest of the file.
    fn leave_token(&mut self, ctx: &mut CheckContext<'_>, node: NodeRef<'_>) -> CheckResult {
        let _ = (ctx, node);
        Ok(())
    }

    /// Called once per file after the last node.
    ///
    /// # Errors
    ///
    /// An error is reported as a fault for the file.
    fn finish_tree(&mut self, ctx: &mut CheckContext<'_>, root: NodeRef<'_>) -> CheckResult {
        let _ = (ctx, root);
        Ok(())
    }
}

/// Type alias for boxed [`Check`] trait objects.
pub type CheckBox = Box<dyn Check>;

/// Registration settings for one check instance.
#[derive(Debug, Clone, Default)]
pub struct CheckSettings {
    /// User-assigned id.
    pub id: Option<String>,
    /// Severity stamped on every diagnostic of the check.
    pub severity: Severity,
    /// Subscription override; `None` uses the default tokens.
    pub tokens: Option<TokenSet>,
    /// Message template overrides keyed by message key.
    pub messages: BTreeMap<String, String>,
}

impl CheckSettings {
    /// Settings with the given severity.
    #[must_use]
    pub fn with_severity(severity: Severity) -> Self {
        Self {
            severity,
            ..Self::default()
        }
    }

    /// Sets the subscription override.
    #[must_use]
    pub fn tokens(mut self, tokens: TokenSet) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Sets the id.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Constructor registered for a check name.
pub type CheckConstructor = Arc<dyn Fn() -> CheckBox + Send + Sync>;

/// Maps symbolic check names to constructors.
#[derive(Clone, Default)]
pub struct CheckRegistry {
    entries: Vec<(&'static str, CheckConstructor)>,
}

impl fmt::Debug for CheckRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl CheckRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constructor, replacing an earlier one with the same name.
    pub fn register<F>(&mut self, name: &'static str, constructor: F)
    where
        F: Fn() -> CheckBox + Send + Sync + 'static,
    {
        let constructor: CheckConstructor = Arc::new(constructor);
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = constructor;
        } else {
            self.entries.push((name, constructor));
        }
    }

    /// Creates a fresh instance. A trailing `Check` suffix on `name` is
    /// ignored, so `MagicNumberCheck` resolves to `MagicNumber`.
    #[must_use]
    pub fn create(&self, name: &str) -> Option<CheckBox> {
        self.lookup(name).map(|constructor| constructor())
    }

    /// Returns true if `name` resolves to a registered check.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    /// Number of registered checks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lookup(&self, name: &str) -> Option<&CheckConstructor> {
        let find = |wanted: &str| {
            self.entries
                .iter()
                .find(|(n, _)| *n == wanted)
                .map(|(_, c)| c)
        };
        find(name).or_else(|| name.strip_suffix("Check").and_then(find))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Sample;

    impl Check for Sample {
        fn name(&self) -> &'static str {
            "Sample"
        }

        fn default_tokens(&self) -> TokenSet {
            TokenSet::of(&[TokenKind::MethodDef])
        }
    }

    fn sample() -> CheckBox {
        Box::new(Sample)
    }

    #[test]
    fn contract_defaults() {
        let mut check = Sample;
        assert_eq!(check.acceptable_tokens(), check.default_tokens());
        assert!(check.required_tokens().is_empty());
        assert!(check.wants_leave_events());
        assert!(matches!(
            check.set_property("anything", &toml::Value::Boolean(true)),
            Err(PropertyError::Unknown(name)) if name == "anything"
        ));
    }

    #[test]
    fn registry_resolves_names() {
        let mut registry = CheckRegistry::new();
        registry.register("Sample", sample);
        assert!(registry.contains("Sample"));
        assert!(registry.contains("SampleCheck"));
        assert!(!registry.contains("Other"));
        assert_eq!(registry.create("Sample").map(|c| c.name()), Some("Sample"));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["Sample"]);

        registry.register("Sample", sample);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn property_readers() {
        let list: toml::Value = toml::Value::Array(vec![
            toml::Value::Integer(-1),
            toml::Value::Float(0.5),
        ]);
        assert_eq!(property::as_number_list("n", &list).unwrap(), vec![-1.0, 0.5]);
        assert_eq!(
            property::as_string_list("s", &toml::Value::String("a, b,".into())).unwrap(),
            vec!["a".to_string(), "b".to_string()]
        );
        assert!(property::as_usize("m", &toml::Value::Integer(-3)).is_err());
        assert!(matches!(
            property::as_token_set("t", &toml::Value::String("NOPE".into())),
            Err(PropertyError::Token(_))
        ));
        let set = property::as_token_set("t", &toml::Value::String("QUESTION".into())).unwrap();
        assert!(set.contains(TokenKind::Question));
    }
}
