//! Check: suppress-warnings-holder
//!
//! Records the source ranges of `@SuppressWarnings` annotations so a
//! [`SuppressWarningsFilter`] can drop diagnostics raised inside them.
//!
//! # Detected Patterns
//!
//! An `ANNOTATION` named `SuppressWarnings` or `java.lang.SuppressWarnings`
//! whose values are string literals, constant names or text blocks. The
//! range starts at the annotated element and ends where its next sibling
//! starts, or at the end of the file. Values may carry a `walkcheck:` or
//! `checkstyle:` prefix; the rest is matched against check names, aliases
//! and ids, and `all` matches every check.
//!
//! The holder reports nothing itself. It only has an effect when the filter
//! reading the same [`SuppressWarningsRegistry`] is part of the audit; see
//! [`SuppressWarningsHolder::install`].

use std::path::PathBuf;

use walkcheck_core::{
    AnnotationSuppression, Check, CheckBox, CheckContext, CheckError, CheckRegistry, CheckResult,
    NodeRef, SuppressWarningsFilter, SuppressWarningsRegistry, TokenKind, TokenSet,
};

/// Registered check name.
pub const NAME: &str = "SuppressWarningsHolder";

const ANNOTATION_NAME: &str = "SuppressWarnings";
const IMPLICIT_PACKAGE: &str = "java.lang.";
const VALUE_PREFIXES: &[&str] = &["walkcheck:", "checkstyle:"];

/// Collects `@SuppressWarnings` ranges into a shared registry.
#[derive(Debug, Clone, Default)]
pub struct SuppressWarningsHolder {
    registry: SuppressWarningsRegistry,
    current: Option<PathBuf>,
}

impl SuppressWarningsHolder {
    /// Creates a holder recording into `registry`.
    #[must_use]
    pub fn new(registry: SuppressWarningsRegistry) -> Self {
        Self {
            registry,
            current: None,
        }
    }

    /// Registers the holder so every instance records into one registry,
    /// and returns the filter reading it.
    pub fn install(checks: &mut CheckRegistry) -> SuppressWarningsFilter {
        let registry = SuppressWarningsRegistry::new();
        let shared = registry.clone();
        checks.register(NAME, move || -> CheckBox { Box::new(Self::new(shared.clone())) });
        SuppressWarningsFilter::new(registry)
    }
}

impl Check for SuppressWarningsHolder {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Lets @SuppressWarnings annotations suppress diagnostics"
    }

    fn default_tokens(&self) -> TokenSet {
        TokenSet::of(&[TokenKind::Annotation])
    }

    fn required_tokens(&self) -> TokenSet {
        TokenSet::of(&[TokenKind::Annotation])
    }

    fn wants_leave_events(&self) -> bool {
        false
    }

    fn begin_tree(&mut self, ctx: &mut CheckContext<'_>, _root: NodeRef<'_>) -> CheckResult {
        // the previous file has been filtered by the time its walker moves on
        if let Some(previous) = self.current.take() {
            self.registry.forget(&previous);
        }
        self.registry.forget(ctx.file());
        self.current = Some(ctx.file().to_path_buf());
        Ok(())
    }

    fn visit_token(&mut self, ctx: &mut CheckContext<'_>, node: NodeRef<'_>) -> CheckResult {
        let name = node
            .children()
            .nth(1)
            .ok_or_else(|| CheckError::malformed(node, "annotation without a name"))?;
        let name = qualified_name(name)?;
        if name.strip_prefix(IMPLICIT_PACKAGE).unwrap_or(&name) != ANNOTATION_NAME {
            return Ok(());
        }
        let Some(target) = annotation_target(node)? else {
            return Ok(());
        };

        let (last_line, last_column) = target
            .next_sibling()
            .map_or((usize::MAX, usize::MAX), |next| (next.line(), next.column()));
        for value in annotation_values(node)? {
            let check = VALUE_PREFIXES
                .iter()
                .find_map(|prefix| value.strip_prefix(prefix))
                .unwrap_or(&value);
            self.registry.add(
                ctx.file(),
                AnnotationSuppression {
                    check: check.to_string(),
                    first_line: target.line(),
                    first_column: target.column(),
                    last_line,
                    last_column,
                },
            );
        }
        Ok(())
    }
}

/// `IDENT` text, or dotted text for a `DOT` chain.
fn qualified_name(node: NodeRef<'_>) -> Result<String, CheckError> {
    match node.kind() {
        TokenKind::Ident => Ok(node.text().to_string()),
        TokenKind::Dot => {
            let (Some(left), Some(right)) = (node.first_child(), node.last_child()) else {
                return Err(CheckError::malformed(node, "dot without operands"));
            };
            Ok(format!("{}.{}", qualified_name(left)?, qualified_name(right)?))
        }
        _ => Err(CheckError::malformed(node, "expected an identifier")),
    }
}

/// Element the annotation applies to; `None` for annotation defaults.
fn annotation_target(node: NodeRef<'_>) -> Result<Option<NodeRef<'_>>, CheckError> {
    let parent = node
        .parent()
        .ok_or_else(|| CheckError::malformed(node, "annotation without a parent"))?;
    match parent.kind() {
        TokenKind::Modifiers
        | TokenKind::Annotations
        | TokenKind::Annotation
        | TokenKind::AnnotationMemberValuePair => parent
            .parent()
            .map(Some)
            .ok_or_else(|| CheckError::malformed(parent, "annotation holder without a parent")),
        TokenKind::LiteralDefault => Ok(None),
        TokenKind::AnnotationArrayInit => annotation_target(parent),
        _ => Err(CheckError::malformed(parent, "unexpected annotation container")),
    }
}

fn annotation_values(node: NodeRef<'_>) -> Result<Vec<String>, CheckError> {
    let Some(lparen) = node.find_first_token(TokenKind::Lparen) else {
        return Ok(Vec::new());
    };
    let value = lparen
        .next_sibling()
        .ok_or_else(|| CheckError::malformed(node, "unterminated annotation arguments"))?;
    match value.kind() {
        TokenKind::Expr | TokenKind::AnnotationArrayInit => values_of(value),
        TokenKind::AnnotationMemberValuePair => {
            let inner = value
                .children()
                .nth(2)
                .ok_or_else(|| CheckError::malformed(value, "member without a value"))?;
            values_of(inner)
        }
        TokenKind::Rparen => Ok(Vec::new()),
        _ => Err(CheckError::malformed(value, "unexpected annotation argument")),
    }
}

fn values_of(node: NodeRef<'_>) -> Result<Vec<String>, CheckError> {
    match node.kind() {
        TokenKind::Expr => Ok(vec![expression_text(node)]),
        TokenKind::AnnotationArrayInit => Ok(node
            .children()
            .filter(|child| child.is(TokenKind::Expr))
            .map(expression_text)
            .collect()),
        _ => Err(CheckError::malformed(node, "expected a value or an array of values")),
    }
}

/// Suppression name an expression stands for. Unsupported expressions give
/// an empty name, which matches nothing.
fn expression_text(expr: NodeRef<'_>) -> String {
    let Some(first) = expr.first_child() else {
        return String::new();
    };
    match first.kind() {
        TokenKind::StringLiteral => {
            let text = first.text();
            text.strip_prefix('"')
                .and_then(|t| t.strip_suffix('"'))
                .unwrap_or(text)
                .to_string()
        }
        TokenKind::Ident => first.text().to_string(),
        TokenKind::Dot => first
            .last_child()
            .map(|last| last.text().to_string())
            .unwrap_or_default(),
        TokenKind::TextBlockLiteralBegin => first
            .first_child()
            .map(|content| content.text().chars().filter(|c| !c.is_whitespace()).collect())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use walkcheck_core::{AuditEvent, CheckSettings, Filter, TreeWalker};

    use super::*;
    use crate::test_util::{check_tree, tree};
    use crate::MagicNumber;

    // class A {
    //     @SuppressWarnings("MagicNumber")
    //     int f() { return 42; }
    //     int g() { return 7; }
    // }
    const ANNOTATED_METHOD: &str = r#"COMPILATION_UNIT -> COMPILATION_UNIT [1:0]
`--CLASS_DEF -> CLASS_DEF [1:0]
    |--MODIFIERS -> MODIFIERS [1:0]
    |--LITERAL_CLASS -> class [1:0]
    |--IDENT -> A [1:6]
    `--OBJBLOCK -> OBJBLOCK [1:8]
        |--LCURLY -> { [1:8]
        |--METHOD_DEF -> METHOD_DEF [2:4]
        |   |--MODIFIERS -> MODIFIERS [2:4]
        |   |   `--ANNOTATION -> ANNOTATION [2:4]
        |   |       |--AT -> @ [2:4]
        |   |       |--IDENT -> SuppressWarnings [2:5]
        |   |       |--LPAREN -> ( [2:21]
        |   |       |--EXPR -> EXPR [2:22]
        |   |       |   `--STRING_LITERAL -> "MagicNumber" [2:22]
        |   |       `--RPAREN -> ) [2:35]
        |   |--TYPE -> TYPE [3:4]
        |   |   `--LITERAL_INT -> int [3:4]
        |   |--IDENT -> f [3:8]
        |   |--PARAMETERS -> PARAMETERS [3:10]
        |   `--SLIST -> { [3:12]
        |       `--LITERAL_RETURN -> return [3:14]
        |           `--EXPR -> EXPR [3:21]
        |               `--NUM_INT -> 42 [3:21]
        |--METHOD_DEF -> METHOD_DEF [4:4]
        |   |--MODIFIERS -> MODIFIERS [4:4]
        |   |--TYPE -> TYPE [4:4]
        |   |   `--LITERAL_INT -> int [4:4]
        |   |--IDENT -> g [4:8]
        |   |--PARAMETERS -> PARAMETERS [4:10]
        |   `--SLIST -> { [4:12]
        |       `--LITERAL_RETURN -> return [4:14]
        |           `--EXPR -> EXPR [4:21]
        |               `--NUM_INT -> 7 [4:21]
        `--RCURLY -> } [5:0]
"#;

    fn recorded(dump: &str) -> Vec<AnnotationSuppression> {
        let registry = SuppressWarningsRegistry::new();
        let diagnostics = check_tree(Box::new(SuppressWarningsHolder::new(registry.clone())), dump);
        assert!(diagnostics.is_empty());
        registry.for_file(Path::new("Test.ast"))
    }

    #[test]
    fn test_records_range_up_to_next_member() {
        assert_eq!(
            recorded(ANNOTATED_METHOD),
            vec![AnnotationSuppression {
                check: "MagicNumber".into(),
                first_line: 2,
                first_column: 4,
                last_line: 4,
                last_column: 4,
            }]
        );
    }

    #[test]
    fn test_array_values_and_prefixes() {
        let source = ANNOTATED_METHOD.replace(
            "        |   |       |--EXPR -> EXPR [2:22]\n        |   |       |   `--STRING_LITERAL -> \"MagicNumber\" [2:22]\n",
            concat!(
                "        |   |       |--ANNOTATION_MEMBER_VALUE_PAIR -> ANNOTATION_MEMBER_VALUE_PAIR [2:22]\n",
                "        |   |       |   |--IDENT -> value [2:22]\n",
                "        |   |       |   |--ASSIGN -> = [2:28]\n",
                "        |   |       |   `--ANNOTATION_ARRAY_INIT -> { [2:30]\n",
                "        |   |       |       |--EXPR -> EXPR [2:31]\n",
                "        |   |       |       |   `--STRING_LITERAL -> \"checkstyle:magicnumber\" [2:31]\n",
                "        |   |       |       |--COMMA -> , [2:55]\n",
                "        |   |       |       |--EXPR -> EXPR [2:57]\n",
                "        |   |       |       |   `--IDENT -> ALL_CHECKS [2:57]\n",
                "        |   |       |       `--RCURLY -> } [2:67]\n",
            ),
        );
        let checks: Vec<String> = recorded(&source).into_iter().map(|s| s.check).collect();
        assert_eq!(checks, vec!["magicnumber", "ALL_CHECKS"]);
    }

    #[test]
    fn test_other_annotations_are_ignored() {
        let source = ANNOTATED_METHOD.replace("IDENT -> SuppressWarnings", "IDENT -> Deprecated");
        assert!(recorded(&source).is_empty());

        let qualified = ANNOTATED_METHOD.replace(
            "        |   |       |--IDENT -> SuppressWarnings [2:5]\n",
            concat!(
                "        |   |       |--DOT -> . [2:14]\n",
                "        |   |       |   |--DOT -> . [2:9]\n",
                "        |   |       |   |   |--IDENT -> java [2:5]\n",
                "        |   |       |   |   `--IDENT -> lang [2:10]\n",
                "        |   |       |   `--IDENT -> SuppressWarnings [2:15]\n",
            ),
        );
        assert_eq!(recorded(&qualified).len(), 1);
    }

    #[test]
    fn test_filter_drops_diagnostics_inside_the_range() {
        let mut checks = CheckRegistry::new();
        let filter = SuppressWarningsHolder::install(&mut checks);
        let mut walker = TreeWalker::new();
        walker
            .register(checks.create(NAME).unwrap(), CheckSettings::default())
            .unwrap();
        walker
            .register(Box::new(MagicNumber::new()), CheckSettings::default())
            .unwrap();

        let file = Path::new("A.ast");
        let outcome = walker.walk(file, &tree(ANNOTATED_METHOD));
        let kept: Vec<&str> = outcome
            .diagnostics
            .iter()
            .filter(|d| {
                filter.accept(&AuditEvent {
                    file,
                    diagnostic: d,
                    message: "",
                })
            })
            .map(|d| d.args[0].as_str())
            .collect();
        assert_eq!(outcome.diagnostics.len(), 2);
        assert_eq!(kept, vec!["7"]);

        walker.walk(Path::new("B.ast"), &tree(ANNOTATED_METHOD));
        assert!(filter.registry().for_file(file).is_empty());
    }
}
