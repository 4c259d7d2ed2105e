//! Shared helpers for check tests.

use std::path::Path;

use walkcheck_core::{
    AstDumpParser, Check, CheckBox, CheckSettings, Diagnostic, MessageBundle, Parser, Tree,
    TreeWalker,
};

pub(crate) fn tree(dump: &str) -> Tree {
    AstDumpParser
        .parse(dump, Path::new("Test.ast"))
        .expect("test tree should parse")
}

/// Walks `dump` with a single check and returns its diagnostics in
/// report order.
pub(crate) fn check_tree(check: CheckBox, dump: &str) -> Vec<Diagnostic> {
    check_tree_with(check, CheckSettings::default(), dump)
}

pub(crate) fn check_tree_with(
    check: CheckBox,
    settings: CheckSettings,
    dump: &str,
) -> Vec<Diagnostic> {
    let mut walker = TreeWalker::new();
    walker.register(check, settings).expect("check should register");
    let outcome = walker.walk(Path::new("Test.ast"), &tree(dump));
    assert!(outcome.faults.is_empty(), "unexpected faults: {:?}", outcome.faults);
    let mut diagnostics = outcome.diagnostics;
    diagnostics.sort_by(Diagnostic::position_cmp);
    diagnostics
}

/// `line:column key [args]` per diagnostic.
pub(crate) fn summary(diagnostics: &[Diagnostic]) -> Vec<String> {
    diagnostics
        .iter()
        .map(|d| format!("{}:{} {} {:?}", d.line, d.column, d.key, d.args))
        .collect()
}

/// Renders a diagnostic with the check's default templates.
pub(crate) fn message(check: &dyn Check, diagnostic: &Diagnostic) -> String {
    let mut bundle = MessageBundle::new();
    bundle.register_check(check.name(), check.default_messages().iter().copied());
    bundle.format(diagnostic)
}
