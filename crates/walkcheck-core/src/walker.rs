//! Tree walker: dispatches one file's tree to the registered checks.
//!
//! The walk is an explicit-stack pre-order traversal. For every node the
//! walker calls `visit_token` on each subscribed check in registration
//! order, walks the children, then calls `leave_token` on the same checks
//! in the same order. Recursion depth therefore never depends on tree depth.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use tracing::{debug, trace, warn};

use crate::check::{Check, CheckBox, CheckRegistry, CheckSettings};
use crate::config::{CheckConfig, ConfigError};
use crate::context::CheckContext;
use crate::diagnostic::{CheckIdentity, Diagnostic, Severity};
use crate::directives::{CommentSuppressions, DEFAULT_ALLOW_RANGE};
use crate::messages::{MessageBundle, CHECK_FAULT_KEY};
use crate::tokens::{TokenKind, TokenSet};
use crate::tree::{NodeRef, Tree};

/// Builds a fresh walker per worker thread.
pub type WalkerFactory = dyn Fn() -> Result<TreeWalker, ConfigError> + Send + Sync;

/// Walk phase in which a hook ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    /// `begin_tree`.
    BeginTree,
    /// `visit_token`.
    VisitToken,
    /// `leave_token`.
    LeaveToken,
    /// `finish_tree`.
    FinishTree,
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BeginTree => "begin_tree",
            Self::VisitToken => "visit_token",
            Self::LeaveToken => "leave_token",
            Self::FinishTree => "finish_tree",
        })
    }
}

/// A check that failed while walking a file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("check {check} failed in {hook} at {line}:{column}: {message}")]
pub struct CheckFault {
    /// Failing check.
    pub check: CheckIdentity,
    /// Hook that failed.
    pub hook: Hook,
    /// Line of the node being processed, 0 for tree-level hooks.
    pub line: usize,
    /// Column of the node being processed.
    pub column: usize,
    /// Error or panic message.
    pub message: String,
}

impl CheckFault {
    /// File-level diagnostic describing the fault.
    #[must_use]
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::new(
            self.line,
            self.column,
            CHECK_FAULT_KEY,
            vec![self.check.name.clone(), self.message.clone()],
            Severity::Error,
            self.check.clone(),
        )
    }
}

/// Everything one walk produced.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    /// Diagnostics that survived comment directives, in emission order.
    pub diagnostics: Vec<Diagnostic>,
    /// Faults in the order they happened.
    pub faults: Vec<CheckFault>,
    /// Diagnostics dropped by comment directives.
    pub suppressed: usize,
}

struct Registered {
    check: CheckBox,
    identity: CheckIdentity,
    severity: Severity,
    messages: BTreeMap<String, String>,
    tokens: TokenSet,
    leave: bool,
}

struct WalkState {
    diagnostics: Vec<Diagnostic>,
    faults: Vec<CheckFault>,
    disabled: Vec<bool>,
}

enum Frame<'t> {
    Enter(NodeRef<'t>),
    Leave(NodeRef<'t>),
}

/// Walks trees and dispatches nodes to checks.
pub struct TreeWalker {
    checks: Vec<Registered>,
    dispatch: Vec<Vec<usize>>,
    bundle: MessageBundle,
    allow_range: i64,
}

impl Default for TreeWalker {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TreeWalker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeWalker")
            .field(
                "checks",
                &self
                    .checks
                    .iter()
                    .map(|c| c.identity.name.as_str())
                    .collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl TreeWalker {
    /// Creates a walker with no checks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            checks: Vec::new(),
            dispatch: vec![Vec::new(); TokenKind::COUNT + 1],
            bundle: MessageBundle::new(),
            allow_range: DEFAULT_ALLOW_RANGE,
        }
    }

    /// Builds a walker from configured checks, in configuration order.
    /// Disabled entries are skipped.
    ///
    /// # Errors
    ///
    /// Returns the first configuration problem: unknown check, bad
    /// property, unknown or unacceptable token, missing required token.
    pub fn from_config(
        registry: &CheckRegistry,
        checks: &[CheckConfig],
    ) -> Result<Self, ConfigError> {
        let mut walker = Self::new();
        for entry in checks.iter().filter(|c| c.is_enabled()) {
            let mut check = registry
                .create(&entry.name)
                .ok_or_else(|| ConfigError::UnknownCheck {
                    name: entry.name.clone(),
                })?;
            for (property, value) in &entry.properties {
                check
                    .set_property(property, value)
                    .map_err(|source| ConfigError::Property {
                        check: entry.name.clone(),
                        source,
                    })?;
            }
            walker.register(check, entry.settings()?)?;
        }
        Ok(walker)
    }

    /// Registers a check, resolving its subscription.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InconsistentCheck`] if the check's default or
    /// required tokens are not acceptable to itself,
    /// [`ConfigError::TokenNotAcceptable`] if the override names a token
    /// outside the acceptable set, and
    /// [`ConfigError::MissingRequiredToken`] if it drops a required token.
    pub fn register(&mut self, check: CheckBox, settings: CheckSettings) -> Result<(), ConfigError> {
        let tokens = resolve_tokens(check.as_ref(), settings.tokens)?;
        let index = self.checks.len();
        for kind in tokens.iter() {
            self.dispatch[usize::from(kind.id())].push(index);
        }
        self.bundle
            .register_check(check.name(), check.default_messages().iter().copied());

        let identity = CheckIdentity {
            name: check.name().to_string(),
            id: settings.id,
        };
        debug!(check = %identity, tokens = %tokens, "registered check");
        self.checks.push(Registered {
            leave: check.wants_leave_events(),
            check,
            identity,
            severity: settings.severity,
            messages: settings.messages,
            tokens,
        });
        Ok(())
    }

    /// Sets how many nearby lines an `allow` comment without `range=`
    /// covers. Negative values reach upward.
    pub fn set_allow_range(&mut self, lines: i64) {
        self.allow_range = lines;
    }

    /// Number of registered checks.
    #[must_use]
    pub fn check_count(&self) -> usize {
        self.checks.len()
    }

    /// Registered checks with their resolved subscriptions.
    pub fn subscriptions(&self) -> impl Iterator<Item = (&CheckIdentity, TokenSet)> {
        self.checks.iter().map(|c| (&c.identity, c.tokens))
    }

    /// Message bundle holding the templates of every registered check.
    #[must_use]
    pub fn bundle(&self) -> &MessageBundle {
        &self.bundle
    }

    /// Walks one tree.
    ///
    /// Faults never escape: a failing check is recorded and skipped for the
    /// rest of this tree, and re-enabled for the next one.
    pub fn walk(&mut self, file: &Path, tree: &Tree) -> WalkOutcome {
        let root = tree.root();
        let mut state = WalkState {
            diagnostics: Vec::new(),
            faults: Vec::new(),
            disabled: vec![false; self.checks.len()],
        };
        let mut comments = CommentSuppressions::with_default_range(self.allow_range);
        trace!(file = %file.display(), nodes = tree.len(), "walking tree");

        for (index, registered) in self.checks.iter_mut().enumerate() {
            invoke(index, registered, Hook::BeginTree, root, file, &mut state);
        }

        let mut stack = vec![Frame::Enter(root)];
        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(node) => {
                    if node.kind().is_comment() {
                        comments.observe(node);
                    }
                    for &index in &self.dispatch[usize::from(node.kind().id())] {
                        invoke(
                            index,
                            &mut self.checks[index],
                            Hook::VisitToken,
                            node,
                            file,
                            &mut state,
                        );
                    }
                    stack.push(Frame::Leave(node));
                    stack.extend(node.children().rev().map(Frame::Enter));
                }
                Frame::Leave(node) => {
                    for &index in &self.dispatch[usize::from(node.kind().id())] {
                        invoke(
                            index,
                            &mut self.checks[index],
                            Hook::LeaveToken,
                            node,
                            file,
                            &mut state,
                        );
                    }
                }
            }
        }

        for (index, registered) in self.checks.iter_mut().enumerate() {
            invoke(index, registered, Hook::FinishTree, root, file, &mut state);
        }

        let total = state.diagnostics.len();
        let diagnostics: Vec<Diagnostic> = state
            .diagnostics
            .into_iter()
            .filter(|d| !comments.is_suppressed(d))
            .collect();
        WalkOutcome {
            suppressed: total - diagnostics.len(),
            diagnostics,
            faults: state.faults,
        }
    }
}

fn resolve_tokens(
    check: &dyn Check,
    requested: Option<TokenSet>,
) -> Result<TokenSet, ConfigError> {
    let name = check.name();
    let default = check.default_tokens();
    let acceptable = check.acceptable_tokens();
    let required = check.required_tokens();

    if !required.is_subset(&acceptable) {
        return Err(ConfigError::InconsistentCheck {
            check: name.to_string(),
            detail: format!("required tokens {required} are not all acceptable"),
        });
    }
    if !default.is_subset(&acceptable) {
        return Err(ConfigError::InconsistentCheck {
            check: name.to_string(),
            detail: format!("default tokens {default} are not all acceptable"),
        });
    }

    let Some(requested) = requested else {
        return Ok(default.union(&required));
    };
    if let Some(token) = requested.difference(&acceptable).iter().next() {
        return Err(ConfigError::TokenNotAcceptable {
            check: name.to_string(),
            token,
        });
    }
    if let Some(token) = required.difference(&requested).iter().next() {
        return Err(ConfigError::MissingRequiredToken {
            check: name.to_string(),
            token,
        });
    }
    Ok(requested)
}

fn invoke(
    index: usize,
    registered: &mut Registered,
    hook: Hook,
    node: NodeRef<'_>,
    file: &Path,
    state: &mut WalkState,
) {
    match hook {
        Hook::BeginTree => state.disabled[index] = false,
        Hook::LeaveToken if !registered.leave => return,
        _ => {}
    }
    if state.disabled[index] {
        return;
    }

    let check = &mut registered.check;
    let mut ctx = CheckContext::new(
        file,
        &registered.identity,
        registered.severity,
        &registered.messages,
        &mut state.diagnostics,
    );
    let result = panic::catch_unwind(AssertUnwindSafe(|| match hook {
        Hook::BeginTree => check.begin_tree(&mut ctx, node),
        Hook::VisitToken => check.visit_token(&mut ctx, node),
        Hook::LeaveToken => check.leave_token(&mut ctx, node),
        Hook::FinishTree => check.finish_tree(&mut ctx, node),
    }));
    let message = match result {
        Ok(Ok(())) => return,
        Ok(Err(error)) => error.to_string(),
        Err(payload) => panic_message(payload.as_ref()),
    };

    let (line, column) = match hook {
        Hook::VisitToken | Hook::LeaveToken => (node.line(), node.column()),
        Hook::BeginTree | Hook::FinishTree => (0, 0),
    };
    warn!(
        file = %file.display(),
        check = %registered.identity,
        %hook,
        line,
        column,
        "check failed, disabled for the rest of the file: {message}"
    );
    state.disabled[index] = true;
    state.faults.push(CheckFault {
        check: registered.identity.clone(),
        hook,
        line,
        column,
        message,
    });
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "check panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::check::{CheckError, CheckResult};
    use crate::context::NO_ARGS;
    use crate::tree::TreeBuilder;

    type Log = Arc<Mutex<Vec<String>>>;

    /// Records every hook call as "tag:hook:KIND".
    struct Recorder {
        tag: &'static str,
        tokens: TokenSet,
        leave: bool,
        log: Log,
    }

    impl Recorder {
        fn new(tag: &'static str, tokens: &[TokenKind], log: &Log) -> Self {
            Self {
                tag,
                tokens: TokenSet::of(tokens),
                leave: true,
                log: Arc::clone(log),
            }
        }

        fn push(&self, hook: &str, node: NodeRef<'_>) {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:{hook}:{}", self.tag, node.kind()));
        }
    }

    impl Check for Recorder {
        fn name(&self) -> &'static str {
            self.tag
        }

        fn default_tokens(&self) -> TokenSet {
            self.tokens
        }

        fn wants_leave_events(&self) -> bool {
            self.leave
        }

        fn begin_tree(&mut self, _ctx: &mut CheckContext<'_>, root: NodeRef<'_>) -> CheckResult {
            self.push("begin", root);
            Ok(())
        }

        fn visit_token(&mut self, ctx: &mut CheckContext<'_>, node: NodeRef<'_>) -> CheckResult {
            self.push("visit", node);
            ctx.log(node, "seen", [node.kind().name()]);
            Ok(())
        }

        fn leave_token(&mut self, _ctx: &mut CheckContext<'_>, node: NodeRef<'_>) -> CheckResult {
            self.push("leave", node);
            Ok(())
        }

        fn finish_tree(&mut self, _ctx: &mut CheckContext<'_>, root: NodeRef<'_>) -> CheckResult {
            self.push("finish", root);
            Ok(())
        }
    }

    /// class A { void m() { x ? 1 : 2; } }
    fn sample() -> Tree {
        let mut b = TreeBuilder::new(TokenKind::CompilationUnit, "COMPILATION_UNIT", 1, 0);
        let root = b.root();
        let class = b.structural(root, TokenKind::ClassDef, 1, 0);
        let obj = b.structural(class, TokenKind::Objblock, 1, 8);
        let method = b.structural(obj, TokenKind::MethodDef, 2, 4);
        let body = b.structural(method, TokenKind::Slist, 2, 15);
        let question = b.child(body, TokenKind::Question, "?", 3, 10);
        b.child(question, TokenKind::NumInt, "1", 3, 12);
        b.child(question, TokenKind::NumInt, "2", 3, 16);
        b.build()
    }

    fn entries(log: &Log) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[test]
    fn events_are_properly_nested_and_ordered() {
        let log = Log::default();
        let mut walker = TreeWalker::new();
        walker
            .register(
                Box::new(Recorder::new(
                    "A",
                    &[TokenKind::MethodDef, TokenKind::NumInt],
                    &log,
                )),
                CheckSettings::default(),
            )
            .unwrap();
        walker
            .register(
                Box::new(Recorder::new("B", &[TokenKind::MethodDef], &log)),
                CheckSettings::default(),
            )
            .unwrap();

        let outcome = walker.walk(Path::new("A.java"), &sample());
        assert!(outcome.faults.is_empty());
        assert_eq!(
            entries(&log),
            vec![
                "A:begin:COMPILATION_UNIT",
                "B:begin:COMPILATION_UNIT",
                "A:visit:METHOD_DEF",
                "B:visit:METHOD_DEF",
                "A:visit:NUM_INT",
                "A:leave:NUM_INT",
                "A:visit:NUM_INT",
                "A:leave:NUM_INT",
                "A:leave:METHOD_DEF",
                "B:leave:METHOD_DEF",
                "A:finish:COMPILATION_UNIT",
                "B:finish:COMPILATION_UNIT",
            ]
        );
        assert_eq!(outcome.diagnostics.len(), 4);
    }

    #[test]
    fn unsubscribed_kinds_are_never_delivered() {
        let log = Log::default();
        let mut walker = TreeWalker::new();
        walker
            .register(
                Box::new(Recorder::new("Q", &[TokenKind::Question], &log)),
                CheckSettings::default(),
            )
            .unwrap();
        walker.walk(Path::new("A.java"), &sample());
        let visits: Vec<String> = entries(&log)
            .into_iter()
            .filter(|e| e.contains(":visit:") || e.contains(":leave:"))
            .collect();
        assert_eq!(visits, vec!["Q:visit:QUESTION", "Q:leave:QUESTION"]);
    }

    #[test]
    fn leave_events_are_skipped_when_not_wanted() {
        let log = Log::default();
        let mut recorder = Recorder::new("N", &[TokenKind::NumInt], &log);
        recorder.leave = false;
        let mut walker = TreeWalker::new();
        walker
            .register(Box::new(recorder), CheckSettings::default())
            .unwrap();
        walker.walk(Path::new("A.java"), &sample());
        assert!(!entries(&log).iter().any(|e| e.contains(":leave:")));
    }

    #[test]
    fn deep_trees_do_not_overflow() {
        let mut b = TreeBuilder::new(TokenKind::CompilationUnit, "COMPILATION_UNIT", 1, 0);
        let mut parent = b.root();
        for line in 0..200_000 {
            parent = b.structural(parent, TokenKind::Slist, line + 1, 0);
        }
        let tree = b.build();

        let log = Log::default();
        let mut recorder = Recorder::new("S", &[TokenKind::Slist], &log);
        recorder.leave = false;
        let mut walker = TreeWalker::new();
        walker
            .register(Box::new(recorder), CheckSettings::default())
            .unwrap();
        let outcome = walker.walk(Path::new("Deep.java"), &tree);
        assert_eq!(outcome.diagnostics.len(), 200_000);
    }

    struct Tricky {
        required: TokenSet,
        acceptable: TokenSet,
    }

    impl Check for Tricky {
        fn name(&self) -> &'static str {
            "Tricky"
        }

        fn default_tokens(&self) -> TokenSet {
            self.required
        }

        fn acceptable_tokens(&self) -> TokenSet {
            self.acceptable
        }

        fn required_tokens(&self) -> TokenSet {
            self.required
        }
    }

    fn tricky() -> Box<Tricky> {
        Box::new(Tricky {
            required: TokenSet::of(&[TokenKind::CtorDef]),
            acceptable: TokenSet::of(&[TokenKind::CtorDef, TokenKind::MethodDef]),
        })
    }

    #[test]
    fn subscription_validation() {
        let mut walker = TreeWalker::new();

        let missing = walker.register(
            tricky(),
            CheckSettings::default().tokens(TokenSet::of(&[TokenKind::MethodDef])),
        );
        assert!(matches!(
            missing,
            Err(ConfigError::MissingRequiredToken { token: TokenKind::CtorDef, .. })
        ));

        let outside = walker.register(
            tricky(),
            CheckSettings::default().tokens(TokenSet::of(&[TokenKind::CtorDef, TokenKind::Ident])),
        );
        assert!(matches!(
            outside,
            Err(ConfigError::TokenNotAcceptable { token: TokenKind::Ident, .. })
        ));

        let inconsistent = walker.register(
            Box::new(Tricky {
                required: TokenSet::of(&[TokenKind::CtorDef]),
                acceptable: TokenSet::of(&[TokenKind::MethodDef]),
            }),
            CheckSettings::default(),
        );
        assert!(matches!(
            inconsistent,
            Err(ConfigError::InconsistentCheck { .. })
        ));
        assert_eq!(walker.check_count(), 0);

        walker
            .register(
                tricky(),
                CheckSettings::default()
                    .tokens(TokenSet::of(&[TokenKind::CtorDef, TokenKind::MethodDef])),
            )
            .unwrap();
        let (_, tokens) = walker.subscriptions().next().unwrap();
        assert_eq!(tokens.len(), 2);
    }

    /// Fails on the second NUM_INT it sees, by error or by panic.
    struct Flaky {
        seen: usize,
        panic: bool,
    }

    impl Check for Flaky {
        fn name(&self) -> &'static str {
            "Flaky"
        }

        fn default_tokens(&self) -> TokenSet {
            TokenSet::of(&[TokenKind::NumInt])
        }

        fn begin_tree(&mut self, _ctx: &mut CheckContext<'_>, _root: NodeRef<'_>) -> CheckResult {
            self.seen = 0;
            Ok(())
        }

        fn visit_token(&mut self, ctx: &mut CheckContext<'_>, node: NodeRef<'_>) -> CheckResult {
            self.seen += 1;
            if self.seen == 2 {
                if self.panic {
                    panic!("boom at {}", node.line());
                }
                return Err(CheckError::unexpected(node));
            }
            ctx.log(node, "flaky", NO_ARGS);
            Ok(())
        }
    }

    #[test]
    fn faults_are_isolated_per_check_and_file() {
        for panic in [false, true] {
            let log = Log::default();
            let mut walker = TreeWalker::new();
            walker
                .register(
                    Box::new(Flaky { seen: 0, panic }),
                    CheckSettings::default(),
                )
                .unwrap();
            walker
                .register(
                    Box::new(Recorder::new("R", &[TokenKind::NumInt], &log)),
                    CheckSettings::default(),
                )
                .unwrap();

            let tree = sample();
            let outcome = walker.walk(Path::new("A.java"), &tree);
            assert_eq!(outcome.faults.len(), 1);
            let fault = &outcome.faults[0];
            assert_eq!(fault.check.name, "Flaky");
            assert_eq!(fault.hook, Hook::VisitToken);
            assert_eq!((fault.line, fault.column), (3, 16));
            if panic {
                assert_eq!(fault.message, "boom at 3");
            }
            // one from Flaky before it failed, two from the recorder
            assert_eq!(outcome.diagnostics.len(), 3);
            assert_eq!(
                entries(&log).iter().filter(|e| e.contains(":visit:")).count(),
                2
            );

            // the next file starts with the check enabled again
            let again = walker.walk(Path::new("B.java"), &tree);
            assert_eq!(again.faults.len(), 1);
            assert_eq!(again.diagnostics.len(), 3);
        }
    }

    #[test]
    fn comment_directives_drop_matching_diagnostics() {
        let mut b = TreeBuilder::new(TokenKind::CompilationUnit, "COMPILATION_UNIT", 1, 0);
        let root = b.root();
        let comment = b.child(root, TokenKind::SingleLineComment, "//", 1, 0);
        b.child(comment, TokenKind::CommentContent, " walkcheck: allow(R)", 1, 2);
        b.child(root, TokenKind::NumInt, "7", 2, 0);
        b.child(root, TokenKind::NumInt, "8", 5, 0);
        let tree = b.build();

        let log = Log::default();
        let mut walker = TreeWalker::new();
        walker
            .register(
                Box::new(Recorder::new("R", &[TokenKind::NumInt], &log)),
                CheckSettings::default(),
            )
            .unwrap();
        let outcome = walker.walk(Path::new("A.java"), &tree);
        assert_eq!(outcome.suppressed, 1);
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].line, 5);
    }

    #[test]
    fn fault_becomes_error_diagnostic() {
        let fault = CheckFault {
            check: CheckIdentity::named("Flaky"),
            hook: Hook::FinishTree,
            line: 0,
            column: 0,
            message: "bad".into(),
        };
        let diagnostic = fault.to_diagnostic();
        assert!(diagnostic.is_file_level());
        assert_eq!(diagnostic.severity, Severity::Error);
        assert_eq!(
            MessageBundle::new().format(&diagnostic),
            "Check 'Flaky' failed - bad"
        );
    }

    /// Logs `shared.key` on every NUM_INT with its own template.
    struct SameKey {
        name: &'static str,
        messages: &'static [(&'static str, &'static str)],
    }

    impl Check for SameKey {
        fn name(&self) -> &'static str {
            self.name
        }

        fn default_tokens(&self) -> TokenSet {
            TokenSet::of(&[TokenKind::NumInt])
        }

        fn default_messages(&self) -> &'static [(&'static str, &'static str)] {
            self.messages
        }

        fn visit_token(&mut self, ctx: &mut CheckContext<'_>, node: NodeRef<'_>) -> CheckResult {
            ctx.log(node, "shared.key", [node.text()]);
            Ok(())
        }
    }

    #[test]
    fn templates_are_resolved_per_check() {
        const FIRST: &[(&str, &str)] = &[("shared.key", "first sees {0}")];
        const SECOND: &[(&str, &str)] = &[("shared.key", "second sees {0}")];

        let mut walker = TreeWalker::new();
        for (name, messages) in [("First", FIRST), ("Second", SECOND)] {
            walker
                .register(Box::new(SameKey { name, messages }), CheckSettings::default())
                .unwrap();
        }

        let outcome = walker.walk(Path::new("A.java"), &sample());
        let rendered: Vec<String> = outcome
            .diagnostics
            .iter()
            .map(|d| walker.bundle().format(d))
            .collect();
        assert_eq!(
            rendered,
            vec!["first sees 1", "second sees 1", "first sees 2", "second sees 2"]
        );
    }
}
