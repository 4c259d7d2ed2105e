//! # walkcheck-core
//!
//! Core framework for tree-walking style checks over parsed source files.
//!
//! This crate provides the foundational traits and types for building
//! checks. It includes:
//!
//! - [`TokenKind`] and [`TokenSet`], the closed catalog of node kinds
//! - [`Tree`], an arena syntax tree navigated through [`NodeRef`]
//! - [`Check`], the plugin contract, and [`TreeWalker`], which drives it
//! - [`Auditor`] for orchestrating runs over many files
//! - [`Diagnostic`], [`FilterChain`] and [`AuditListener`] for reporting
//!
//! ## Example
//!
//! ```ignore
//! use walkcheck_core::{Auditor, CheckSettings, TreeWalker};
//!
//! let mut walker = TreeWalker::new();
//! walker.register(Box::new(MyCheck::default()), CheckSettings::default())?;
//!
//! let mut auditor = Auditor::builder()
//!     .root("./trees")
//!     .walker(walker)
//!     .build()?;
//!
//! let outcome = auditor.run()?;
//! println!("{}", outcome.report.format_test_report(Severity::Error));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod auditor;
mod check;
mod config;
mod context;
mod diagnostic;
mod directives;
mod filter;
mod listener;
mod messages;
mod parser;
mod report;
mod walker;

pub mod scope;
pub mod tokens;
pub mod tree;

pub use auditor::{AuditError, AuditOutcome, Auditor, AuditorBuilder, CancellationToken};
pub use check::{
    property, Check, CheckBox, CheckConstructor, CheckError, CheckRegistry, CheckResult,
    CheckSettings, PropertyError,
};
pub use config::{AuditConfig, CheckConfig, Config, ConfigError, SuppressionConfig};
pub use context::{CheckContext, NO_ARGS};
pub use diagnostic::{CheckIdentity, Diagnostic, DiagnosticCollector, Severity};
pub use directives::{
    parse_directive, CommentSuppressions, Directive, DirectiveKind, DEFAULT_ALLOW_RANGE,
};
pub use filter::{
    AnnotationSuppression, AuditEvent, Filter, FilterChain, IntRangeSet, SeverityMatchFilter,
    SuppressWarningsFilter, SuppressWarningsRegistry, SuppressionError, SuppressionRule,
};
pub use listener::{AuditListener, PlainTextLogger, RecordingListener, SeverityCounter};
pub use messages::{
    format_message, MessageBundle, CHECK_FAULT_KEY, IO_ERROR_KEY, PARSE_ERROR_KEY,
};
pub use parser::{dump_tree, AstDumpParser, ParseError, Parser};
pub use report::{AuditReport, FileReport, ReportedDiagnostic};
pub use tokens::{TokenKind, TokenSet, UnknownTokenKind};
pub use tree::{NodeId, NodeRef, Tree, TreeBuilder, TreeError};
pub use walker::{CheckFault, Hook, TreeWalker, WalkOutcome, WalkerFactory};
