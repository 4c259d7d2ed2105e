//! # walkcheck
//!
//! Tree-walking style checker: pluggable checks visit the nodes of parsed
//! syntax trees and report diagnostics.
//!
//! This is the main facade crate that re-exports the core framework and the
//! built-in checks.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use walkcheck::{load_config, run_audit};
//!
//! let config = load_config(Path::new("."), None)?;
//! let outcome = run_audit(".", config)?;
//! std::process::exit(i32::from(outcome.error_count > 0));
//! ```
//!
//! ## `cargo test` Integration
//!
//! ```rust,ignore
//! #[test]
//! fn fixtures_are_clean() {
//!     walkcheck::assert_clean("tests/fixtures");
//! }
//! ```
//!
//! ## Comment Directives
//!
//! Diagnostics can be silenced from the checked source itself:
//!
//! ```text
//! // walkcheck: allow(MagicNumber) reason="protocol constant"
//! int port = 8080;
//!
//! // walkcheck: off(AvoidInlineConditionals)
//! ...
//! // walkcheck: on(AvoidInlineConditionals)
//! ```
//!
//! ## Programmatic Usage
//!
//! ```rust,ignore
//! use walkcheck::checks::{builtin_registry, Preset};
//! use walkcheck::{Auditor, TreeWalker};
//!
//! let walker = TreeWalker::from_config(&builtin_registry(), &Preset::Strict.checks())?;
//! let mut auditor = Auditor::builder()
//!     .root("./trees")
//!     .walker(walker)
//!     .build()?;
//!
//! let outcome = auditor.run()?;
//! ```

#![forbid(unsafe_code)]

// Re-export core types and traits
pub use walkcheck_core::*;

/// Built-in checks and presets.
pub mod checks {
    pub use walkcheck_checks::*;
}

mod runner;

pub use runner::{
    assert_clean, auditor_builder, load_config, run_audit, walker_factory, CONFIG_CANDIDATES,
};
