//! # walkcheck-checks
//!
//! Built-in checks for walkcheck.
//!
//! Each check implements [`walkcheck_core::Check`] and is registered by name
//! in [`builtin_registry`], so configuration files can refer to it.
//!
//! ## Available Checks
//!
//! | Name | Tokens | Message keys |
//! |------|--------|--------------|
//! | `AvoidInlineConditionals` | `QUESTION` | `inline.conditional.avoid` |
//! | `DescendantToken` | configured | `descendant.token.{min,max,sum.min,sum.max}` |
//! | `EqualsHashCode` | `METHOD_DEF` | `equals.noHashCode`, `equals.noEquals` |
//! | `MagicNumber` | numeric literals | `magic.number` |
//! | `MissingSwitchDefault` | `LITERAL_SWITCH` | `missing.switch.default` |
//! | `RedundantModifier` | declarations | `redundantModifier` |
//! | `SuperClone` | `METHOD_DEF`, `LITERAL_SUPER` | `missing.super.call` |
//! | `SuperFinalize` | `METHOD_DEF`, `LITERAL_SUPER` | `missing.super.call` |
//! | `SuppressWarningsHolder` | `ANNOTATION` | none |
//!
//! ## Usage
//!
//! ```ignore
//! use walkcheck_checks::{builtin_registry, Preset};
//! use walkcheck_core::TreeWalker;
//!
//! let walker = TreeWalker::from_config(&builtin_registry(), &Preset::Strict.checks())?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod avoid_inline_conditionals;
pub mod descendant_token;
pub mod equals_hash_code;
pub mod magic_number;
pub mod missing_switch_default;
pub mod redundant_modifier;
pub mod super_call;
pub mod suppress_warnings;

mod presets;
mod registry;

#[cfg(test)]
mod test_util;

pub use avoid_inline_conditionals::AvoidInlineConditionals;
pub use descendant_token::DescendantToken;
pub use equals_hash_code::EqualsHashCode;
pub use magic_number::MagicNumber;
pub use missing_switch_default::MissingSwitchDefault;
pub use presets::{minimal_checks, recommended_checks, resolve_checks, strict_checks, Preset};
pub use redundant_modifier::RedundantModifier;
pub use registry::builtin_registry;
pub use super_call::{SuperClone, SuperFinalize};
pub use suppress_warnings::SuppressWarningsHolder;

/// Re-export core types for convenience.
pub use walkcheck_core::{Check, Severity};
