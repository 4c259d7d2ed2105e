//! Name → constructor registry of the built-in checks.

use walkcheck_core::{Check, CheckBox, CheckRegistry};

use crate::{
    avoid_inline_conditionals, descendant_token, equals_hash_code, magic_number,
    missing_switch_default, redundant_modifier, super_call, suppress_warnings,
    AvoidInlineConditionals, DescendantToken, EqualsHashCode, MagicNumber, MissingSwitchDefault,
    RedundantModifier, SuperClone, SuperFinalize, SuppressWarningsHolder,
};

fn construct<C: Check + Default + 'static>() -> CheckBox {
    Box::new(C::default())
}

/// Registry holding every built-in check under its registered name.
///
/// The `SuppressWarningsHolder` registered here records into a registry no
/// filter reads; use [`SuppressWarningsHolder::install`] to connect it.
#[must_use]
pub fn builtin_registry() -> CheckRegistry {
    let mut registry = CheckRegistry::new();
    registry.register(
        avoid_inline_conditionals::NAME,
        construct::<AvoidInlineConditionals>,
    );
    registry.register(descendant_token::NAME, construct::<DescendantToken>);
    registry.register(equals_hash_code::NAME, construct::<EqualsHashCode>);
    registry.register(magic_number::NAME, construct::<MagicNumber>);
    registry.register(
        missing_switch_default::NAME,
        construct::<MissingSwitchDefault>,
    );
    registry.register(redundant_modifier::NAME, construct::<RedundantModifier>);
    registry.register(super_call::CLONE_NAME, construct::<SuperClone>);
    registry.register(super_call::FINALIZE_NAME, construct::<SuperFinalize>);
    registry.register(suppress_warnings::NAME, construct::<SuppressWarningsHolder>);
    registry
}
