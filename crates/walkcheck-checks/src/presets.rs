//! Check presets for common configurations.

use std::fmt;
use std::str::FromStr;

use walkcheck_core::{CheckConfig, Config, ConfigError, Severity};

use crate::{
    avoid_inline_conditionals, descendant_token, equals_hash_code, magic_number,
    missing_switch_default, redundant_modifier, super_call,
};

/// Preset configurations for walkcheck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// Recommended checks with sensible defaults.
    #[default]
    Recommended,
    /// Strict checks, every finding is an error.
    Strict,
    /// Minimal checks for gradual adoption.
    Minimal,
}

impl Preset {
    /// Every preset.
    pub const ALL: [Preset; 3] = [Preset::Recommended, Preset::Strict, Preset::Minimal];

    /// Lower-case preset name as written in configuration.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Recommended => "recommended",
            Self::Strict => "strict",
            Self::Minimal => "minimal",
        }
    }

    /// Returns the check configurations for this preset.
    #[must_use]
    pub fn checks(self) -> Vec<CheckConfig> {
        match self {
            Self::Recommended => recommended_checks(),
            Self::Strict => strict_checks(),
            Self::Minimal => minimal_checks(),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownPreset(s.to_string()))
    }
}

fn with_severity(name: &str, severity: Severity) -> CheckConfig {
    CheckConfig {
        severity: Some(severity),
        ..CheckConfig::named(name)
    }
}

/// Returns the recommended set of checks.
///
/// Includes:
/// - `EqualsHashCode`, `MissingSwitchDefault`, `SuperClone`, `SuperFinalize`
///   as errors
/// - `RedundantModifier` and `MagicNumber` as warnings
#[must_use]
pub fn recommended_checks() -> Vec<CheckConfig> {
    vec![
        CheckConfig::named(equals_hash_code::NAME),
        CheckConfig::named(missing_switch_default::NAME),
        CheckConfig::named(super_call::CLONE_NAME),
        CheckConfig::named(super_call::FINALIZE_NAME),
        with_severity(redundant_modifier::NAME, Severity::Warning),
        with_severity(magic_number::NAME, Severity::Warning),
    ]
}

/// Returns the strict set of checks.
///
/// Includes all recommended checks as errors plus:
/// - `AvoidInlineConditionals`
/// - `DescendantToken` configured to forbid `return` inside `finally`
#[must_use]
pub fn strict_checks() -> Vec<CheckConfig> {
    let mut checks: Vec<CheckConfig> = recommended_checks()
        .into_iter()
        .map(|c| CheckConfig {
            severity: Some(Severity::Error),
            ..c
        })
        .collect();
    checks.push(CheckConfig::named(avoid_inline_conditionals::NAME));

    let mut return_from_finally = CheckConfig::named(descendant_token::NAME);
    return_from_finally.id = Some("ReturnFromFinally".to_string());
    return_from_finally.tokens = Some(vec!["LITERAL_FINALLY".to_string()]);
    return_from_finally.properties.insert(
        "limited_tokens".to_string(),
        toml::Value::from(vec!["LITERAL_RETURN"]),
    );
    return_from_finally
        .properties
        .insert("maximum_number".to_string(), toml::Value::Integer(0));
    return_from_finally.properties.insert(
        "maximum_message".to_string(),
        toml::Value::from("Return from finally is not allowed."),
    );
    checks.push(return_from_finally);
    checks
}

/// Returns the minimal set of checks.
///
/// For gradual adoption, only includes `EqualsHashCode` and
/// `MissingSwitchDefault`.
#[must_use]
pub fn minimal_checks() -> Vec<CheckConfig> {
    vec![
        CheckConfig::named(equals_hash_code::NAME),
        CheckConfig::named(missing_switch_default::NAME),
    ]
}

/// The checks a configuration asks for: its `[[checks]]` entries, or the
/// named preset (recommended when unset) if there are none.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownPreset`] for an unknown preset name.
pub fn resolve_checks(config: &Config) -> Result<Vec<CheckConfig>, ConfigError> {
    if !config.checks.is_empty() {
        return Ok(config.checks.clone());
    }
    let preset = match config.preset.as_deref() {
        Some(name) => name.parse()?,
        None => Preset::default(),
    };
    tracing::debug!(preset = %preset, "Using preset checks");
    Ok(preset.checks())
}
