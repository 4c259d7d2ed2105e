//! Configuration types for walkcheck.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::check::{CheckSettings, PropertyError};
use crate::diagnostic::Severity;
use crate::filter::{FilterChain, SuppressionError};
use crate::tokens::{TokenKind, TokenSet, UnknownTokenKind};

/// Top-level configuration for walkcheck.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Preset used when no checks are listed (e.g. "recommended", "strict", "minimal").
    #[serde(default)]
    pub preset: Option<String>,

    /// Lowest severity counted toward the audit's error count (default: error).
    #[serde(default)]
    pub fail_on: Option<Severity>,

    /// File discovery and execution settings.
    #[serde(default)]
    pub audit: AuditConfig,

    /// Checks in registration order.
    #[serde(default)]
    pub checks: Vec<CheckConfig>,

    /// Suppression rules in filter order.
    #[serde(default)]
    pub suppress: Vec<SuppressionConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Threshold severity, defaulting to `error`.
    #[must_use]
    pub fn fail_on(&self) -> Severity {
        self.fail_on.unwrap_or(Severity::Error)
    }

    /// Checks that are not disabled, in order.
    pub fn enabled_checks(&self) -> impl Iterator<Item = &CheckConfig> {
        self.checks.iter().filter(|c| c.is_enabled())
    }

    /// Finds the first entry for a check name.
    #[must_use]
    pub fn check(&self, name: &str) -> Option<&CheckConfig> {
        self.checks.iter().find(|c| c.name == name)
    }

    /// Compiles the suppression rules.
    ///
    /// # Errors
    ///
    /// Returns the first rule that fails to compile.
    pub fn filter_chain(&self) -> Result<FilterChain, ConfigError> {
        Ok(FilterChain::from_config(&self.suppress)?)
    }
}

/// File discovery and execution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Root directory to audit (default: current directory).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Glob patterns to exclude.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// File extensions to audit.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Number of worker threads; files are walked sequentially when unset.
    #[serde(default)]
    pub parallelism: Option<usize>,

    /// Lines an `allow` comment covers when it gives no `range=`.
    #[serde(default)]
    pub allow_range: Option<i64>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            exclude: vec!["**/target/**".to_string()],
            extensions: default_extensions(),
            parallelism: None,
            allow_range: None,
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_extensions() -> Vec<String> {
    vec!["ast".to_string()]
}

/// One configured check.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Registered check name.
    pub name: String,

    /// Identity used in reports and suppression rules.
    #[serde(default)]
    pub id: Option<String>,

    /// Whether this check runs.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity of the check's diagnostics (default: error).
    #[serde(default)]
    pub severity: Option<Severity>,

    /// Token kind names overriding the default subscription.
    #[serde(default)]
    pub tokens: Option<Vec<String>>,

    /// Check-specific properties.
    #[serde(default)]
    pub properties: toml::Table,

    /// Message template overrides keyed by message key.
    #[serde(default)]
    pub messages: BTreeMap<String, String>,
}

impl CheckConfig {
    /// Entry with defaults for everything but the name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns true unless explicitly disabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    /// Registration settings for the walker.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownToken`] if the token override names an
    /// unknown kind.
    pub fn settings(&self) -> Result<CheckSettings, ConfigError> {
        let tokens = self
            .tokens
            .as_deref()
            .map(TokenSet::parse_names)
            .transpose()
            .map_err(|source| ConfigError::UnknownToken {
                check: self.name.clone(),
                source,
            })?;
        Ok(CheckSettings {
            id: self.id.clone(),
            severity: self.severity.unwrap_or_default(),
            tokens,
            messages: self.messages.clone(),
        })
    }
}

/// One suppression rule as written in configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuppressionConfig {
    /// Regex over the file path.
    #[serde(default)]
    pub files: Option<String>,
    /// Regex over the check name or id.
    #[serde(default)]
    pub checks: Option<String>,
    /// Regex over the rendered message.
    #[serde(default)]
    pub message: Option<String>,
    /// Line ranges, e.g. "10-20,25".
    #[serde(default)]
    pub lines: Option<String>,
    /// Column ranges.
    #[serde(default)]
    pub columns: Option<String>,
}

/// Configuration errors. All of them are raised before any file is read.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    #[diagnostic(code(walkcheck::config::io))]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    #[diagnostic(code(walkcheck::config::parse))]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// No check is registered under this name.
    #[error("unknown check `{name}`")]
    #[diagnostic(
        code(walkcheck::config::unknown_check),
        help("run `walkcheck list-checks` to see the available checks")
    )]
    UnknownCheck {
        /// Name as configured.
        name: String,
    },

    /// Unknown preset name.
    #[error("unknown preset `{0}`")]
    #[diagnostic(
        code(walkcheck::config::unknown_preset),
        help("available presets: recommended, strict, minimal")
    )]
    UnknownPreset(String),

    /// A token override names an unknown kind.
    #[error("check `{check}`: {source}")]
    #[diagnostic(code(walkcheck::config::unknown_token))]
    UnknownToken {
        /// Check being configured.
        check: String,
        /// The lookup failure.
        source: UnknownTokenKind,
    },

    /// A token override is outside the check's acceptable set.
    #[error("check `{check}` does not accept token {token}")]
    #[diagnostic(
        code(walkcheck::config::token_not_acceptable),
        help("run `walkcheck list-checks --verbose` to see the tokens each check accepts")
    )]
    TokenNotAcceptable {
        /// Check being configured.
        check: String,
        /// First offending token.
        token: TokenKind,
    },

    /// A token override drops a required token.
    #[error("check `{check}` requires token {token}")]
    #[diagnostic(
        code(walkcheck::config::missing_required_token),
        help("required tokens cannot be removed from a check's subscription")
    )]
    MissingRequiredToken {
        /// Check being configured.
        check: String,
        /// First missing token.
        token: TokenKind,
    },

    /// The check's own token sets contradict each other.
    #[error("check `{check}` is inconsistent: {detail}")]
    #[diagnostic(code(walkcheck::config::inconsistent_check))]
    InconsistentCheck {
        /// Offending check.
        check: String,
        /// Which set is not contained in the acceptable set.
        detail: String,
    },

    /// A property could not be applied.
    #[error("check `{check}`: {source}")]
    #[diagnostic(code(walkcheck::config::property))]
    Property {
        /// Check being configured.
        check: String,
        /// The failure.
        source: PropertyError,
    },

    /// A suppression rule is invalid.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Suppression(#[from] SuppressionError),
}
