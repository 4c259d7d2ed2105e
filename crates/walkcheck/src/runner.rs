//! Wiring between configuration, the built-in checks and the auditor.

use std::path::{Path, PathBuf};

use walkcheck_checks::{builtin_registry, resolve_checks, SuppressWarningsHolder};
use walkcheck_core::{
    AuditError, AuditOutcome, Auditor, AuditorBuilder, CheckConfig, CheckRegistry, Config,
    ConfigError, TreeWalker,
};

/// Config file names to search for, in priority order.
pub const CONFIG_CANDIDATES: &[&str] = &["walkcheck.toml", ".walkcheck.toml"];

/// Returns a factory building a fresh walker for `checks` on every call.
///
/// Each worker of a parallel audit calls it once, so no check instance is
/// shared between concurrent walks.
pub fn walker_factory(
    registry: CheckRegistry,
    checks: Vec<CheckConfig>,
) -> impl Fn() -> Result<TreeWalker, ConfigError> + Send + Sync + 'static {
    move || TreeWalker::from_config(&registry, &checks)
}

/// An auditor builder configured from `config` with the built-in checks.
///
/// Checks come from `[[checks]]`, or from the configured preset when none
/// are listed. `@SuppressWarnings` annotations take effect when
/// `SuppressWarningsHolder` is among them. Further builder calls can add
/// listeners, filters or override the root.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownPreset`] if the preset name is unknown.
pub fn auditor_builder(config: Config) -> Result<AuditorBuilder, ConfigError> {
    let checks = resolve_checks(&config)?;
    tracing::debug!(checks = checks.len(), "Resolved check configuration");
    let mut registry = builtin_registry();
    let annotations = SuppressWarningsHolder::install(&mut registry);
    Ok(Auditor::builder()
        .walker_factory(walker_factory(registry, checks))
        .config(config)
        .filter(annotations))
}

/// Audits every matching file under `root` with the built-in checks.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or file discovery fails.
/// Read, parse and check failures are reported in the outcome instead.
pub fn run_audit(root: impl Into<PathBuf>, config: Config) -> Result<AuditOutcome, AuditError> {
    let mut auditor = auditor_builder(config)?.root(root).build()?;
    auditor.run()
}

/// Loads the configuration for `root`.
///
/// An explicit path wins; relative paths are resolved against `root`.
/// Otherwise the first of [`CONFIG_CANDIDATES`] found in `root` is used, and
/// the default configuration if there is none.
///
/// # Errors
///
/// Returns an error if the chosen file cannot be read or parsed.
pub fn load_config(root: &Path, explicit: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = explicit {
        let full_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        };
        return Config::from_file(&full_path);
    }

    for candidate in CONFIG_CANDIDATES {
        let path = root.join(candidate);
        if path.exists() {
            tracing::debug!("Using config {}", path.display());
            return Config::from_file(&path);
        }
    }

    Ok(Config::default())
}

/// Audits `root` with its own configuration and panics with a readable
/// report if anything at or above the configured threshold was found.
///
/// Meant for `#[test]` functions that keep a tree of fixtures clean.
///
/// # Panics
///
/// Panics if the configuration is invalid, the audit fails, or the audit
/// counts any problem.
pub fn assert_clean(root: impl AsRef<Path>) {
    let root = root.as_ref();
    let config = load_config(root, None).unwrap_or_else(|e| {
        panic!("walkcheck: failed to load config: {e}");
    });
    let fail_on = config.fail_on();

    let outcome = run_audit(root, config).unwrap_or_else(|e| {
        panic!("walkcheck: audit failed: {e}");
    });

    if outcome.error_count > 0 {
        let report = outcome.report.format_test_report(fail_on);
        panic!("{report}");
    }
}
