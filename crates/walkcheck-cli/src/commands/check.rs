//! Check command implementation.

use anyhow::{Context, Result};
use std::path::Path;
use walkcheck::checks::resolve_checks;
use walkcheck::{AuditError, CheckConfig, Config, ConfigError, PlainTextLogger, Severity};

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Command-line overrides for one audit.
#[derive(Debug, Default)]
pub struct CheckOptions {
    /// How results are printed.
    pub format: OutputFormat,
    /// Comma-separated check names or ids to keep.
    pub checks: Option<String>,
    /// Extra exclude patterns.
    pub exclude: Vec<String>,
    /// Worker threads.
    pub jobs: Option<usize>,
    /// Threshold override.
    pub fail_on: Option<Severity>,
}

/// Runs the check command.
pub fn run(path: &Path, options: &CheckOptions, source: &ConfigSource) -> Result<()> {
    let mut config = source.load().map_err(render).with_context(|| match source.path() {
        Some(p) => format!("Failed to load config: {}", p.display()),
        None => "Failed to load default config".to_string(),
    })?;
    apply_options(&mut config, options).map_err(render)?;
    let fail_on = options.fail_on.unwrap_or_else(|| config.fail_on());

    let mut builder = walkcheck::auditor_builder(config)
        .map_err(render)?
        .root(path)
        .excludes(options.exclude.iter().cloned())
        .fail_on(fail_on);
    if matches!(options.format, OutputFormat::Text) {
        builder = builder.listener(PlainTextLogger::new(std::io::stdout()));
    }

    let mut auditor = match builder.build() {
        Ok(auditor) => auditor,
        Err(AuditError::Config(e)) => return Err(render(e)),
        Err(e) => return Err(e).context("Failed to build auditor"),
    };

    tracing::info!(
        "Auditing {} with {} checks",
        path.display(),
        auditor.check_count()
    );

    let outcome = auditor.run().context("Audit failed")?;

    super::output::print(&outcome, options.format, fail_on)?;

    // Exit with error code if anything counted
    if outcome.error_count > 0 {
        std::process::exit(1);
    }

    Ok(())
}

/// Narrows the configured checks and applies the thread count.
fn apply_options(config: &mut Config, options: &CheckOptions) -> Result<(), ConfigError> {
    if let Some(jobs) = options.jobs {
        config.audit.parallelism = Some(jobs);
    }
    if let Some(filter) = &options.checks {
        let names: Vec<&str> = filter
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .collect();
        config.checks = select_checks(resolve_checks(config)?, &names);
    }
    Ok(())
}

/// Keeps configured entries whose name or id is listed; listed names with no
/// entry run with their defaults.
fn select_checks(configured: Vec<CheckConfig>, names: &[&str]) -> Vec<CheckConfig> {
    let matches = |entry: &CheckConfig, name: &str| {
        entry.name == name || entry.id.as_deref() == Some(name)
    };
    let mut selected: Vec<CheckConfig> = configured
        .iter()
        .filter(|entry| names.iter().any(|name| matches(entry, name)))
        .cloned()
        .collect();
    for name in names {
        if !configured.iter().any(|entry| matches(entry, name)) {
            tracing::debug!("Check {} not configured, running with defaults", name);
            selected.push(CheckConfig::named(*name));
        }
    }
    selected
}

/// Renders configuration errors with their help text.
fn render(error: ConfigError) -> anyhow::Error {
    anyhow::anyhow!("{:?}", miette::Report::new(error))
}
