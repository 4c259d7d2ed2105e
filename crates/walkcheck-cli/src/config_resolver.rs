//! Locates the configuration for an audit.
//!
//! Lookup order, first hit wins:
//!
//! 1. `--config` (or `$WALKCHECK_CONFIG`), taken as given
//! 2. `walkcheck.toml`, then `.walkcheck.toml`, in the audited directory
//! 3. `config.toml` in the user directory (`$WALKCHECK_CONFIG_DIR` or `~/.walkcheck/`)
//! 4. built-in defaults

use std::path::{Path, PathBuf};

use walkcheck::{Config, ConfigError, CONFIG_CANDIDATES};

/// File name looked up inside the user directory.
const USER_CONFIG_FILE: &str = "config.toml";

/// Environment variable overriding the user directory.
const USER_DIR_ENV: &str = "WALKCHECK_CONFIG_DIR";

/// Origin of the configuration used for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given on the command line.
    Explicit(PathBuf),
    /// Next to the audited files.
    Project(PathBuf),
    /// From the user directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// File backing this source.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Reads and parses the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(&self) -> Result<Config, ConfigError> {
        match self {
            Self::Default => {
                tracing::debug!("No config file found, using the recommended preset");
                Ok(Config::default())
            }
            Self::Global(p) => {
                tracing::info!("Using global config: {}", p.display());
                Config::from_file(p)
            }
            Self::Explicit(p) | Self::Project(p) => Config::from_file(p),
        }
    }
}

/// Finds the configuration for auditing `project_dir`.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    let user_dir = std::env::var_os(USER_DIR_ENV)
        .map(PathBuf::from)
        .or_else(|| home::home_dir().map(|home| home.join(".walkcheck")));
    resolve_in(project_dir, explicit, user_dir.as_deref())
}

/// Lookup with the user directory passed in, so tests never touch the
/// environment.
fn resolve_in(project_dir: &Path, explicit: Option<&Path>, user_dir: Option<&Path>) -> ConfigSource {
    if let Some(path) = explicit {
        // a missing file is reported by `load`
        return ConfigSource::Explicit(path.to_path_buf());
    }

    let project = CONFIG_CANDIDATES
        .iter()
        .map(|name| project_dir.join(name))
        .find(|candidate| candidate.is_file());
    if let Some(path) = project {
        tracing::debug!("Found project config: {}", path.display());
        return ConfigSource::Project(path);
    }

    match user_dir.map(|dir| dir.join(USER_CONFIG_FILE)) {
        Some(path) if path.is_file() => {
            tracing::debug!("Found global config: {}", path.display());
            ConfigSource::Global(path)
        }
        _ => ConfigSource::Default,
    }
}
