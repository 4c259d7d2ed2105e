//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# walkcheck configuration

# Preset used when no [[checks]] are listed: recommended, strict or minimal
preset = "recommended"

# Lowest severity that fails the run (info, warning, error)
# fail_on = "warning"

[audit]
# Root directory to audit (default: current directory)
# root = "./trees"

# Glob patterns to exclude
exclude = [
    "**/target/**",
    "**/generated/**",
]

# File extensions of tree dumps to audit
extensions = ["ast"]

# Worker threads; files are walked sequentially when unset
# parallelism = 4

# Listing checks replaces the preset. Checks run in the order listed.

# [[checks]]
# name = "MagicNumber"
# severity = "warning"
# properties = { ignore_numbers = [-1, 0, 1, 2, 100], ignore_hash_code_method = true }

# [[checks]]
# name = "DescendantToken"
# id = "ReturnFromFinally"
# tokens = ["LITERAL_FINALLY"]
# properties = { limited_tokens = ["LITERAL_RETURN"], maximum_number = 0, maximum_message = "Return from finally is not allowed." }

# Suppression rules remove matching diagnostics after the walk.

# [[suppress]]
# files = "Generated.*\\.ast$"
# checks = "MagicNumber"
# lines = "1-50"
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    write_config(Path::new("walkcheck.toml"), force)?;

    println!("Created walkcheck.toml");
    println!("\nNext steps:");
    println!("  1. Edit walkcheck.toml to configure checks");
    println!("  2. Run: walkcheck check");

    Ok(())
}

fn write_config(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)?;
    Ok(())
}
