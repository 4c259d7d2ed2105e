//! Dump command implementation.

use anyhow::{Context, Result};
use std::path::Path;
use walkcheck::{dump_tree, AstDumpParser, Parser};

/// Parses `file` and prints the tree in canonical dump form.
pub fn run(file: &Path) -> Result<()> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    print!("{}", canonical(&source, file)?);
    Ok(())
}

fn canonical(source: &str, file: &Path) -> Result<String> {
    let tree = AstDumpParser
        .parse(source, file)
        .with_context(|| format!("Failed to parse {}", file.display()))?;
    tracing::debug!("Parsed {} node(s) from {}", tree.len(), file.display());
    Ok(dump_tree(&tree))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_form_is_stable() {
        let source = "COMPILATION_UNIT -> COMPILATION_UNIT [1:0]\n`--CLASS_DEF -> CLASS_DEF [1:0]\n    `--IDENT -> A [1:6]\n";
        let first = canonical(source, Path::new("A.ast")).unwrap();
        assert_eq!(first, source);
        assert_eq!(canonical(&first, Path::new("A.ast")).unwrap(), first);
    }

    #[test]
    fn parse_failure_names_the_file() {
        let err = canonical("    |--IDENT -> x [1:0]\n", Path::new("Broken.ast")).unwrap_err();
        assert!(err.to_string().contains("Broken.ast"));
    }
}
