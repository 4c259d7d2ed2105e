//! List checks command implementation.

use walkcheck::checks::{builtin_registry, Preset};

/// Runs the list-checks command. `verbose` adds each check's token sets.
pub fn run(verbose: bool) {
    let registry = builtin_registry();

    println!("Available checks:\n");
    println!("{:<26} Description", "Name");
    println!("{}", "-".repeat(80));

    for name in registry.names() {
        let Some(check) = registry.create(name) else {
            continue;
        };
        println!("{:<26} {}", check.name(), check.description());
        if verbose {
            println!("{:<26}   default:    {}", "", check.default_tokens());
            println!("{:<26}   acceptable: {}", "", check.acceptable_tokens());
            println!("{:<26}   required:   {}", "", check.required_tokens());
        }
    }

    println!("\nPresets (used when no [[checks]] are configured):");
    for preset in Preset::ALL {
        let names: Vec<String> = preset
            .checks()
            .into_iter()
            .map(|c| c.id.unwrap_or(c.name))
            .collect();
        println!("  {:<12} - {}", preset.name(), names.join(", "));
    }

    println!("\nUse --checks to run specific checks, e.g.:");
    println!("  walkcheck check --checks MagicNumber,EqualsHashCode");
}
