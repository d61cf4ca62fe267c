//! Shared output formatting for match results, rules and vendor modules.

use anyhow::Result;
use instmatch::{RuleBundle, RuleRepository, VendorModule};

use crate::OutputFormat;

/// Print match results in the specified format.
pub fn print_bundles(bundles: &[RuleBundle], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_bundles_text(bundles),
        OutputFormat::Json => return print_json(&bundles),
        OutputFormat::Compact => print_bundles_compact(bundles),
    }
    Ok(())
}

fn print_bundles_text(bundles: &[RuleBundle]) {
    for bundle in bundles {
        println!(
            "\x1b[1m{}\x1b[0m (package {})",
            bundle.import_path(),
            bundle.package_name().unwrap_or("?")
        );
        for rule in bundle.file_rules() {
            println!("  {rule}");
        }
        for file in bundle.files() {
            println!("  {}", file.display());
            for rule in bundle.rules_in(file) {
                println!("    {rule}");
            }
        }
        println!();
    }

    let rules: usize = bundles.iter().map(RuleBundle::match_count).sum();
    let color = if bundles.is_empty() {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };
    println!(
        "{color}Matched {rules} rule(s) in {} package(s)\x1b[0m",
        bundles.len()
    );
}

fn print_bundles_compact(bundles: &[RuleBundle]) {
    for bundle in bundles {
        for rule in bundle.file_rules() {
            println!("{}: {rule}", bundle.import_path());
        }
        for file in bundle.files() {
            for rule in bundle.rules_in(file) {
                println!("{}: {rule}", file.display());
            }
        }
    }
}

/// Print the repository contents in the specified format.
pub fn print_rules(repo: &RuleRepository, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let all: Vec<_> = repo.iter().flat_map(|(_, rules)| rules).collect();
            return print_json(&all);
        }
        OutputFormat::Text => {
            for (import_path, rules) in repo.iter() {
                println!("{import_path}");
                for rule in rules {
                    println!("  {rule}");
                }
            }
            println!(
                "\n{} rule(s) for {} import path(s)",
                repo.len(),
                repo.import_path_count()
            );
        }
        OutputFormat::Compact => {
            for (_, rules) in repo.iter() {
                for rule in rules {
                    println!("{rule}");
                }
            }
        }
    }
    Ok(())
}

/// Print vendored modules in the specified format.
pub fn print_modules(modules: &[VendorModule], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => return print_json(&modules),
        OutputFormat::Text => {
            for module in modules {
                println!("{} {}", module.path, module.version);
                for package in &module.submodules {
                    println!("  {package}");
                }
            }
            println!("\n{} module(s)", modules.len());
        }
        OutputFormat::Compact => {
            for module in modules {
                println!("{} {}", module.path, module.version);
            }
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
