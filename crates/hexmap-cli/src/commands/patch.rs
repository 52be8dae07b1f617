//! Patch command implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hexmap_core::{PatchOptions, builtin_rules, load_rules, patch_tree, resolve_patch_root};
use owo_colors::OwoColorize;

use crate::config::Config;

/// Run the patch command
pub fn run(
    config: &Config,
    silent: bool,
    path: Option<&Path>,
    rules: Option<PathBuf>,
    no_backup: bool,
) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let root = resolve_patch_root(path, &cwd)?;

    let rules = match rules.or_else(|| config.rules.clone()) {
        Some(file) => load_rules(&file)
            .with_context(|| format!("Failed to load patch rules from {}", file.display()))?,
        None => builtin_rules(),
    };

    let options = PatchOptions {
        backup: config.backup && !no_backup,
        silent,
    };
    let results = patch_tree(&root, &rules, &options)?;

    if results.is_empty() {
        println!("No files to patch under {}", root.display());
        return Ok(());
    }

    for result in &results {
        let name = result.path.display();
        if result.written {
            println!("{} {}", "patched".green(), name);
        } else if result.already_patched() {
            if !silent {
                println!("{} {}", "already patched".yellow(), name);
            }
        } else {
            println!("{} {}", "not patched".red(), name);
        }
        if result.not_found() > 0 {
            println!(
                "  {}",
                format!("{} edits could not be located", result.not_found()).red()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexmap_core::{Edit, PatchRule, save_rules};
    use std::fs;

    #[test]
    fn test_run_patch_with_rule_file() {
        let root = tempfile::tempdir().unwrap();
        let sfse = root.path().join("sfse");
        fs::create_dir(&sfse).unwrap();
        fs::write(sfse.join("main.cpp"), "a\n    kProcType_Steam,\nb\n").unwrap();

        let rules_file = root.path().join("rules.json");
        save_rules(
            &rules_file,
            &[PatchRule {
                file: "main.cpp".to_string(),
                edits: vec![Edit::duplicate_replace(2, "Steam", "WinStore")],
            }],
        )
        .unwrap();

        let config = Config::default();
        run(&config, true, Some(root.path()), Some(rules_file.clone()), true).unwrap();
        run(&config, true, Some(root.path()), Some(rules_file), true).unwrap();

        assert_eq!(
            fs::read_to_string(sfse.join("main.cpp")).unwrap(),
            "a\n    kProcType_Steam,\n    kProcType_WinStore,\nb\n"
        );
        assert!(!sfse.join("main.cpp.bak").exists());
    }
}
