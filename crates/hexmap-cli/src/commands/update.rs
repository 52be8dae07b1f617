//! Update command implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use hexmap_core::{AddressMapping, ChecksumSet, RewriteOptions, RewriteOutcome, update_directory};
use owo_colors::OwoColorize;
use tracing::debug;

use crate::config::Config;

/// Pick the already-patched list: an explicit path must exist, the configured
/// default is used only when present.
fn load_known_patched(config: &Config, explicit: Option<PathBuf>) -> Result<Option<ChecksumSet>> {
    match explicit {
        Some(path) => Ok(Some(ChecksumSet::load(&path)?)),
        None if config.checksums.is_file() => Ok(Some(ChecksumSet::load(&config.checksums)?)),
        None => {
            debug!(
                "No checksum list at {}, skipping already-patched check",
                config.checksums.display()
            );
            Ok(None)
        }
    }
}

/// Run the update command
pub fn run(
    config: &Config,
    silent: bool,
    path: &Path,
    dictfile: &Path,
    no_backup: bool,
    checksums: Option<PathBuf>,
) -> Result<()> {
    if !path.is_dir() {
        bail!("No files to update: {} is not a folder", path.display());
    }

    let mapping = AddressMapping::load(dictfile)
        .with_context(|| format!("Hex table not found or invalid: {}", dictfile.display()))?;
    let known_patched = load_known_patched(config, checksums)?;

    let options = RewriteOptions {
        backup: config.backup && !no_backup,
        silent,
        known_patched: known_patched.as_ref(),
    };
    let summary = update_directory(path, &config.extensions, &mapping, &options)?;

    for (file, outcome) in &summary.files {
        let name = file.display();
        match outcome {
            RewriteOutcome::Rewritten {
                replacements,
                unmapped,
                ..
            } => {
                println!(
                    "{} {} ({} replaced, {} unmapped)",
                    "updated".green(),
                    name,
                    replacements,
                    unmapped.len()
                );
            }
            RewriteOutcome::Unchanged { unmapped } if !silent => {
                println!("{} {} ({} unmapped)", "unchanged".dimmed(), name, unmapped.len());
            }
            RewriteOutcome::AlreadyPatched => {
                println!("{} {}", "already patched".yellow(), name);
            }
            RewriteOutcome::Unchanged { .. } => {}
        }
    }

    println!();
    println!(
        "Updated {} of {} files, {} replacements",
        summary.rewritten(),
        summary.files.len(),
        summary.replacements()
    );
    if summary.unmapped() > 0 {
        println!(
            "{}",
            format!(
                "{} literals had no replacement; check the hex table matches this version",
                summary.unmapped()
            )
            .yellow()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexmap_core::{HexAddress, digest_file};
    use std::fs;

    fn write_table(dir: &Path) -> PathBuf {
        let table: AddressMapping = [(HexAddress::new(0x01000000), HexAddress::new(0x01000100))]
            .into_iter()
            .collect();
        let path = dir.join("table.json");
        table.save(&path).unwrap();
        path
    }

    #[test]
    fn test_run_update_with_backup() {
        let src = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let file = src.path().join("offsets.h");
        fs::write(&file, "REL::Offset(0x01000000);\n").unwrap();
        let table = write_table(work.path());

        let config = Config {
            checksums: work.path().join("checksums.txt"),
            ..Config::default()
        };
        run(&config, true, src.path(), &table, false, None).unwrap();

        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "REL::Offset(0x01000100);\n"
        );
        assert!(src.path().join("offsets.h.bak").exists());
    }

    #[test]
    fn test_run_update_no_backup_flag() {
        let src = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        fs::write(src.path().join("offsets.h"), "0x01000000\n").unwrap();
        let table = write_table(work.path());

        let config = Config {
            checksums: work.path().join("checksums.txt"),
            ..Config::default()
        };
        run(&config, true, src.path(), &table, true, None).unwrap();
        assert!(!src.path().join("offsets.h.bak").exists());
    }

    #[test]
    fn test_run_update_skips_known_patched() {
        let src = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let file = src.path().join("offsets.h");
        fs::write(&file, "0x01000000\n").unwrap();
        let table = write_table(work.path());

        let list = work.path().join("patched.txt");
        fs::write(&list, format!("{}\n", digest_file(&file).unwrap())).unwrap();

        run(&Config::default(), true, src.path(), &table, false, Some(list)).unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), "0x01000000\n");
    }

    #[test]
    fn test_run_update_missing_explicit_checksums_fails() {
        let src = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        fs::write(src.path().join("offsets.h"), "0x01000000\n").unwrap();
        let table = write_table(work.path());

        let missing = work.path().join("missing.txt");
        let result = run(&Config::default(), true, src.path(), &table, false, Some(missing));
        assert!(result.is_err());
        assert_eq!(
            fs::read_to_string(src.path().join("offsets.h")).unwrap(),
            "0x01000000\n"
        );
    }

    #[test]
    fn test_run_update_missing_table_fails() {
        let src = tempfile::tempdir().unwrap();
        fs::write(src.path().join("offsets.h"), "0x01000000\n").unwrap();
        let missing = src.path().join("nope.json");
        assert!(run(&Config::default(), true, src.path(), &missing, false, None).is_err());
    }
}
