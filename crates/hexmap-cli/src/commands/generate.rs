//! Generate command implementation.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use hexmap_core::generate_from_directories;

use crate::config::Config;

/// Default table name for a version/commit pair
pub fn table_file_name(game_version: &str, commit: &str) -> PathBuf {
    PathBuf::from(format!("hex_table_{}_{}.json", game_version, commit))
}

/// Run the generate command
pub fn run(
    config: &Config,
    old_dir: &Path,
    new_dir: &Path,
    game_version: &str,
    commit: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    if !old_dir.is_dir() || !new_dir.is_dir() {
        bail!(
            "No paths provided for generating hex table: {} and {} must both be folders",
            old_dir.display(),
            new_dir.display()
        );
    }

    let mapping = generate_from_directories(old_dir, new_dir, &config.extensions)?;

    let output = output.unwrap_or_else(|| table_file_name(game_version, commit));
    mapping.save(&output)?;
    println!(
        "Wrote {} address mappings to {}",
        mapping.len(),
        output.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexmap_core::{AddressMapping, HexAddress};
    use std::fs;

    #[test]
    fn test_table_file_name() {
        assert_eq!(
            table_file_name("1.7.23", "abc123"),
            PathBuf::from("hex_table_1.7.23_abc123.json")
        );
    }

    #[test]
    fn test_run_writes_table() {
        let old_dir = tempfile::tempdir().unwrap();
        let new_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        fs::write(old_dir.path().join("a.h"), "0x01000000\n").unwrap();
        fs::write(new_dir.path().join("a.h"), "0x01000040\n").unwrap();

        let output = out_dir.path().join("table.json");
        run(
            &Config::default(),
            old_dir.path(),
            new_dir.path(),
            "",
            "",
            Some(output.clone()),
        )
        .unwrap();

        let mapping = AddressMapping::load(&output).unwrap();
        assert_eq!(
            mapping.get(HexAddress::new(0x01000000)),
            Some(HexAddress::new(0x01000040))
        );
    }

    #[test]
    fn test_run_mismatch_writes_nothing() {
        let old_dir = tempfile::tempdir().unwrap();
        let new_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        fs::write(old_dir.path().join("a.h"), "0x01000000 0x02000000\n").unwrap();
        fs::write(new_dir.path().join("a.h"), "0x01000040\n").unwrap();

        let output = out_dir.path().join("table.json");
        let result = run(
            &Config::default(),
            old_dir.path(),
            new_dir.path(),
            "",
            "",
            Some(output.clone()),
        );
        assert!(result.is_err());
        assert!(!output.exists());
    }
}
