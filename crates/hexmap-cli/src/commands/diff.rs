//! Diff command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use hexmap_core::{build_from_records, load_library};

/// Run the diff command
pub fn run(old: &Path, new: &Path, output: &Path) -> Result<()> {
    let old_records = load_library(old)
        .with_context(|| format!("Failed to read address library {}", old.display()))?;
    let new_records = load_library(new)
        .with_context(|| format!("Failed to read address library {}", new.display()))?;

    println!(
        "Old library: {} records, new library: {} records",
        old_records.len(),
        new_records.len()
    );

    let mapping = build_from_records(&old_records, &new_records)?;
    mapping.save(output)?;
    println!(
        "Wrote {} moved addresses to {}",
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
    fn test_run_diff() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("steam.txt");
        let new = dir.path().join("store.txt");
        let output = dir.path().join("diff.json");
        fs::write(&old, "1 0x01000000\n2 0x02000000\n").unwrap();
        fs::write(&new, "1 0x01000000\n2 0x02000200\n").unwrap();

        run(&old, &new, &output).unwrap();
        let mapping = AddressMapping::load(&output).unwrap();
        assert_eq!(mapping.len(), 1);
        assert_eq!(
            mapping.get(HexAddress::new(0x02000000)),
            Some(HexAddress::new(0x02000200))
        );
    }

    #[test]
    fn test_run_diff_length_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("steam.txt");
        let new = dir.path().join("store.txt");
        let output = dir.path().join("diff.json");
        fs::write(&old, "1 0x01\n2 0x02\n3 0x03\n4 0x04\n5 0x05\n").unwrap();
        fs::write(&new, "1 0x11\n2 0x12\n3 0x13\n4 0x14\n").unwrap();

        assert!(run(&old, &new, &output).is_err());
        assert!(!output.exists());
    }
}
