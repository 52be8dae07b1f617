use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info, warn};

use super::AddressMapping;
use crate::address::HexAddress;
use crate::error::{Error, Result};
use crate::library::AddressRecord;
use crate::source::{list_source_files, scrape_file};

fn check_lengths(old: usize, new: usize) -> Result<()> {
    if old != new {
        return Err(Error::LengthMismatch { old, new });
    }
    Ok(())
}

fn insert_pair(mapping: &mut AddressMapping, old: HexAddress, new: HexAddress) {
    if let Some(existing) = mapping.insert_first(old, new) {
        if existing != new {
            warn!(
                "Conflicting targets for {}: keeping {}, ignoring {}",
                old, existing, new
            );
        }
    }
}

/// Pair two address library extracts by record ID.
///
/// Only IDs whose address moved between builds produce an entry. IDs present
/// in one extract only are skipped.
pub fn build_from_records(old: &[AddressRecord], new: &[AddressRecord]) -> Result<AddressMapping> {
    check_lengths(old.len(), new.len())?;

    let mut new_by_id: HashMap<u64, HexAddress> = HashMap::with_capacity(new.len());
    for record in new {
        let kept = *new_by_id.entry(record.id).or_insert(record.address);
        if kept != record.address {
            warn!(
                "Duplicate ID {} in new library: keeping {}, ignoring {}",
                record.id, kept, record.address
            );
        }
    }

    let mut mapping = AddressMapping::new();
    let mut missing = 0usize;
    for record in old {
        match new_by_id.get(&record.id) {
            Some(&new_address) if new_address != record.address => {
                insert_pair(&mut mapping, record.address, new_address);
            }
            Some(_) => {}
            None => {
                debug!("ID {} not present in new library, skipping", record.id);
                missing += 1;
            }
        }
    }

    info!(
        "Built {} mappings from {} records ({} IDs unmatched)",
        mapping.len(),
        old.len(),
        missing
    );
    Ok(mapping)
}

/// Pair two address lists by position.
pub fn build_from_positions(old: &[HexAddress], new: &[HexAddress]) -> Result<AddressMapping> {
    check_lengths(old.len(), new.len())?;

    let mut mapping = AddressMapping::new();
    for (&old_address, &new_address) in old.iter().zip(new) {
        if old_address != new_address {
            insert_pair(&mut mapping, old_address, new_address);
        }
    }

    info!(
        "Built {} mappings from {} address pairs",
        mapping.len(),
        old.len()
    );
    Ok(mapping)
}

/// Scrape the same set of files from two source trees and pair their
/// literals by position.
///
/// The file list is taken from `old_dir`; every one of those files must also
/// exist in `new_dir`.
pub fn generate_from_directories(
    old_dir: &Path,
    new_dir: &Path,
    extensions: &[String],
) -> Result<AddressMapping> {
    let files = list_source_files(old_dir, extensions)?;
    if files.is_empty() {
        return Err(Error::NoSourceFiles(old_dir.to_path_buf()));
    }

    let mut old_addresses = Vec::new();
    let mut new_addresses = Vec::new();
    for old_file in &files {
        let Some(name) = old_file.file_name() else {
            continue;
        };
        old_addresses.extend(scrape_file(old_file)?);
        new_addresses.extend(scrape_file(&new_dir.join(name))?);
    }

    debug!(
        "Scraped {} old and {} new literals from {} files",
        old_addresses.len(),
        new_addresses.len(),
        files.len()
    );
    build_from_positions(&old_addresses, &new_addresses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn rec(id: u64, address: u64) -> AddressRecord {
        AddressRecord::new(id, HexAddress::new(address))
    }

    fn addr(value: u64) -> HexAddress {
        HexAddress::new(value)
    }

    #[test]
    fn test_entry_only_when_address_differs() {
        let old = vec![rec(1, 0x1000), rec(2, 0x2000), rec(3, 0x3000)];
        let new = vec![rec(1, 0x1000), rec(2, 0x2100), rec(3, 0x3300)];

        let mapping = build_from_records(&old, &new).unwrap();
        assert_eq!(mapping.len(), 2);
        assert!(!mapping.contains(addr(0x1000)));
        assert_eq!(mapping.get(addr(0x2000)), Some(addr(0x2100)));
        assert_eq!(mapping.get(addr(0x3000)), Some(addr(0x3300)));
    }

    #[test]
    fn test_records_pair_by_id_not_position() {
        let old = vec![rec(1, 0x1000), rec(2, 0x2000)];
        let new = vec![rec(2, 0x2200), rec(1, 0x1100)];

        let mapping = build_from_records(&old, &new).unwrap();
        assert_eq!(mapping.get(addr(0x1000)), Some(addr(0x1100)));
        assert_eq!(mapping.get(addr(0x2000)), Some(addr(0x2200)));
    }

    #[test]
    fn test_ids_in_one_side_only_are_skipped() {
        let old = vec![rec(1, 0x1000), rec(2, 0x2000)];
        let new = vec![rec(1, 0x1100), rec(9, 0x9000)];

        let mapping = build_from_records(&old, &new).unwrap();
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.get(addr(0x1000)), Some(addr(0x1100)));
    }

    #[test]
    fn test_duplicate_new_id_keeps_first() {
        let old = vec![rec(1, 0x1000), rec(2, 0x2000)];
        let new = vec![rec(1, 0x1100), rec(1, 0x1200)];

        let mapping = build_from_records(&old, &new).unwrap();
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.get(addr(0x1000)), Some(addr(0x1100)));
    }

    #[test]
    fn test_length_mismatch_fails() {
        let old: Vec<_> = (1..=5).map(|i| rec(i, i * 0x1000)).collect();
        let new: Vec<_> = (1..=4).map(|i| rec(i, i * 0x1100)).collect();

        let err = build_from_records(&old, &new).unwrap_err();
        assert!(matches!(err, Error::LengthMismatch { old: 5, new: 4 }));
    }

    #[test]
    fn test_positions_skip_identical_pairs() {
        let old = vec![addr(0x1000), addr(0x2000), addr(0x3000)];
        let new = vec![addr(0x1000), addr(0x2500), addr(0x3500)];

        let mapping = build_from_positions(&old, &new).unwrap();
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.get(addr(0x2000)), Some(addr(0x2500)));
    }

    #[test]
    fn test_positions_first_pairing_wins() {
        let old = vec![addr(0x1000), addr(0x1000)];
        let new = vec![addr(0x1100), addr(0x1200)];

        let mapping = build_from_positions(&old, &new).unwrap();
        assert_eq!(mapping.get(addr(0x1000)), Some(addr(0x1100)));
    }

    #[test]
    fn test_positions_length_mismatch_fails() {
        let err = build_from_positions(&[addr(1)], &[]).unwrap_err();
        assert!(matches!(err, Error::LengthMismatch { old: 1, new: 0 }));
    }

    #[test]
    fn test_generate_from_directories() {
        let old_dir = tempfile::tempdir().unwrap();
        let new_dir = tempfile::tempdir().unwrap();
        let extensions = vec!["h".to_string(), "cpp".to_string()];

        fs::write(
            old_dir.path().join("a.h"),
            "auto f = 0x01000000;\nauto g = 0x02000000;\n",
        )
        .unwrap();
        fs::write(old_dir.path().join("b.cpp"), "call(0x03000000);\n").unwrap();
        fs::write(
            new_dir.path().join("a.h"),
            "auto f = 0x01000000;\nauto g = 0x02000010;\n",
        )
        .unwrap();
        fs::write(new_dir.path().join("b.cpp"), "call(0x03000030);\n").unwrap();

        let mapping =
            generate_from_directories(old_dir.path(), new_dir.path(), &extensions).unwrap();
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.get(addr(0x02000000)), Some(addr(0x02000010)));
        assert_eq!(mapping.get(addr(0x03000000)), Some(addr(0x03000030)));
    }

    #[test]
    fn test_generate_from_misaligned_directories_fails() {
        let old_dir = tempfile::tempdir().unwrap();
        let new_dir = tempfile::tempdir().unwrap();
        let extensions = vec!["h".to_string()];

        fs::write(old_dir.path().join("a.h"), "0x01000000 0x02000000\n").unwrap();
        fs::write(new_dir.path().join("a.h"), "0x01000000\n").unwrap();

        let err = generate_from_directories(old_dir.path(), new_dir.path(), &extensions)
            .unwrap_err();
        assert!(matches!(err, Error::LengthMismatch { old: 2, new: 1 }));
    }
}
