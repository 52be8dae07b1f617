//! Old→new address tables.
//!
//! The persisted form is a flat JSON object whose keys and values are hex
//! strings. Keys are normalized on load, so a table written by hand with
//! lower-case or unpadded keys still matches literals found in sources.

mod builder;

pub use builder::*;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::address::HexAddress;
use crate::error::Result;
use crate::storage::write_atomic;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressMapping {
    entries: BTreeMap<HexAddress, HexAddress>,
}

impl AddressMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, old: HexAddress) -> Option<HexAddress> {
        self.entries.get(&old).copied()
    }

    /// Insert an entry unless the key is already present.
    ///
    /// Returns the value already stored when the key was taken.
    pub fn insert_first(&mut self, old: HexAddress, new: HexAddress) -> Option<HexAddress> {
        match self.entries.get(&old) {
            Some(existing) => Some(*existing),
            None => {
                self.entries.insert(old, new);
                None
            }
        }
    }

    pub fn contains(&self, old: HexAddress) -> bool {
        self.entries.contains_key(&old)
    }

    pub fn iter(&self) -> impl Iterator<Item = (HexAddress, HexAddress)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let mapping: Self = serde_json::from_str(&content)?;
        info!(
            "Loaded {} address mappings from {}",
            mapping.len(),
            path.as_ref().display()
        );
        Ok(mapping)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        write_atomic(path.as_ref(), content.as_bytes())?;
        info!(
            "Saved {} address mappings to {}",
            self.len(),
            path.as_ref().display()
        );
        Ok(())
    }
}

impl FromIterator<(HexAddress, HexAddress)> for AddressMapping {
    fn from_iter<I: IntoIterator<Item = (HexAddress, HexAddress)>>(iter: I) -> Self {
        let mut mapping = Self::new();
        for (old, new) in iter {
            mapping.insert_first(old, new);
        }
        mapping
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(value: u64) -> HexAddress {
        HexAddress::new(value)
    }

    #[test]
    fn test_insert_first_keeps_existing_value() {
        let mut mapping = AddressMapping::new();
        assert_eq!(mapping.insert_first(addr(1), addr(2)), None);
        assert_eq!(mapping.insert_first(addr(1), addr(3)), Some(addr(2)));
        assert_eq!(mapping.get(addr(1)), Some(addr(2)));
        assert_eq!(mapping.len(), 1);
    }

    #[test]
    fn test_save_writes_flat_hex_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.json");

        let mapping: AddressMapping = [(addr(0x1A2B3C4), addr(0x5A6B7C8))].into_iter().collect();
        mapping.save(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["0x01A2B3C4"], "0x05A6B7C8");
    }

    #[test]
    fn test_load_normalizes_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.json");
        fs::write(&path, r#"{"0x1a2b3c4": "0X05A6B7C8", "12345678": "0x9ABCDEF0"}"#).unwrap();

        let mapping = AddressMapping::load(&path).unwrap();
        assert_eq!(mapping.get(addr(0x1A2B3C4)), Some(addr(0x5A6B7C8)));
        assert_eq!(mapping.get(addr(0x12345678)), Some(addr(0x9ABCDEF0)));
    }

    #[test]
    fn test_load_rejects_malformed_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.json");
        fs::write(&path, r#"{"not-hex": "0x1"}"#).unwrap();

        assert!(AddressMapping::load(&path).is_err());
    }
}
