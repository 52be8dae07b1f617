//! Address library extracts.
//!
//! An extract is a text file with one record per line: the record ID is the
//! first whitespace-separated token and the address is the last one. Anything
//! in between (names, sizes) is ignored.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::address::HexAddress;
use crate::error::{Error, Result};

/// One line of an address library extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRecord {
    pub id: u64,
    pub address: HexAddress,
}

impl AddressRecord {
    pub fn new(id: u64, address: HexAddress) -> Self {
        Self { id, address }
    }
}

/// Parse a single extract line. Returns `Ok(None)` for blank and `#` lines.
pub fn parse_record(line: &str, line_number: usize) -> Result<Option<AddressRecord>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    if tokens.len() < 2 {
        return Err(Error::InvalidRecord {
            line: line_number,
            message: format!("expected '<id> ... <address>', got {:?}", trimmed),
        });
    }

    let id = tokens[0].parse::<u64>().map_err(|e| Error::InvalidRecord {
        line: line_number,
        message: format!("invalid id {:?}: {}", tokens[0], e),
    })?;

    let raw_address = tokens[tokens.len() - 1];
    let address = HexAddress::parse(raw_address).map_err(|_| Error::InvalidRecord {
        line: line_number,
        message: format!("invalid address {:?}", raw_address),
    })?;

    Ok(Some(AddressRecord { id, address }))
}

/// Parse the full text of an extract, preserving line order.
pub fn parse_library(text: &str) -> Result<Vec<AddressRecord>> {
    let mut records = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if let Some(record) = parse_record(line, idx + 1)? {
            records.push(record);
        }
    }
    Ok(records)
}

pub fn load_library<P: AsRef<Path>>(path: P) -> Result<Vec<AddressRecord>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let records = parse_library(&content)?;
    debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}
