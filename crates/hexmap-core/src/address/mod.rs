//! Hex address values and literal scanning.
//!
//! Addresses are stored as plain `u64` values and rendered in one canonical
//! form (`0x` followed by upper-case digits, zero-padded to [`ADDRESS_WIDTH`]).
//! Parsing accepts any case and an optional `0x`/`0X` prefix, so keys written
//! by older tables or copied out of source files compare equal.

mod scan;

pub use scan::*;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Minimum number of digits used when rendering an address.
pub const ADDRESS_WIDTH: usize = 8;

/// A memory address parsed from a hex literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HexAddress(u64);

impl HexAddress {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }

    /// Parse a hex address string (with or without 0x prefix)
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        // from_str_radix would accept a leading sign
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::InvalidAddress(s.to_string()));
        }

        u64::from_str_radix(digits, 16)
            .map(Self)
            .map_err(|e| Error::InvalidAddress(format!("{}: {}", s, e)))
    }
}

impl fmt::Display for HexAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:0width$X}", self.0, width = ADDRESS_WIDTH)
    }
}

impl FromStr for HexAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<u64> for HexAddress {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl Serialize for HexAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HexAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        HexAddress::parse(&s).map_err(serde::de::Error::custom)
    }
}
