//! Optional `hexmap.toml` settings.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hexmap_core::default_extensions;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "hexmap.toml";
const DEFAULT_CHECKSUM_FILE: &str = "checksums.txt";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Extensions of the files scanned for address literals
    pub extensions: Vec<String>,
    /// Keep `<name>.bak` next to every modified file
    pub backup: bool,
    /// Reference list of digests for correctly patched files
    pub checksums: PathBuf,
    /// Patch rules replacing the builtin set
    pub rules: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            backup: true,
            checksums: PathBuf::from(DEFAULT_CHECKSUM_FILE),
            rules: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
