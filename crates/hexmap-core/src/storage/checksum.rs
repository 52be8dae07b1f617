use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::debug;

use super::write_atomic;
use crate::error::{Error, Result};

/// Lower-case hex SHA-256 of `content`.
pub fn digest_bytes(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

pub fn digest_file(path: &Path) -> Result<String> {
    let content = fs::read(path)?;
    Ok(digest_bytes(&content))
}

/// Reference list of digests for files known to be correctly patched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumSet {
    digests: BTreeSet<String>,
}

impl ChecksumSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a newline-delimited digest list. Blank lines and `#` comments
    /// are ignored; digests are compared case-insensitively.
    pub fn parse(text: &str) -> Self {
        let digests = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| line.to_ascii_lowercase())
            .collect();
        Self { digests }
    }

    /// Load a reference list. A missing file is reported as
    /// [`Error::MissingReference`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::MissingReference(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;
        let set = Self::parse(&content);
        debug!("Loaded {} checksums from {}", set.len(), path.display());
        Ok(set)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut content = String::new();
        for digest in &self.digests {
            content.push_str(digest);
            content.push('\n');
        }
        write_atomic(path.as_ref(), content.as_bytes())
    }

    pub fn contains(&self, digest: &str) -> bool {
        self.digests.contains(&digest.to_ascii_lowercase())
    }

    pub fn insert(&mut self, digest: String) -> bool {
        self.digests.insert(digest.to_ascii_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.digests.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }
}

/// Digest every file in `paths` into a new reference list.
pub fn record_checksums<P: AsRef<Path>>(paths: &[P]) -> Result<ChecksumSet> {
    let mut set = ChecksumSet::new();
    for path in paths {
        set.insert(digest_file(path.as_ref())?);
    }
    Ok(set)
}
