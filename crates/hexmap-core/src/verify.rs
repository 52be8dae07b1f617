//! Checksum verification of patched files.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::source::list_source_files;
use crate::storage::{ChecksumSet, digest_file};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCheck {
    pub path: PathBuf,
    pub digest: String,
    pub matched: bool,
}

#[derive(Debug, Clone, Default)]
pub struct VerifyReport {
    pub files: Vec<FileCheck>,
}

impl VerifyReport {
    pub fn matched(&self) -> usize {
        self.files.iter().filter(|f| f.matched).count()
    }

    pub fn mismatched(&self) -> usize {
        self.files.len() - self.matched()
    }

    pub fn all_matched(&self) -> bool {
        self.mismatched() == 0
    }

    pub fn mismatches(&self) -> impl Iterator<Item = &FileCheck> {
        self.files.iter().filter(|f| !f.matched)
    }
}

/// Compare the digest of each file against the reference list.
pub fn verify_files<P: AsRef<Path>>(paths: &[P], checksums: &ChecksumSet) -> Result<VerifyReport> {
    let mut report = VerifyReport::default();
    for path in paths {
        let path = path.as_ref();
        let digest = digest_file(path)?;
        let matched = checksums.contains(&digest);
        debug!("{}: {} ({})", path.display(), digest, matched);
        report.files.push(FileCheck {
            path: path.to_path_buf(),
            digest,
            matched,
        });
    }

    info!(
        "{} of {} files match the reference checksums",
        report.matched(),
        report.files.len()
    );
    Ok(report)
}

pub fn verify_directory(
    dir: &Path,
    extensions: &[String],
    checksums: &ChecksumSet,
) -> Result<VerifyReport> {
    let files = list_source_files(dir, extensions)?;
    if files.is_empty() {
        return Err(Error::NoSourceFiles(dir.to_path_buf()));
    }
    verify_files(&files, checksums)
}
