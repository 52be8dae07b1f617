//! Checksum command implementation.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use hexmap_core::{list_source_files, record_checksums};

use crate::config::Config;

/// Run the checksum command
pub fn run(config: &Config, path: &Path, output: Option<PathBuf>) -> Result<()> {
    let files = list_source_files(path, &config.extensions)?;
    if files.is_empty() {
        bail!("No source files found in {}", path.display());
    }

    let set = record_checksums(&files)?;
    let output = output.unwrap_or_else(|| config.checksums.clone());
    set.save(&output)?;
    println!(
        "Wrote {} checksums for {} files to {}",
        set.len(),
        files.len(),
        output.display()
    );

    Ok(())
}
