//! Verify command implementation.

use std::path::{Path, PathBuf};

use anyhow::Result;
use hexmap_core::{ChecksumSet, VerifyReport, verify_directory};
use owo_colors::OwoColorize;

use crate::config::Config;

/// Run the verify command
pub fn run(config: &Config, path: &Path, checksums: Option<PathBuf>) -> Result<VerifyReport> {
    let list = checksums.unwrap_or_else(|| config.checksums.clone());
    let reference = ChecksumSet::load(&list)?;

    let report = verify_directory(path, &config.extensions, &reference)?;

    for check in &report.files {
        let status = if check.matched {
            "match".green().to_string()
        } else {
            "mismatch".red().to_string()
        };
        println!("{}  {}  {}", status, check.digest, check.path.display());
    }

    println!();
    println!(
        "{} of {} files match the reference checksums",
        report.matched(),
        report.files.len()
    );
    if !report.all_matched() {
        println!(
            "{}",
            format!("{} files differ from a successful patch", report.mismatched()).red()
        );
    }

    Ok(report)
}
