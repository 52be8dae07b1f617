//! Source file discovery and literal scraping.

use std::fs;
use std::path::{Path, PathBuf};

use crate::address::{HexAddress, find_hex_literals};
use crate::error::Result;

/// Extensions of generated sources that carry address literals.
pub const DEFAULT_EXTENSIONS: &[&str] = &["cpp", "inl", "h"];

pub fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
}

/// List regular files directly inside `dir` with one of `extensions`,
/// sorted by file name.
pub fn list_source_files(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_file() && has_extension(&path, extensions) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Every address literal in `text`, in reading order.
pub fn scrape_text(text: &str) -> Vec<HexAddress> {
    text.lines()
        .flat_map(|line| find_hex_literals(line).into_iter().map(|lit| lit.address))
        .collect()
}

pub fn scrape_file(path: &Path) -> Result<Vec<HexAddress>> {
    let content = fs::read_to_string(path)?;
    Ok(scrape_text(&content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_source_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.cpp", "a.h", "c.inl", "notes.txt", "d.H"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::create_dir(dir.path().join("nested.h")).unwrap();

        let files = list_source_files(dir.path(), &default_extensions()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.h", "b.cpp", "c.inl", "d.H"]);
    }

    #[test]
    fn test_scrape_text_in_order() {
        let text = "a(0x02000000, 0x01000000);\nb = 0x10;\nc(0x03000000);";
        let found = scrape_text(text);
        assert_eq!(
            found,
            vec![
                HexAddress::new(0x02000000),
                HexAddress::new(0x01000000),
                HexAddress::new(0x03000000),
            ]
        );
    }

    #[test]
    fn test_list_source_files_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_source_files(&dir.path().join("nope"), &default_extensions()).unwrap_err();
        assert!(err.is_not_found());
    }
}
