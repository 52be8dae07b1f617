//! Line rewriter.
//!
//! Replaces address literals in source files using an [`AddressMapping`].
//! Files are only touched when at least one literal was replaced, and files
//! whose digest is listed as already patched are skipped entirely, so running
//! the same table twice never maps an address a second time.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::address::find_hex_literals;
use crate::error::{Error, Result};
use crate::mapping::AddressMapping;
use crate::source::list_source_files;
use crate::storage::{ChecksumSet, digest_bytes, replace_file};

/// A literal with no entry in the mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmappedLiteral {
    /// 1-based line number
    pub line: usize,
    pub literal: String,
}

/// Result of rewriting a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRewrite {
    pub text: String,
    pub replacements: usize,
    pub unmapped: Vec<String>,
}

/// Replace every mapped literal in `line`. Everything else is copied as is.
pub fn rewrite_line(line: &str, mapping: &AddressMapping) -> LineRewrite {
    let mut text = String::with_capacity(line.len());
    let mut replacements = 0;
    let mut unmapped = Vec::new();
    let mut cursor = 0;

    for literal in find_hex_literals(line) {
        match mapping.get(literal.address) {
            Some(new_address) => {
                text.push_str(&line[cursor..literal.start]);
                text.push_str(&literal.render(new_address));
                cursor = literal.end;
                replacements += 1;
            }
            None => unmapped.push(literal.text(line).to_string()),
        }
    }
    text.push_str(&line[cursor..]);

    LineRewrite {
        text,
        replacements,
        unmapped,
    }
}

/// Result of rewriting a whole text buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRewrite {
    pub text: String,
    pub replacements: usize,
    pub unmapped: Vec<UnmappedLiteral>,
}

/// Rewrite a buffer line by line, keeping its line endings.
pub fn rewrite_text(text: &str, mapping: &AddressMapping) -> TextRewrite {
    let mut output = String::with_capacity(text.len());
    let mut replacements = 0;
    let mut unmapped = Vec::new();

    for (idx, line) in text.split_inclusive('\n').enumerate() {
        let rewritten = rewrite_line(line, mapping);
        output.push_str(&rewritten.text);
        replacements += rewritten.replacements;
        unmapped.extend(rewritten.unmapped.into_iter().map(|literal| UnmappedLiteral {
            line: idx + 1,
            literal,
        }));
    }

    TextRewrite {
        text: output,
        replacements,
        unmapped,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RewriteOptions<'a> {
    /// Keep `<name>.bak` next to each rewritten file
    pub backup: bool,
    /// Report unmapped literals at debug level instead of warning
    pub silent: bool,
    /// Digests of files that must not be rewritten again
    pub known_patched: Option<&'a ChecksumSet>,
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteOutcome {
    Rewritten {
        replacements: usize,
        unmapped: Vec<UnmappedLiteral>,
        backup: Option<PathBuf>,
    },
    /// Nothing was mapped; the file was not written
    Unchanged { unmapped: Vec<UnmappedLiteral> },
    /// Digest matched the known-patched list; the file was not read further
    AlreadyPatched,
}

impl RewriteOutcome {
    pub fn replacements(&self) -> usize {
        match self {
            RewriteOutcome::Rewritten { replacements, .. } => *replacements,
            _ => 0,
        }
    }

    pub fn unmapped(&self) -> &[UnmappedLiteral] {
        match self {
            RewriteOutcome::Rewritten { unmapped, .. } | RewriteOutcome::Unchanged { unmapped } => {
                unmapped
            }
            RewriteOutcome::AlreadyPatched => &[],
        }
    }
}

fn report_unmapped(path: &Path, unmapped: &[UnmappedLiteral], silent: bool) {
    for entry in unmapped {
        if silent {
            debug!(
                "No replacement for {} at {}:{}",
                entry.literal,
                path.display(),
                entry.line
            );
        } else {
            warn!(
                "No replacement found for {} at {}:{}, leaving it in place. Check the hex table matches this version",
                entry.literal,
                path.display(),
                entry.line
            );
        }
    }
}

/// Apply `mapping` to one file.
pub fn rewrite_file(
    path: &Path,
    mapping: &AddressMapping,
    options: &RewriteOptions<'_>,
) -> Result<RewriteOutcome> {
    let content = fs::read_to_string(path)?;

    if let Some(known) = options.known_patched {
        if known.contains(&digest_bytes(content.as_bytes())) {
            info!("{} already patched, skipping", path.display());
            return Ok(RewriteOutcome::AlreadyPatched);
        }
    }

    let result = rewrite_text(&content, mapping);
    report_unmapped(path, &result.unmapped, options.silent);

    if result.replacements == 0 {
        debug!("{}: no mapped addresses", path.display());
        return Ok(RewriteOutcome::Unchanged {
            unmapped: result.unmapped,
        });
    }

    let backup = replace_file(path, result.text.as_bytes(), options.backup)?;
    info!(
        "Updated {} ({} replacements)",
        path.display(),
        result.replacements
    );

    Ok(RewriteOutcome::Rewritten {
        replacements: result.replacements,
        unmapped: result.unmapped,
        backup,
    })
}

/// Per-file outcomes of an update run.
#[derive(Debug, Clone, Default)]
pub struct UpdateSummary {
    pub files: Vec<(PathBuf, RewriteOutcome)>,
}

impl UpdateSummary {
    pub fn rewritten(&self) -> usize {
        self.files
            .iter()
            .filter(|(_, o)| matches!(o, RewriteOutcome::Rewritten { .. }))
            .count()
    }

    pub fn already_patched(&self) -> usize {
        self.files
            .iter()
            .filter(|(_, o)| matches!(o, RewriteOutcome::AlreadyPatched))
            .count()
    }

    pub fn replacements(&self) -> usize {
        self.files.iter().map(|(_, o)| o.replacements()).sum()
    }

    pub fn unmapped(&self) -> usize {
        self.files.iter().map(|(_, o)| o.unmapped().len()).sum()
    }
}

/// Apply `mapping` to every source file in `dir`.
pub fn update_directory(
    dir: &Path,
    extensions: &[String],
    mapping: &AddressMapping,
    options: &RewriteOptions<'_>,
) -> Result<UpdateSummary> {
    let files = list_source_files(dir, extensions)?;
    if files.is_empty() {
        return Err(Error::NoSourceFiles(dir.to_path_buf()));
    }

    let mut summary = UpdateSummary::default();
    for path in files {
        let outcome = rewrite_file(&path, mapping, options)?;
        summary.files.push((path, outcome));
    }

    info!(
        "Updated {} of {} files ({} replacements, {} unmapped, {} already patched)",
        summary.rewritten(),
        summary.files.len(),
        summary.replacements(),
        summary.unmapped(),
        summary.already_patched()
    );
    Ok(summary)
}
