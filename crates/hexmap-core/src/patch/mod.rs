//! Fixed source patches for a pinned loader build.
//!
//! Each [`PatchRule`] is a list of textual edits located by anchor text near a
//! line hint instead of an exact line index, so small upstream changes do not
//! break them. Every edit detects whether it was already applied, which makes
//! patching a tree twice a no-op.

mod rule;

pub use rule::*;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::storage::replace_file;

/// Sub-directories of the loader repository that carry patched files.
pub const PATCH_DIRS: &[&str] = &["sfse", "sfse_loader"];

/// Name the repository folder must have when no root is given.
pub const REPO_DIR_NAME: &str = "sfse";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditStatus {
    Applied,
    AlreadyApplied,
    NotFound,
}

/// Result of applying one rule to a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleApplication {
    pub text: String,
    pub edits: Vec<EditStatus>,
}

impl RuleApplication {
    pub fn changed(&self) -> bool {
        self.edits.contains(&EditStatus::Applied)
    }

    pub fn already_patched(&self) -> bool {
        !self.edits.is_empty() && self.edits.iter().all(|s| *s == EditStatus::AlreadyApplied)
    }
}

fn is_commented(line: &str) -> bool {
    line.trim_start().starts_with(COMMENT_MARKER)
}

fn locate(lines: &[String], locator: &Locator, shift: isize, skip_commented: bool) -> Option<usize> {
    locator
        .candidates(lines.len(), shift)
        .into_iter()
        .find(|&idx| {
            lines[idx].contains(&locator.anchor) && !(skip_commented && is_commented(&lines[idx]))
        })
}

/// Line text without its terminator, and the terminator itself.
fn split_ending(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

fn apply_edit(lines: &mut Vec<String>, edit: &Edit, shift: &mut isize) -> EditStatus {
    match &edit.kind {
        EditKind::CommentOut { lines: count } => {
            let Some(start) = locate(lines, &edit.locate, *shift, false) else {
                return EditStatus::NotFound;
            };
            if is_commented(&lines[start]) {
                return EditStatus::AlreadyApplied;
            }
            let end = (start + count).min(lines.len());
            for line in &mut lines[start..end] {
                if !is_commented(line) {
                    line.insert_str(0, COMMENT_MARKER);
                }
            }
            EditStatus::Applied
        }
        EditKind::ReplaceToken { from, to } => match locate(lines, &edit.locate, *shift, true) {
            Some(idx) => {
                lines[idx] = lines[idx].replacen(from.as_str(), to, 1);
                EditStatus::Applied
            }
            None => {
                let done = Locator {
                    anchor: to.clone(),
                    ..edit.locate.clone()
                };
                if locate(lines, &done, *shift, true).is_some() {
                    EditStatus::AlreadyApplied
                } else {
                    EditStatus::NotFound
                }
            }
        },
        EditKind::DuplicateReplace { from, to } => {
            let Some(idx) = locate(lines, &edit.locate, *shift, true) else {
                return EditStatus::NotFound;
            };
            let copy = lines[idx].replace(from.as_str(), to);
            if let Some(next) = lines.get(idx + 1) {
                if split_ending(next).0 == split_ending(&copy).0 {
                    // the copy is in the file either way, later hints must see it
                    *shift += 1;
                    return EditStatus::AlreadyApplied;
                }
            }

            // the located line may be the last one and lack a terminator
            if split_ending(&lines[idx]).1.is_empty() {
                lines[idx].push('\n');
            }
            lines.insert(idx + 1, copy);
            *shift += 1;
            EditStatus::Applied
        }
    }
}

/// Apply a rule's edits in order to `text`.
pub fn apply_rule(text: &str, rule: &PatchRule) -> RuleApplication {
    let mut lines: Vec<String> = text.split_inclusive('\n').map(str::to_string).collect();
    let mut shift = 0isize;
    let edits = rule
        .edits
        .iter()
        .map(|edit| apply_edit(&mut lines, edit, &mut shift))
        .collect();

    RuleApplication {
        text: lines.concat(),
        edits,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PatchOptions {
    pub backup: bool,
    pub silent: bool,
}

/// What happened to one patched file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePatch {
    pub path: PathBuf,
    pub edits: Vec<EditStatus>,
    pub written: bool,
    pub backup: Option<PathBuf>,
}

impl FilePatch {
    pub fn already_patched(&self) -> bool {
        !self.written && self.edits.iter().all(|s| *s == EditStatus::AlreadyApplied)
    }

    pub fn not_found(&self) -> usize {
        self.edits
            .iter()
            .filter(|s| **s == EditStatus::NotFound)
            .count()
    }
}

pub fn patch_file(path: &Path, rule: &PatchRule, options: &PatchOptions) -> Result<FilePatch> {
    let content = fs::read_to_string(path)?;
    let application = apply_rule(&content, rule);

    for (idx, status) in application.edits.iter().enumerate() {
        if *status == EditStatus::NotFound {
            warn!(
                "{}: edit {} (anchor {:?}) not found",
                path.display(),
                idx + 1,
                rule.edits[idx].locate.anchor
            );
        }
    }

    let mut result = FilePatch {
        path: path.to_path_buf(),
        edits: application.edits.clone(),
        written: false,
        backup: None,
    };

    if !application.changed() {
        if application.already_patched() && !options.silent {
            warn!("{} already patched", path.display());
        } else {
            debug!("{}: nothing to patch", path.display());
        }
        return Ok(result);
    }

    result.backup = replace_file(path, application.text.as_bytes(), options.backup)?;
    result.written = true;
    info!("Patched {}", path.display());
    Ok(result)
}

/// Pick the repository root: the explicit path, or `cwd` if it is the
/// repository folder itself.
pub fn resolve_patch_root(path: Option<&Path>, cwd: &Path) -> Result<PathBuf> {
    match path {
        Some(p) => Ok(p.to_path_buf()),
        None if cwd.file_name().is_some_and(|n| n == REPO_DIR_NAME) => Ok(cwd.to_path_buf()),
        None => Err(Error::PatchRootNotFound(cwd.to_path_buf())),
    }
}

/// Apply `rules` to every matching file under the patch directories of
/// `root`. Missing files are skipped.
pub fn patch_tree(root: &Path, rules: &[PatchRule], options: &PatchOptions) -> Result<Vec<FilePatch>> {
    let mut results = Vec::new();
    for dir in PATCH_DIRS {
        for rule in rules {
            let path = root.join(dir).join(&rule.file);
            if !path.is_file() {
                debug!("{} not present, skipping", path.display());
                continue;
            }
            results.push(patch_file(&path, rule, options)?);
        }
    }

    info!(
        "Patched {} files ({} already patched)",
        results.iter().filter(|r| r.written).count(),
        results.iter().filter(|r| r.already_patched()).count()
    );
    Ok(results)
}
