use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::storage::write_atomic;

pub const PLUGIN_MANAGER_FILE: &str = "PluginManager.cpp";
pub const IDENTIFY_EXE_FILE: &str = "IdentifyEXE.cpp";
pub const MAIN_FILE: &str = "main.cpp";

const STEAM_TOKEN: &str = "Steam";
const WIN_STORE_TOKEN: &str = "WinStore";
const VERSION_FORMAT_OLD: &str = "-%d-%d-%d-%d%s";
const VERSION_FORMAT_NEW: &str = "-%d-%d-%d-%d-%d";
const BUILD_TYPE_TOKEN: &str = "buildType";
const BUILD_TYPE_VALUE: &str = "1";

pub const COMMENT_MARKER: &str = "//";

const DEFAULT_WINDOW: usize = 10;

fn default_window() -> usize {
    DEFAULT_WINDOW
}

/// Finds the first line containing `anchor` within `window` lines of the
/// 1-based `near_line` hint, searching outward from the hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    pub anchor: String,
    pub near_line: usize,
    #[serde(default = "default_window")]
    pub window: usize,
}

impl Locator {
    pub fn new(anchor: &str, near_line: usize) -> Self {
        Self {
            anchor: anchor.to_string(),
            near_line,
            window: DEFAULT_WINDOW,
        }
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Candidate line indices ordered by distance from the hint.
    pub(crate) fn candidates(&self, line_count: usize, shift: isize) -> Vec<usize> {
        let hint = (self.near_line as isize - 1 + shift).max(0) as usize;
        let mut out = Vec::new();
        for distance in 0..=self.window {
            if let Some(idx) = hint.checked_add(distance) {
                if idx < line_count {
                    out.push(idx);
                }
            }
            if distance > 0 {
                if let Some(idx) = hint.checked_sub(distance) {
                    if idx < line_count {
                        out.push(idx);
                    }
                }
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EditKind {
    /// Prefix `lines` consecutive lines with `//`, starting at the located line
    CommentOut { lines: usize },
    /// Replace `from` with `to` in the located line
    ReplaceToken { from: String, to: String },
    /// Insert a copy of the located line with `from` replaced by `to` after it
    DuplicateReplace { from: String, to: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    pub locate: Locator,
    #[serde(flatten)]
    pub kind: EditKind,
}

impl Edit {
    pub fn comment_out(locate: Locator, lines: usize) -> Self {
        Self {
            locate,
            kind: EditKind::CommentOut { lines },
        }
    }

    pub fn replace_token(near_line: usize, from: &str, to: &str) -> Self {
        Self {
            locate: Locator::new(from, near_line),
            kind: EditKind::ReplaceToken {
                from: from.to_string(),
                to: to.to_string(),
            },
        }
    }

    pub fn duplicate_replace(near_line: usize, from: &str, to: &str) -> Self {
        Self {
            locate: Locator::new(from, near_line),
            kind: EditKind::DuplicateReplace {
                from: from.to_string(),
                to: to.to_string(),
            },
        }
    }

    pub fn within(mut self, window: usize) -> Self {
        self.locate.window = window;
        self
    }
}

/// Ordered edits for one file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchRule {
    pub file: String,
    pub edits: Vec<Edit>,
}

impl PatchRule {
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| Error::InvalidRule {
            file: self.file.clone(),
            message: message.to_string(),
        };

        if self.file.is_empty() {
            return Err(invalid("file name is empty"));
        }
        for edit in &self.edits {
            if edit.locate.anchor.is_empty() {
                return Err(invalid("locator anchor is empty"));
            }
            if edit.locate.near_line == 0 {
                return Err(invalid("near_line is 1-based"));
            }
            match &edit.kind {
                EditKind::CommentOut { lines: 0 } => {
                    return Err(invalid("comment_out needs at least one line"));
                }
                EditKind::ReplaceToken { from, .. } | EditKind::DuplicateReplace { from, .. }
                    if from.is_empty() =>
                {
                    return Err(invalid("replacement source token is empty"));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Edits that disable the runtime version check of the loader and accept the
/// Windows Store executable.
pub fn builtin_rules() -> Vec<PatchRule> {
    vec![
        PatchRule {
            file: PLUGIN_MANAGER_FILE.to_string(),
            edits: vec![
                Edit::comment_out(Locator::new(BUILD_TYPE_TOKEN, 399).with_window(3), 1),
                // other live buildType uses sit a few lines above the call
                Edit::replace_token(402, VERSION_FORMAT_OLD, VERSION_FORMAT_NEW).within(2),
                Edit::replace_token(406, BUILD_TYPE_TOKEN, BUILD_TYPE_VALUE).within(2),
            ],
        },
        PatchRule {
            file: IDENTIFY_EXE_FILE.to_string(),
            edits: vec![
                Edit::comment_out(Locator::new("kProcType_WinStore", 321), 5),
                Edit::duplicate_replace(362, STEAM_TOKEN, WIN_STORE_TOKEN),
                Edit::comment_out(Locator::new("_ERROR", 375), 6),
            ],
        },
        PatchRule {
            file: MAIN_FILE.to_string(),
            edits: vec![Edit::duplicate_replace(307, STEAM_TOKEN, WIN_STORE_TOKEN)],
        },
    ]
}

pub fn load_rules<P: AsRef<Path>>(path: P) -> Result<Vec<PatchRule>> {
    let content = fs::read_to_string(&path)?;
    let rules: Vec<PatchRule> = serde_json::from_str(&content)?;
    for rule in &rules {
        rule.validate()?;
    }
    Ok(rules)
}

pub fn save_rules<P: AsRef<Path>>(path: P, rules: &[PatchRule]) -> Result<()> {
    let content = serde_json::to_string_pretty(rules)?;
    write_atomic(path.as_ref(), content.as_bytes())
}
