//! # hexmap-core
//!
//! Core library for porting address literals in generated sources between
//! two builds of the same binary.
//!
//! This crate provides:
//! - Hex address parsing and literal scanning
//! - Address library parsing and old→new mapping tables
//! - Idempotent rewriting of source files with atomic file swaps
//! - Declarative fixed patches for a pinned loader build
//! - Checksum bookkeeping and verification of patched files

pub mod address;
pub mod error;
pub mod library;
pub mod mapping;
pub mod patch;
pub mod rewrite;
pub mod source;
pub mod storage;
pub mod verify;

pub use address::{ADDRESS_WIDTH, HexAddress, HexLiteral, MIN_HEX_DIGITS, find_hex_literals};
pub use error::{Error, Result};
pub use library::{AddressRecord, load_library, parse_library, parse_record};
pub use mapping::{
    AddressMapping, build_from_positions, build_from_records, generate_from_directories,
};
pub use patch::{
    Edit, EditKind, EditStatus, FilePatch, Locator, PatchOptions, PatchRule, RuleApplication,
    apply_rule, builtin_rules, load_rules, patch_file, patch_tree, resolve_patch_root, save_rules,
};
pub use rewrite::{
    LineRewrite, RewriteOptions, RewriteOutcome, TextRewrite, UnmappedLiteral, UpdateSummary,
    rewrite_file, rewrite_line, rewrite_text, update_directory,
};
pub use source::{
    DEFAULT_EXTENSIONS, default_extensions, list_source_files, scrape_file, scrape_text,
};
pub use storage::{
    ChecksumSet, backup_path, digest_bytes, digest_file, record_checksums, replace_file,
    write_atomic,
};
pub use verify::{FileCheck, VerifyReport, verify_directory, verify_files};
