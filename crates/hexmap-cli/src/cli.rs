//! Command-line definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_FILE;

#[derive(Parser)]
#[command(name = "hexmap")]
#[command(version)]
#[command(about = "Port address literals in generated sources between builds")]
pub struct Cli {
    /// Settings file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Only report warnings and errors
    #[arg(short, long, global = true)]
    pub silent: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build a hex table by pairing literals of two source trees in order
    Generate {
        /// Sources built against the old addresses (reference)
        #[arg(short = 'p', long)]
        path: PathBuf,

        /// Same sources built against the new addresses
        #[arg(short = 'n', long)]
        path2: PathBuf,

        /// Game version, used in the default output name
        #[arg(short = 'g', long, default_value = "")]
        game_version: String,

        /// Commit of the source tree, used in the default output name
        #[arg(short = 'c', long, default_value = "")]
        commit: String,

        /// Output file (default: hex_table_<game-version>_<commit>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build a hex table from two address library extracts paired by ID
    Diff {
        /// Extract for the old build
        #[arg(long)]
        old: PathBuf,

        /// Extract for the new build
        #[arg(long)]
        new: PathBuf,

        #[arg(short, long, default_value = "diff.json")]
        output: PathBuf,
    },

    /// Rewrite address literals in a folder using a hex table
    Update {
        /// Folder of files to update
        #[arg(short = 'p', long)]
        path: PathBuf,

        /// Hex table to apply
        #[arg(short = 'd', long)]
        dictfile: PathBuf,

        /// Do not keep .bak copies of modified files
        #[arg(long)]
        no_backup: bool,

        /// Digests of already patched files; matching files are skipped
        #[arg(long)]
        checksums: Option<PathBuf>,
    },

    /// Apply the fixed loader patches
    Patch {
        /// Repository root (default: current folder, which must be named sfse)
        #[arg(short = 'p', long)]
        path: Option<PathBuf>,

        /// JSON rule file replacing the builtin rules
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Do not keep .bak copies of modified files
        #[arg(long)]
        no_backup: bool,
    },

    /// Compare file digests against the reference checksum list
    #[command(alias = "md5")]
    Verify {
        /// Folder of files to check
        #[arg(short = 'p', long)]
        path: PathBuf,

        /// Reference checksum list
        #[arg(long)]
        checksums: Option<PathBuf>,
    },

    /// Write the checksum list for a folder of correctly patched files
    Checksum {
        /// Folder of patched files
        #[arg(short = 'p', long)]
        path: PathBuf,

        /// Output file (default: the configured checksum list)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
