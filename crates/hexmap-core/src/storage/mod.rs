//! File persistence helpers.
//!
//! - **Atomic writes**: content goes to a temp file in the target directory
//!   and is renamed over the destination, so readers never see a partial file
//! - **Checksums**: SHA-256 digests of file contents and the reference lists
//!   of known-good digests

mod atomic;
mod checksum;

pub use atomic::*;
pub use checksum::*;
