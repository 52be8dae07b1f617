//! CLI command implementations.
//!
//! This module contains the implementation of each CLI command.

pub mod checksum;
pub mod diff;
pub mod generate;
pub mod patch;
pub mod update;
pub mod verify;
