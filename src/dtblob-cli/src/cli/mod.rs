//! CLI argument definitions for dt-blob-to-source
//!
//! This module contains all clap-derived structs and enums for CLI parsing.

mod core;
mod extract;

pub use core::{Cli, Commands};
pub use extract::{parse_address, ExtractArgs};
