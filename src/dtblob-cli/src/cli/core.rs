//! Core CLI definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::extract::ExtractArgs;

#[derive(Parser)]
#[command(name = "dt-blob-to-source")]
#[command(about = "Dump a device tree blob from a debugged process as device tree source", long_about = None)]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract the blob behind a pointer variable and convert it to source
    #[command(visible_alias = "x")]
    Extract(ExtractArgs),

    /// Configure default settings
    #[command(visible_alias = "c")]
    Configure {
        /// Set default converter program
        #[arg(long)]
        converter: Option<String>,

        /// Set default converter timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Set default base directory for temporary workspaces
        #[arg(long)]
        workspace_dir: Option<PathBuf>,

        /// Set default output file ("_" for none)
        #[arg(long)]
        output_file: Option<PathBuf>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}
