//! Extract command CLI definitions

use anyhow::{Context, Result};
use clap::{ArgAction, Args};
use std::path::PathBuf;

#[derive(Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct ExtractArgs {
    /// Pointer variable referencing the device tree blob
    #[arg(short, long)]
    pub pointer: String,

    /// File to write the device tree source to; "_" writes no file
    /// [default: ./parsedDeviceTree.dts]
    #[arg(short, long)]
    pub output_file: Option<PathBuf>,

    /// Print the device tree source to the console
    #[arg(short = 't', long, action = ArgAction::Set, num_args = 0..=1,
          default_value_t = false, default_missing_value = "true")]
    pub print_dts: bool,

    /// Only consider variables currently in scope
    #[arg(short = 'i', long, action = ArgAction::Set, num_args = 0..=1,
          default_value_t = true, default_missing_value = "true")]
    pub in_scope: bool,

    /// Include function arguments
    #[arg(short, long, action = ArgAction::Set, num_args = 0..=1,
          default_value_t = true, default_missing_value = "true")]
    pub arguments: bool,

    /// Include local variables
    #[arg(short, long, action = ArgAction::Set, num_args = 0..=1,
          default_value_t = true, default_missing_value = "true")]
    pub locals: bool,

    /// Include static variables
    #[arg(short, long, action = ArgAction::Set, num_args = 0..=1,
          default_value_t = true, default_missing_value = "true")]
    pub statics: bool,

    /// PID of the process to read from
    #[arg(long, conflicts_with = "image", required_unless_present = "image")]
    pub pid: Option<u32>,

    /// Raw memory image to read from instead of a live process
    #[arg(long, requires = "base")]
    pub image: Option<PathBuf>,

    /// Virtual address of the first byte of --image (hex with 0x prefix, or decimal)
    #[arg(long, value_parser = parse_address)]
    pub base: Option<u64>,

    /// Frame variable as name=kind:type:value (e.g. "dtb=local:const void *:0x40000000")
    #[arg(long = "var", value_name = "SPEC")]
    pub vars: Vec<String>,

    /// TOML or JSON file listing frame variables
    #[arg(long)]
    pub scope_file: Option<PathBuf>,

    /// Converter program (default: dtc)
    #[arg(long)]
    pub converter: Option<String>,

    /// Converter timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Base directory for temporary workspaces
    #[arg(long)]
    pub workspace_dir: Option<PathBuf>,

    /// Largest blob size accepted, in bytes
    #[arg(long)]
    pub max_size: Option<u32>,
}

/// Parse an address from a hex (0x-prefixed) or decimal string
pub fn parse_address(address: &str) -> Result<u64> {
    let address = address.trim();
    if let Some(hex) = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
    {
        u64::from_str_radix(hex, 16).context("Invalid hex address")
    } else {
        address.parse::<u64>().context("Invalid address")
    }
}
