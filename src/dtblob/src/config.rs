//! Pipeline configuration.

use crate::output::OutputConfig;
use crate::scope::ScopeFilter;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Largest blob extracted unless configured otherwise (16 MiB)
pub const DEFAULT_MAX_BLOB_SIZE: u32 = 16 * 1024 * 1024;

/// Default converter timeout in seconds
pub const DEFAULT_CONVERTER_TIMEOUT_SECS: u64 = 5;

/// Placeholder replaced with the blob file path in converter arguments
pub const INPUT_PLACEHOLDER: &str = "{input}";

/// Placeholder replaced with the source output path in converter arguments
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// External converter command line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    pub program: String,
    /// Arguments, with `{input}` and `{output}` placeholders
    pub args: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            program: "dtc".to_string(),
            args: ["-I", "dtb", "-O", "dts", "-o", OUTPUT_PLACEHOLDER, INPUT_PLACEHOLDER]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            timeout_secs: DEFAULT_CONVERTER_TIMEOUT_SECS,
        }
    }
}

impl ConverterConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Variable holding the blob address
    pub pointer_name: String,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub scope: ScopeFilter,
    /// Base directory for per-run temporary workspaces
    #[serde(default = "std::env::temp_dir")]
    pub workspace_dir: PathBuf,
    #[serde(default)]
    pub converter: ConverterConfig,
    #[serde(default = "default_max_blob_size")]
    pub max_blob_size: u32,
}

fn default_max_blob_size() -> u32 {
    DEFAULT_MAX_BLOB_SIZE
}

impl PipelineConfig {
    pub fn new(pointer_name: impl Into<String>) -> Self {
        Self {
            pointer_name: pointer_name.into(),
            output: OutputConfig::default(),
            scope: ScopeFilter::default(),
            workspace_dir: std::env::temp_dir(),
            converter: ConverterConfig::default(),
            max_blob_size: DEFAULT_MAX_BLOB_SIZE,
        }
    }
}
