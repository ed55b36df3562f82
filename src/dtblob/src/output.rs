//! Delivery of converted source text.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Output path used when none is given
pub const DEFAULT_OUTPUT_FILE: &str = "./parsedDeviceTree.dts";

/// Output path value meaning "do not write a file"
pub const DISCARD_SENTINEL: &str = "_";

/// Receives text destined for the invoking session
pub trait OutputSink {
    /// Converted source text
    fn print(&mut self, text: &str);

    /// Non-fatal converter messages
    fn diagnostic(&mut self, text: &str);
}

/// Collects everything in memory
#[derive(Debug, Clone, Default)]
pub struct BufferSink {
    pub printed: Vec<String>,
    pub diagnostics: Vec<String>,
}

impl OutputSink for BufferSink {
    fn print(&mut self, text: &str) {
        self.printed.push(text.to_string());
    }

    fn diagnostic(&mut self, text: &str) {
        self.diagnostics.push(text.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    StandardOutput,
    File(PathBuf),
    Discard,
}

/// Console and file output are independent switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// `None` disables file output
    pub output_file: Option<PathBuf>,
    pub print_to_console: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_file: Some(PathBuf::from(DEFAULT_OUTPUT_FILE)),
            print_to_console: false,
        }
    }
}

impl OutputConfig {
    /// Build from a user-supplied path where `_` means no file
    pub fn from_sentinel(path: &Path, print_to_console: bool) -> Self {
        let output_file = if path == Path::new(DISCARD_SENTINEL) {
            None
        } else {
            Some(path.to_path_buf())
        };
        Self {
            output_file,
            print_to_console,
        }
    }

    /// Targets in delivery order; console always precedes the file
    pub fn targets(&self) -> Vec<OutputTarget> {
        let mut targets = Vec::with_capacity(2);
        if self.print_to_console {
            targets.push(OutputTarget::StandardOutput);
        }
        targets.push(match &self.output_file {
            Some(path) => OutputTarget::File(path.clone()),
            None => OutputTarget::Discard,
        });
        targets
    }
}

/// What `route` actually delivered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteReport {
    pub printed: bool,
    pub written: Option<PathBuf>,
}

/// Deliver `text` to every configured target.
///
/// A failed file write is reported after console output has already been
/// delivered.
pub fn route(text: &str, config: &OutputConfig, sink: &mut dyn OutputSink) -> Result<RouteReport> {
    let mut report = RouteReport::default();

    for target in config.targets() {
        match target {
            OutputTarget::StandardOutput => {
                sink.print(text);
                report.printed = true;
            }
            OutputTarget::File(path) => {
                fs::write(&path, text).map_err(|source| Error::FileWriteFailure {
                    path: path.clone(),
                    source,
                })?;
                tracing::info!("Wrote device tree source to {}", path.display());
                report.written = Some(path);
            }
            OutputTarget::Discard => {}
        }
    }

    Ok(report)
}
