//! Error types for the blob pipeline.

use crate::pipeline::Stage;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("There is no pointer named \"{name}\" in this frame.")]
    VariableNotFound { name: String },

    #[error("{name} is not a pointer (type is `{type_name}`).")]
    TypeMismatch { name: String, type_name: String },

    #[error(
        "Blob at {address:#x} does not appear to be a valid device tree blob \
         (magic number is {found:#010x}, expected {expected:#010x})."
    )]
    InvalidMagicNumber {
        address: u64,
        found: u32,
        expected: u32,
    },

    #[error("Device tree total size {size} is out of range (minimum {min}, maximum {max})")]
    InvalidTotalSize { size: u32, min: u32, max: u32 },

    #[error("Failed to read {length} bytes at {address:#x}: {reason}")]
    MemoryReadFailure {
        address: u64,
        length: u32,
        reason: String,
        /// Header probe or payload read
        stage: Stage,
    },

    #[error("Failed to start converter `{program}`: {source}")]
    ConverterSpawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Converter failed ({}): {stderr}", exit_label(.exit_code))]
    ConverterInvocationFailure {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Converter did not finish within {timeout:?}")]
    ConverterTimeout { timeout: Duration },

    #[error("Failed to write {}: {source}", .path.display())]
    FileWriteFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Temporary workspace error: {0}")]
    Workspace(#[from] io::Error),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

impl Error {
    /// Pipeline stage that produced this error
    pub fn stage(&self) -> Stage {
        match self {
            Error::VariableNotFound { .. } | Error::TypeMismatch { .. } => Stage::Locating,
            Error::InvalidMagicNumber { .. } | Error::InvalidTotalSize { .. } => {
                Stage::ValidatingHeader
            }
            Error::MemoryReadFailure { stage, .. } => *stage,
            Error::ConverterSpawn { .. }
            | Error::ConverterInvocationFailure { .. }
            | Error::ConverterTimeout { .. }
            | Error::Workspace(_) => Stage::Converting,
            Error::FileWriteFailure { .. } => Stage::Routing,
        }
    }
}
