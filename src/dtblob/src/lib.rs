//! # dtblob
//!
//! Pull a flattened device tree blob (DTB) out of a debugged process and turn
//! it into device tree source (DTS).
//!
//! The library is host-agnostic: a debugger or CLI front end supplies a
//! [`CommandContext`] (memory reads, scope lookup, output sink) and the
//! [`Pipeline`] does the rest:
//! - Locate the pointer variable in the current scope
//! - Validate the blob header (magic `0xd00dfeed`, big-endian total size)
//! - Extract the whole blob from memory
//! - Hand it to an external converter (`dtc` by default) through a unique,
//!   self-cleaning temporary workspace
//! - Route the resulting text to the console, a file, or both
//!
//! ## Example
//!
//! ```no_run
//! use dtblob::{BufferSink, Binding, BindingKind, MockAddressSpace, Pipeline,
//!     PipelineConfig, StaticScope, InMemoryContext};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let memory = MockAddressSpace::new(std::fs::read("board.dtb")?, 0x4000_0000);
//! let scope = StaticScope::new(vec![Binding::pointer(
//!     "dtb",
//!     BindingKind::Local,
//!     "const u8 *",
//!     0x4000_0000,
//! )]);
//! let mut ctx = InMemoryContext::new(memory, scope, BufferSink::default());
//!
//! let mut config = PipelineConfig::new("dtb");
//! config.output.print_to_console = true;
//! config.output.output_file = None;
//!
//! let outcome = Pipeline::new(&config).run(&mut ctx)?;
//! println!("{} bytes converted", outcome.bytes_read);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod converter;
pub mod error;
pub mod extract;
pub mod header;
pub mod locator;
pub mod memory;
pub mod output;
pub mod pipeline;
pub mod scope;
pub mod workspace;

pub use config::{ConverterConfig, PipelineConfig, DEFAULT_MAX_BLOB_SIZE};
pub use context::{CommandContext, InMemoryContext};
pub use converter::{ConversionResult, Converter};
pub use error::{Error, Result};
pub use extract::{extract, RawBlob, EXTRACT_CHUNK_SIZE};
pub use header::{read_header, BlobHeader, FDT_MAGIC, HEADER_PROBE_SIZE};
pub use locator::locate;
pub use memory::{AddressSpace, MemoryRegion, MockAddressSpace};
pub use output::{
    route, BufferSink, OutputConfig, OutputSink, OutputTarget, RouteReport, DEFAULT_OUTPUT_FILE,
    DISCARD_SENTINEL,
};
pub use pipeline::{Pipeline, PipelineOutcome, Stage};
pub use scope::{Binding, BindingKind, Scope, ScopeFilter, StaticScope};
pub use workspace::TempWorkspace;
