//! Command context backed by the host's memory source and terminal.

use dtblob::{AddressSpace, CommandContext, OutputSink, Scope, StaticScope};
use std::io::{self, Write};

/// Source text to stdout, converter diagnostics to stderr
pub struct StdioSink;

/// Write `text` newline-terminated and flush
fn write_text<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    out.write_all(text.as_bytes())?;
    if !text.ends_with('\n') {
        out.write_all(b"\n")?;
    }
    out.flush()
}

impl OutputSink for StdioSink {
    fn print(&mut self, text: &str) {
        if let Err(e) = write_text(&mut io::stdout().lock(), text) {
            tracing::warn!("Failed to write device tree source to stdout: {}", e);
        }
    }

    fn diagnostic(&mut self, text: &str) {
        eprintln!("{}", text.trim_end());
    }
}

pub struct HostContext {
    memory: Box<dyn AddressSpace>,
    scope: StaticScope,
    sink: StdioSink,
}

impl HostContext {
    pub fn new(memory: Box<dyn AddressSpace>, scope: StaticScope) -> Self {
        Self {
            memory,
            scope,
            sink: StdioSink,
        }
    }
}

impl CommandContext for HostContext {
    fn memory(&self) -> &dyn AddressSpace {
        self.memory.as_ref()
    }

    fn scope(&self) -> &dyn Scope {
        &self.scope
    }

    fn sink(&mut self) -> &mut dyn OutputSink {
        &mut self.sink
    }
}
