//! Host capabilities consumed by the pipeline.

use crate::memory::AddressSpace;
use crate::output::OutputSink;
use crate::scope::Scope;

/// What a debugger front end must provide to run the pipeline
pub trait CommandContext {
    fn memory(&self) -> &dyn AddressSpace;

    fn scope(&self) -> &dyn Scope;

    fn sink(&mut self) -> &mut dyn OutputSink;
}

/// A context assembled from owned parts, used for offline runs and tests
pub struct InMemoryContext<M, S, O> {
    pub memory: M,
    pub scope: S,
    pub sink: O,
}

impl<M, S, O> InMemoryContext<M, S, O> {
    pub fn new(memory: M, scope: S, sink: O) -> Self {
        Self {
            memory,
            scope,
            sink,
        }
    }
}

impl<M, S, O> CommandContext for InMemoryContext<M, S, O>
where
    M: AddressSpace,
    S: Scope,
    O: OutputSink,
{
    fn memory(&self) -> &dyn AddressSpace {
        &self.memory
    }

    fn scope(&self) -> &dyn Scope {
        &self.scope
    }

    fn sink(&mut self) -> &mut dyn OutputSink {
        &mut self.sink
    }
}
