//! Locate, validate, extract, convert, route.

use crate::config::PipelineConfig;
use crate::context::CommandContext;
use crate::converter::{ConversionResult, Converter};
use crate::error::Result;
use crate::extract::extract;
use crate::header::{read_header, BlobHeader};
use crate::locator::locate;
use crate::output::{route, RouteReport};
use crate::workspace::TempWorkspace;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Locating,
    ValidatingHeader,
    Extracting,
    Converting,
    Routing,
    Done,
    Error,
}

/// Summary of a successful run
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub address: u64,
    pub header: BlobHeader,
    pub bytes_read: usize,
    pub result: ConversionResult,
    pub routed: RouteReport,
    /// Workspace used for the conversion; already removed
    pub workspace: PathBuf,
}

pub struct Pipeline<'a> {
    config: &'a PipelineConfig,
    stage: Stage,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self {
            config,
            stage: Stage::Idle,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Run once against `ctx`.
    ///
    /// Any temporary workspace is gone by the time this returns, on success
    /// and on every error.
    pub fn run(&mut self, ctx: &mut dyn CommandContext) -> Result<PipelineOutcome> {
        match self.execute(ctx) {
            Ok(outcome) => {
                self.transition(Stage::Done);
                Ok(outcome)
            }
            Err(e) => {
                tracing::debug!("Pipeline failed while {:?}: {}", self.stage, e);
                self.transition(Stage::Error);
                Err(e)
            }
        }
    }

    fn execute(&mut self, ctx: &mut dyn CommandContext) -> Result<PipelineOutcome> {
        let config = self.config;

        self.transition(Stage::Locating);
        let address = locate(&config.pointer_name, ctx.scope(), &config.scope)?;

        self.transition(Stage::ValidatingHeader);
        let header = read_header(ctx.memory(), address)?;
        header.check_total_size(config.max_blob_size)?;

        self.transition(Stage::Extracting);
        let blob = extract(ctx.memory(), address, header.total_size)?;

        self.transition(Stage::Converting);
        let workspace = TempWorkspace::create(&config.workspace_dir)?;
        let workspace_path = workspace.path().to_path_buf();
        let blob_path = workspace.persist_blob(&blob)?;
        let result = Converter::new(config.converter.clone())
            .invoke(&blob_path, &workspace.source_path())?;
        if result.has_diagnostics() {
            ctx.sink().diagnostic(&result.diagnostics);
        }

        self.transition(Stage::Routing);
        let routed = route(&result.source_text, &config.output, ctx.sink())?;

        if let Err(e) = workspace.close() {
            tracing::warn!("Failed to remove workspace {}: {}", workspace_path.display(), e);
        }

        Ok(PipelineOutcome {
            address,
            header,
            bytes_read: blob.len(),
            result,
            routed,
            workspace: workspace_path,
        })
    }

    fn transition(&mut self, next: Stage) {
        tracing::debug!("{:?} -> {:?}", self.stage, next);
        self.stage = next;
    }
}
