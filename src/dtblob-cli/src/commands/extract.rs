//! Extract command handler

use crate::cli::ExtractArgs;
use crate::config::Config;
use crate::context::HostContext;
use crate::memory::{ImageFile, LiveProcess};
use crate::scope::build_scope;
use anyhow::{Context, Result};
use dtblob::{
    AddressSpace, ConverterConfig, OutputConfig, Pipeline, PipelineConfig, ScopeFilter,
    DEFAULT_OUTPUT_FILE,
};
use std::path::PathBuf;

/// Merge command-line flags over persisted settings
pub fn pipeline_config(args: &ExtractArgs, config: &Config) -> PipelineConfig {
    let output_file = args
        .output_file
        .clone()
        .or_else(|| config.output_file.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE));

    let mut converter = ConverterConfig::default();
    if let Some(program) = args.converter.clone().or_else(|| config.converter.clone()) {
        converter.program = program;
    }
    if let Some(timeout) = args.timeout.or(config.timeout_secs) {
        converter.timeout_secs = timeout;
    }

    let mut pipeline = PipelineConfig::new(args.pointer.clone());
    pipeline.output = OutputConfig::from_sentinel(&output_file, args.print_dts);
    pipeline.scope = ScopeFilter {
        include_arguments: args.arguments,
        include_locals: args.locals,
        include_statics: args.statics,
        in_scope_only: args.in_scope,
    };
    pipeline.converter = converter;
    if let Some(dir) = args.workspace_dir.clone().or_else(|| config.workspace_dir.clone()) {
        pipeline.workspace_dir = dir;
    }
    if let Some(max) = args.max_size {
        pipeline.max_blob_size = max;
    }
    pipeline
}

fn open_memory(args: &ExtractArgs) -> Result<Box<dyn AddressSpace>> {
    match (&args.image, args.pid) {
        (Some(image), _) => {
            let base = args.base.context("--image requires --base")?;
            let image = ImageFile::open(image, base).context("Failed to open memory image")?;
            Ok(Box::new(image))
        }
        (None, Some(pid)) => {
            let process = LiveProcess::attach(pid)?;
            Ok(Box::new(process))
        }
        (None, None) => anyhow::bail!("Specify a process with --pid or a memory image with --image"),
    }
}

/// Handle the extract command
pub fn handle(args: &ExtractArgs) -> Result<()> {
    let config = Config::load()?;
    let pipeline_config = pipeline_config(args, &config);

    let scope = build_scope(args.scope_file.as_deref(), &args.vars)?;
    let memory = open_memory(args)?;
    let mut ctx = HostContext::new(memory, scope);

    let outcome = Pipeline::new(&pipeline_config).run(&mut ctx)?;

    let destination = match &outcome.routed.written {
        Some(path) => format!(" -> {}", path.display()),
        None => String::new(),
    };
    eprintln!(
        "Converted {} byte device tree at {:#x}{}",
        outcome.bytes_read, outcome.address, destination
    );

    Ok(())
}
