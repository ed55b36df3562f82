mod cli;
mod commands;
mod config;
mod context;
mod memory;
mod scope;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::*;

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "dtblob=debug,dt_blob_to_source=debug"
    } else {
        "dtblob=warn,dt_blob_to_source=warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Extract(args) => {
            commands::extract::handle(&args)?;
        }

        Commands::Configure {
            converter,
            timeout,
            workspace_dir,
            output_file,
            show,
        } => {
            commands::configure::handle(converter, timeout, workspace_dir, output_file, show)?;
        }
    }

    Ok(())
}
