//! Configure command handler

use crate::config::Config;
use anyhow::Result;
use std::path::PathBuf;

/// Handle the configure command
pub fn handle(
    converter: Option<String>,
    timeout: Option<u64>,
    workspace_dir: Option<PathBuf>,
    output_file: Option<PathBuf>,
    show: bool,
) -> Result<()> {
    let mut config = Config::load()?;
    let changed = converter.is_some()
        || timeout.is_some()
        || workspace_dir.is_some()
        || output_file.is_some();

    if let Some(converter) = converter {
        config.converter = Some(converter);
    }
    if let Some(timeout) = timeout {
        config.timeout_secs = Some(timeout);
    }
    if let Some(dir) = workspace_dir {
        config.workspace_dir = Some(dir);
    }
    if let Some(path) = output_file {
        config.output_file = Some(path);
    }

    if changed {
        config.save()?;
        println!("Configuration saved to {}", Config::config_path()?.display());
    }

    if show || !changed {
        println!("Configuration file: {}", Config::config_path()?.display());
        println!();
        print_setting("converter", config.converter.as_deref());
        print_setting(
            "timeout_secs",
            config.timeout_secs.map(|t| t.to_string()).as_deref(),
        );
        print_setting(
            "workspace_dir",
            config.workspace_dir.as_ref().map(|p| p.display().to_string()).as_deref(),
        );
        print_setting(
            "output_file",
            config.output_file.as_ref().map(|p| p.display().to_string()).as_deref(),
        );
    }

    Ok(())
}

fn print_setting(name: &str, value: Option<&str>) {
    println!("  {:<14} {}", name, value.unwrap_or("(default)"));
}
