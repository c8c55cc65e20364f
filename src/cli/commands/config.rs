//! `config` Command

use anyhow::Context;
use clap::Subcommand;
use std::path::Path;

use crate::cli::output::Output;
use crate::config;

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,
    /// Print the config file path that would be read
    Path,
    /// Write a config file populated with the defaults
    Init,
}

pub fn run(command: ConfigCommand, config_path: Option<&Path>, out: &Output) -> anyhow::Result<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config::default_path);

    match command {
        ConfigCommand::Show => {
            let config = config::load_from_file(&path)
                .with_context(|| format!("loading config from {}", path.display()))?;
            out.raw(&config::to_toml(&config)?);
        }
        ConfigCommand::Path => {
            out.raw(&path.display().to_string());
        }
        ConfigCommand::Init => {
            if path.exists() {
                anyhow::bail!("{} already exists, refusing to overwrite", path.display());
            }
            let rendered = config::to_toml(&config::types::AnalyticsConfig::default())?;
            std::fs::write(&path, rendered)
                .with_context(|| format!("writing {}", path.display()))?;
            out.success(&format!("wrote default configuration to {}", path.display()));
        }
    }
    Ok(())
}
