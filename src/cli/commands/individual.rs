//! `individual` Command

use anyhow::Context;
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::analytics::InsightsEngine;
use crate::cli::output::Output;
use crate::config;
use crate::loaders;
use crate::report;

#[derive(Debug, Args)]
pub struct IndividualArgs {
    /// Email of the employee to analyze
    #[arg(long)]
    pub email: String,

    /// HRIS employee export (JSON)
    #[arg(long)]
    pub hris: PathBuf,

    /// Calendar event export (JSON)
    #[arg(long)]
    pub events: PathBuf,

    /// Emit the raw report as JSON instead of Markdown
    #[arg(long)]
    pub json: bool,
}

pub async fn run(
    args: IndividualArgs,
    config_path: Option<&Path>,
    out: &Output,
) -> anyhow::Result<()> {
    let config = match config_path {
        Some(path) => config::load_from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => config::load().context("loading config")?,
    };
    let org = loaders::load_organization(&args.hris)
        .with_context(|| format!("loading HRIS export {}", args.hris.display()))?;
    let events = super::analyze::load_raw_events(&args.events)?;

    let engine = InsightsEngine::new(Arc::new(org), config)?;
    let report = engine.analyze_individual(&args.email, events).await?;

    if args.json {
        out.raw(&serde_json::to_string_pretty(&report).context("serializing report")?);
    } else {
        out.raw(&report::render_individual(&report)?);
    }
    Ok(())
}
