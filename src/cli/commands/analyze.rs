//! `analyze` Command

use anyhow::Context;
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::analytics::{InsightsEngine, InsightsReport};
use crate::cli::output::Output;
use crate::config;
use crate::loaders;
use crate::report;
use crate::types::CalendarEvent;

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// HRIS employee export (JSON)
    #[arg(long)]
    pub hris: PathBuf,

    /// Calendar event export (JSON)
    #[arg(long)]
    pub events: PathBuf,

    /// Write the Markdown report here instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Emit the raw report as JSON instead of Markdown
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: AnalyzeArgs, config_path: Option<&Path>, out: &Output) -> anyhow::Result<()> {
    let report = analyze(&args.hris, &args.events, config_path).await?;

    let rendered = if args.json {
        serde_json::to_string_pretty(&report).context("serializing report")?
    } else {
        report::render_markdown(&report).context("rendering report")?
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("writing report to {}", path.display()))?;
            out.success(&format!("report written to {}", path.display()));
        }
        None => out.raw(&rendered),
    }
    Ok(())
}

/// Load both exports and run the full analysis.
pub(crate) async fn analyze(
    hris: &Path,
    events: &Path,
    config_path: Option<&Path>,
) -> anyhow::Result<InsightsReport> {
    let config = match config_path {
        Some(path) => config::load_from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => config::load().context("loading config")?,
    };

    let org = loaders::load_organization(hris)
        .with_context(|| format!("loading HRIS export {}", hris.display()))?;
    let load = loaders::load_events(events)
        .with_context(|| format!("loading calendar export {}", events.display()))?;

    let engine = InsightsEngine::new(Arc::new(org), config)?;
    let mut report = engine.analyze(load.events).await?;
    // File-level malformed records join the enrichment skip tally
    for skip in &load.malformed {
        *report
            .summary
            .skipped_events
            .entry(skip.reason.to_string())
            .or_default() += 1;
    }
    Ok(report)
}

/// Load only the events, for commands that run their own analysis.
pub(crate) fn load_raw_events(path: &Path) -> anyhow::Result<Vec<CalendarEvent>> {
    let load = loaders::load_events(path)
        .with_context(|| format!("loading calendar export {}", path.display()))?;
    Ok(load.events)
}
