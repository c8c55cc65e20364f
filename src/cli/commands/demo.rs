//! `demo` Command
//!
//! End-to-end showcase: generate a seeded sample organization in memory,
//! run the full analysis, and print the report. Nothing touches disk.

use anyhow::Context;
use clap::Args;
use std::path::Path;
use std::sync::Arc;

use crate::analytics::InsightsEngine;
use crate::cli::output::Output;
use crate::config;
use crate::report;
use crate::sample::{self, SampleSpec};
use crate::types::Organization;

#[derive(Debug, Args)]
pub struct DemoArgs {
    /// RNG seed for the sample organization
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

pub async fn run(args: DemoArgs, config_path: Option<&Path>, out: &Output) -> anyhow::Result<()> {
    let config = match config_path {
        Some(path) => config::load_from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => config::load().context("loading config")?,
    };

    let data = sample::generate(SampleSpec {
        seed: args.seed,
        ..SampleSpec::default()
    });
    out.header(&format!(
        "Demo: {} employees, {} events",
        data.hris.employees.len(),
        data.events.len()
    ));

    let org = Organization::build(
        &data.hris.company_name,
        &data.hris.domain,
        data.hris.employees,
    );
    let engine = InsightsEngine::new(Arc::new(org), config)?;
    let report = engine.analyze(data.events).await?;
    out.raw(&report::render_markdown(&report)?);
    Ok(())
}
