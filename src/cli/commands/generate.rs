//! `generate-sample` Command

use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

use crate::cli::output::Output;
use crate::sample::{self, SampleSpec};

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Directory to write `hris.json` and `events.json` into
    #[arg(long, short, default_value = "sample-data")]
    pub out_dir: PathBuf,

    /// Number of employees in the synthetic organization
    #[arg(long, default_value_t = 40)]
    pub employees: usize,

    /// Weeks of calendar history to generate
    #[arg(long, default_value_t = 8)]
    pub weeks: u32,

    /// RNG seed; the same seed always produces the same data
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

pub fn run(args: GenerateArgs, out: &Output) -> anyhow::Result<()> {
    let data = sample::generate(SampleSpec {
        employees: args.employees,
        weeks: args.weeks,
        seed: args.seed,
    });
    data.write_to(&args.out_dir)
        .with_context(|| format!("writing sample data to {}", args.out_dir.display()))?;
    out.success(&format!(
        "generated {} employees and {} events in {}",
        data.hris.employees.len(),
        data.events.len(),
        args.out_dir.display()
    ));
    Ok(())
}
