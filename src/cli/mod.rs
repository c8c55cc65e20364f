//! Command-Line Interface
//!
//! Argument parsing and command dispatch. Each subcommand lives in its
//! own module under `commands/` and returns `anyhow::Result`, adding
//! path and argument context to the library's errors at the boundary.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use output::Output;

#[derive(Debug, Parser)]
#[command(
    name = "orglens",
    version,
    about = "Organizational meeting analytics from calendar and HRIS data"
)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true, env = "ORGLENS_CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Suppress progress output (reports still print)
    #[arg(long, short, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze an organization's meeting data
    Analyze(commands::analyze::AnalyzeArgs),
    /// Analyze a single person's meeting load
    Individual(commands::individual::IndividualArgs),
    /// Generate seeded sample HRIS and calendar exports
    GenerateSample(commands::generate::GenerateArgs),
    /// Generate sample data and analyze it in one step
    Demo(commands::demo::DemoArgs),
    /// Inspect or initialize configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let out = Output::new(cli.quiet);
    match cli.command {
        Command::Analyze(args) => commands::analyze::run(args, cli.config.as_deref(), &out).await,
        Command::Individual(args) => {
            commands::individual::run(args, cli.config.as_deref(), &out).await
        }
        Command::GenerateSample(args) => commands::generate::run(args, &out),
        Command::Demo(args) => commands::demo::run(args, cli.config.as_deref(), &out).await,
        Command::Config(command) => commands::config::run(command, cli.config.as_deref(), &out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::parse_from([
            "orglens", "analyze", "--hris", "h.json", "--events", "e.json", "--json",
        ]);
        match cli.command {
            Command::Analyze(args) => {
                assert_eq!(args.hris, PathBuf::from("h.json"));
                assert!(args.json);
            }
            _ => panic!("expected analyze"),
        }
    }
}
