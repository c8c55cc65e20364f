use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use orglens::cli::{self, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    // Keep panics readable for end users while RUST_LOG keeps detail
    // available for debugging
    std::panic::set_hook(Box::new(|info| {
        eprintln!("orglens crashed: {info}");
        eprintln!("set RUST_LOG=debug and rerun to capture details");
    }));

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
