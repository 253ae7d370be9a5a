// adri/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

fn main() -> miette::Result<()> {
    // 1. Setup Logging (Tracing)
    // RUST_LOG=debug adri assess ... to see the per-dimension details
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        // --- USE CASE: ASSESS (+ GATE) ---
        Commands::Assess(args) => {
            if !commands::assess::execute(args)? {
                // Exit with error code for CI/CD
                std::process::exit(1);
            }
        }

        // --- USE CASE: VALIDATE STANDARD ---
        Commands::Validate { standard } => commands::validate::execute(&standard)?,

        // --- USE CASE: LIST RULES ---
        Commands::Rules { dimension } => commands::rules::execute(dimension),
    }

    Ok(())
}
