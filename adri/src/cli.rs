// adri/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use adri_core::Dimension;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "adri")]
#[command(about = "Agent Data Readiness Index: score a dataset before an agent consumes it", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 📊 Assesses a CSV file on the five quality dimensions
    Assess(AssessArgs),

    /// ✅ Checks that a standard document parses and is internally valid
    Validate {
        /// Path to the standard YAML document
        standard: PathBuf,
    },

    /// 📚 Lists the registered rules
    Rules {
        /// Only rules of this dimension
        #[arg(long)]
        dimension: Option<Dimension>,
    },
}

#[derive(Args, Debug)]
pub struct AssessArgs {
    /// CSV file to assess
    #[arg(long)]
    pub data: PathBuf,

    /// Standard to gate on; the exit code is non-zero when it is not met
    #[arg(long)]
    pub standard: Option<PathBuf>,

    /// Assessment configuration (default: adri-config.yaml / adri.yaml in the current directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Metadata sidecar (default: <data stem>.metadata.yaml next to the data, if present)
    #[arg(long)]
    pub metadata: Option<PathBuf>,

    /// Where to write the JSON report
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Reference instant for freshness (RFC 3339), default now
    #[arg(long)]
    pub as_of: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use clap::Parser;

    #[test]
    fn test_cli_parse_assess_minimal() -> Result<()> {
        let args = Cli::parse_from(["adri", "assess", "--data", "orders.csv"]);
        match args.command {
            Commands::Assess(a) => {
                assert_eq!(a.data.to_string_lossy(), "orders.csv");
                assert!(a.standard.is_none());
                assert!(a.as_of.is_none());
                Ok(())
            }
            _ => bail!("Expected Assess command"),
        }
    }

    #[test]
    fn test_cli_parse_assess_full() -> Result<()> {
        let args = Cli::parse_from([
            "adri",
            "assess",
            "--data",
            "orders.csv",
            "--standard",
            "orders_standard.yaml",
            "-o",
            "report.json",
            "--as-of",
            "2024-06-01T12:00:00Z",
        ]);
        match args.command {
            Commands::Assess(a) => {
                assert_eq!(a.output.unwrap().to_string_lossy(), "report.json");
                assert_eq!(a.as_of.unwrap().to_rfc3339(), "2024-06-01T12:00:00+00:00");
                Ok(())
            }
            _ => bail!("Expected Assess command"),
        }
    }

    #[test]
    fn test_cli_parse_rules_dimension() -> Result<()> {
        let args = Cli::parse_from(["adri", "rules", "--dimension", "consistency"]);
        match args.command {
            Commands::Rules { dimension } => {
                assert_eq!(dimension, Some(Dimension::Consistency));
                Ok(())
            }
            _ => bail!("Expected Rules command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_dimension() {
        assert!(Cli::try_parse_from(["adri", "rules", "--dimension", "timeliness"]).is_err());
    }
}
