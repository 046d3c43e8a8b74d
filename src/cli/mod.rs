//! CLI interface for Meshbench.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Meshbench - synthetic P2P mesh vs SFU conferencing benchmark
#[derive(Parser, Debug)]
#[command(
    name = "meshbench",
    author,
    version,
    about = "Generate and analyze synthetic conferencing performance data",
    long_about = r#"
Meshbench produces synthetic performance data comparing two
video-conferencing architectures:

  - P2P mesh: the presenter streams directly to each viewer
  - SFU: the presenter streams once to a forwarding server

QUICK START:
  Generate:  meshbench generate --output results.csv
  Analyze:   meshbench analyze --input results.csv --output plots
"#
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a synthetic results dataset
    Generate(GenerateArgs),

    /// Analyze a results dataset: t-tests, charts, summary statistics
    Analyze(AnalyzeArgs),
}

/// Generate command arguments
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Sweep configuration file (TOML); overrides the profile grid
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Sweep profile
    #[arg(long, default_value = "full")]
    pub profile: Profile,

    /// RNG seed override
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output CSV path
    #[arg(short, long, default_value = "results.csv")]
    pub output: PathBuf,
}

/// Analyze command arguments
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Input CSV file path
    #[arg(short, long, default_value = "results.csv")]
    pub input: PathBuf,

    /// Output directory for plots and summary statistics
    #[arg(short, long, default_value = "plots")]
    pub output: PathBuf,
}

/// Sweep profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Profile {
    /// Comprehensive grid, 5 repetitions
    Full,
    /// Quick smoke-test grid
    Short,
    /// Full grid at 2 repetitions, with the system load sampler
    Production,
}
