//! Meshbench CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use indicatif::ProgressBar;
use tracing::{error, info, warn};

use meshbench::analysis::Analyzer;
use meshbench::cli::{AnalyzeArgs, Cli, Commands, GenerateArgs, Profile};
use meshbench::config::SweepConfig;
use meshbench::dataset::{self, Dataset};
use meshbench::error::Result;
use meshbench::report;
use meshbench::synth::Generator;
use meshbench::sysload;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "meshbench=debug"
    } else {
        "meshbench=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    if cli.no_color {
        colored::control::set_override(false);
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Generate(args) => cmd_generate(&args),
        Commands::Analyze(args) => cmd_analyze(&args),
    }
}

fn cmd_generate(args: &GenerateArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => SweepConfig::load(path)?,
        None => match args.profile {
            Profile::Full => SweepConfig::full(),
            Profile::Short => SweepConfig::short(),
            Profile::Production => SweepConfig::production(),
        },
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.validate()?;

    let total = config.trial_count();
    println!();
    println!(
        "{} Generating {} synthetic trials (seed {})...",
        "▶".bright_green(),
        total.to_string().bright_yellow(),
        config.seed
    );

    let with_load = args.profile == Profile::Production;
    if with_load {
        info!("production profile: running the system load sampler per trial");
        let baseline = sysload::run(
            meshbench::Architecture::Sfu,
            1,
            &sysload::LoadConfig::default(),
        );
        match baseline.cpu_avg() {
            Some(cpu) => info!("ambient CPU baseline: {cpu:.1}%"),
            None => warn!("no ambient CPU samples available on this platform"),
        }
    }

    let progress = ProgressBar::new(total as u64);
    let load_config = sysload::LoadConfig::default();

    let records = Generator::new(config.clone()).generate_with(|record| {
        progress.inc(1);
        if with_load {
            let sample = sysload::run(record.architecture, record.num_viewers, &load_config);
            sample.wall_ms
        } else {
            0
        }
    })?;
    progress.finish_and_clear();

    dataset::write_records(&args.output, &records)?;
    report::print_generation_summary(&config, &records);

    println!();
    println!(
        "  {} {}",
        "Saved:".bright_green(),
        args.output.display().to_string().bright_cyan()
    );
    Ok(())
}

fn cmd_analyze(args: &AnalyzeArgs) -> Result<()> {
    let records = dataset::load_records(&args.input)?;
    let dataset = Dataset::from_records(records);

    let analyzer = Analyzer::new(dataset, args.output.clone());
    analyzer.run()?;

    println!();
    println!("{}", "Generated files:".bright_white().bold());
    for entry in std::fs::read_dir(&args.output)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.ends_with(".png") || name.ends_with(".csv") {
            println!("  - {}", entry.path().display());
        }
    }
    Ok(())
}
