//! Report Generation Module
//!
//! Console summaries for significance tests, summary statistics and
//! generation runs, plus the `summary_statistics.csv` export.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

use crate::analysis::{ArchitectureSummary, SignificanceSlice};
use crate::config::SweepConfig;
use crate::error::Result;
use crate::types::{Architecture, TrialRecord};

/// Print the significance test results to the console.
pub fn print_significance_tests(slices: &[SignificanceSlice]) {
    println!();
    println!("{}", "═".repeat(80).bright_blue());
    println!("{}", "  STATISTICAL SIGNIFICANCE TESTS".bright_white().bold());
    println!("{}", "═".repeat(80).bright_blue());
    println!();

    for (idx, slice) in slices.iter().enumerate() {
        println!(
            "{} {}",
            format!("Test {}:", idx + 1).bright_yellow().bold(),
            slice.title
        );

        let Some(test) = &slice.result else {
            println!("  {}", "Insufficient data for comparison".bright_black());
            println!();
            continue;
        };

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Architecture", "Mean", "Std", "n"]);
        table.add_row(vec![
            Architecture::P2p.label().to_string(),
            format!("{:.2}{}", test.mean_a, slice.unit),
            format!("{:.2}{}", test.std_a, slice.unit),
            test.n_a.to_string(),
        ]);
        table.add_row(vec![
            Architecture::Sfu.label().to_string(),
            format!("{:.2}{}", test.mean_b, slice.unit),
            format!("{:.2}{}", test.std_b, slice.unit),
            test.n_b.to_string(),
        ]);
        println!("{table}");

        println!("  t-statistic: {}", format!("{:.4}", test.t_statistic).bright_white());
        println!("  p-value:     {}", format!("{:.6}", test.p_value).bright_white());

        let verdict = if test.is_significant() {
            test.significance().green().bold()
        } else {
            test.significance().bright_black()
        };
        println!("  Result:      {verdict}");
        println!();
    }

    println!("{}", "═".repeat(80).bright_blue());
}

/// Print the per-architecture summary statistics table.
pub fn print_summary_statistics(summaries: &[ArchitectureSummary]) {
    println!();
    println!("{}", "═".repeat(80).bright_blue());
    println!("{}", "  SUMMARY STATISTICS".bright_white().bold());
    println!("{}", "═".repeat(80).bright_blue());
    println!();

    if summaries.is_empty() {
        println!("  {}", "No successful tests to summarize.".bright_black());
        println!();
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Architecture",
            "Tests",
            "CPU avg",
            "CPU max",
            "Latency avg",
            "Latency min",
            "Latency max",
            "TLS avg",
            "TLS min",
            "TLS max",
        ]);

    for summary in summaries {
        table.add_row(vec![
            summary.architecture.label().to_string(),
            summary.total_tests.to_string(),
            format!("{:.2}%", summary.avg_cpu_usage),
            format!("{:.2}%", summary.max_cpu_usage),
            format!("{:.2}ms", summary.avg_latency),
            format!("{:.2}ms", summary.min_latency),
            format!("{:.2}ms", summary.max_latency),
            format!("{:.2}", summary.avg_tls),
            format!("{:.2}", summary.min_tls),
            format!("{:.2}", summary.max_tls),
        ]);
    }

    println!("{table}");
    println!();
}

/// Export summary statistics to CSV. Always writes the header row, so an
/// empty dataset still produces a valid file.
pub fn write_summary_csv(path: &Path, summaries: &[ArchitectureSummary]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(
        writer,
        "Architecture,Total_Tests,Avg_CPU_Usage,Max_CPU_Usage,Avg_Latency,Min_Latency,Max_Latency,Avg_TLS,Min_TLS,Max_TLS"
    )?;

    for s in summaries {
        writeln!(
            writer,
            "{},{},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2}",
            s.architecture,
            s.total_tests,
            s.avg_cpu_usage,
            s.max_cpu_usage,
            s.avg_latency,
            s.min_latency,
            s.max_latency,
            s.avg_tls,
            s.min_tls,
            s.max_tls,
        )?;
    }
    writer.flush()?;

    println!("  Exported: {}", path.display().to_string().bright_cyan());
    Ok(())
}

/// Print a short per-architecture preview after a generation run.
pub fn print_generation_summary(config: &SweepConfig, records: &[TrialRecord]) {
    println!();
    println!("{}", "▶ GENERATION SUMMARY".bright_yellow().bold());
    println!(
        "  {} trials ({} viewers × {} loss rates × {} bandwidths × {} reps × 2 architectures)",
        records.len().to_string().bright_white(),
        config.viewer_counts.len(),
        config.loss_rates.len(),
        config.bandwidths.len(),
        config.repetitions,
    );
    println!();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Architecture", "CPU avg", "Latency avg", "Jitter avg", "TLS avg"]);

    for arch in Architecture::ALL {
        let rows: Vec<&TrialRecord> =
            records.iter().filter(|r| r.architecture == arch).collect();
        if rows.is_empty() {
            continue;
        }
        let n = rows.len() as f64;
        let avg = |f: &dyn Fn(&TrialRecord) -> f64| {
            rows.iter().map(|&r| f(r)).sum::<f64>() / n
        };
        table.add_row(vec![
            arch.label().to_string(),
            format!("{:.1}%", avg(&|r| r.presenter_cpu_avg)),
            format!("{:.1}ms", avg(&|r| r.avg_latency_ms)),
            format!("{:.1}ms", avg(&|r| r.avg_jitter_ms)),
            format!("{:.1}", avg(&|r| r.text_legibility_score)),
        ]);
    }

    println!("{table}");
}
