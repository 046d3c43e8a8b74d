//! Statistical Analysis Module
//!
//! Grouped descriptive statistics and independent two-sample t-tests over
//! a preprocessed dataset, plus the analyzer that drives the full
//! pipeline (tests, charts, summary export).

use std::collections::BTreeMap;
use std::path::PathBuf;

use statrs::distribution::{ContinuousCDF, StudentsT};
use tracing::info;

use crate::dataset::{AnalysisRow, Dataset};
use crate::error::Result;
use crate::types::Architecture;
use crate::{charts, report};

// ============================================================================
// Grouped Statistics
// ============================================================================

/// Mean and spread of one metric within one group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupStat {
    /// Numeric group key (viewer count, loss rate or bandwidth in Mbps).
    pub key: f64,
    pub mean: f64,
    pub std: f64,
    pub n: usize,
}

/// Group rows by a numeric key and compute mean and sample standard
/// deviation of a metric, sorted by key. Groups with no rows simply do
/// not appear.
pub fn grouped_stats<K, M>(rows: &[&AnalysisRow], key: K, metric: M) -> Vec<GroupStat>
where
    K: Fn(&AnalysisRow) -> f64,
    M: Fn(&AnalysisRow) -> f64,
{
    // Quantized key for ordering; f64 keys here are small round numbers.
    let mut groups: BTreeMap<i64, (f64, Vec<f64>)> = BTreeMap::new();
    for row in rows {
        let k = key(row);
        let entry = groups
            .entry((k * 1000.0).round() as i64)
            .or_insert_with(|| (k, Vec::new()));
        entry.1.push(metric(row));
    }

    groups
        .into_values()
        .map(|(key, values)| GroupStat {
            key,
            mean: mean(&values),
            std: std_dev(&values),
            n: values.len(),
        })
        .collect()
}

/// Per-architecture grouped stats, in `Architecture::ALL` order.
pub fn grouped_by_architecture<K, M>(
    dataset: &Dataset,
    key: K,
    metric: M,
) -> Vec<(Architecture, Vec<GroupStat>)>
where
    K: Fn(&AnalysisRow) -> f64 + Copy,
    M: Fn(&AnalysisRow) -> f64 + Copy,
{
    Architecture::ALL
        .iter()
        .map(|&arch| {
            let rows: Vec<&AnalysisRow> = dataset.rows_for(arch).collect();
            (arch, grouped_stats(&rows, key, metric))
        })
        .collect()
}

// ============================================================================
// Significance Testing
// ============================================================================

/// Result of an independent two-sample Student's t-test.
#[derive(Debug, Clone, Copy)]
pub struct TTest {
    pub t_statistic: f64,
    pub p_value: f64,
    pub mean_a: f64,
    pub std_a: f64,
    pub n_a: usize,
    pub mean_b: f64,
    pub std_b: f64,
    pub n_b: usize,
}

impl TTest {
    /// Significance marker at the conventional thresholds.
    pub fn significance(&self) -> &'static str {
        if self.p_value < 0.001 {
            "***HIGHLY SIGNIFICANT*** (p < 0.001)"
        } else if self.p_value < 0.01 {
            "**SIGNIFICANT** (p < 0.01)"
        } else if self.p_value < 0.05 {
            "*SIGNIFICANT* (p < 0.05)"
        } else {
            "Not significant (p >= 0.05)"
        }
    }

    pub fn is_significant(&self) -> bool {
        self.p_value < 0.05
    }
}

/// Independent two-sample t-test with pooled variance.
///
/// Returns `None` when either side has fewer than two samples or the
/// pooled variance is zero, rather than producing NaN statistics.
pub fn t_test_ind(a: &[f64], b: &[f64]) -> Option<TTest> {
    let (n_a, n_b) = (a.len(), b.len());
    if n_a < 2 || n_b < 2 {
        return None;
    }

    let (mean_a, mean_b) = (mean(a), mean(b));
    let (std_a, std_b) = (std_dev(a), std_dev(b));
    let (na, nb) = (n_a as f64, n_b as f64);

    let df = na + nb - 2.0;
    let pooled_var =
        ((na - 1.0) * std_a * std_a + (nb - 1.0) * std_b * std_b) / df;
    if pooled_var <= 0.0 {
        return None;
    }

    let se = (pooled_var * (1.0 / na + 1.0 / nb)).sqrt();
    let t_statistic = (mean_a - mean_b) / se;

    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    let p_value = 2.0 * (1.0 - dist.cdf(t_statistic.abs()));

    Some(TTest {
        t_statistic,
        p_value,
        mean_a,
        std_a,
        n_a,
        mean_b,
        std_b,
        n_b,
    })
}

/// One fixed parameter slice compared between P2P and SFU.
#[derive(Debug, Clone)]
pub struct SignificanceSlice {
    pub title: String,
    pub metric_label: String,
    pub unit: String,
    pub result: Option<TTest>,
}

/// Run the three fixed significance slices:
/// CPU at 10 viewers, latency at 5% loss and 5 viewers, TLS at 1 Mbps.
pub fn significance_tests(dataset: &Dataset) -> Vec<SignificanceSlice> {
    let slice = |title: &str, metric_label: &str, unit: &str, result| SignificanceSlice {
        title: title.to_string(),
        metric_label: metric_label.to_string(),
        unit: unit.to_string(),
        result,
    };

    let cpu_at_10 = |arch| {
        collect_metric(dataset, arch, |r| r.record.num_viewers == 10, |r| {
            r.record.presenter_cpu_avg
        })
    };
    let latency_at_5loss = |arch| {
        collect_metric(
            dataset,
            arch,
            |r| r.record.num_viewers == 5 && r.record.packet_loss_rate == 5.0,
            |r| r.record.avg_latency_ms,
        )
    };
    let tls_at_1mbps = |arch| {
        collect_metric(dataset, arch, |r| r.bandwidth_mbps == 1.0, |r| {
            r.record.text_legibility_score
        })
    };

    vec![
        slice(
            "Presenter CPU at N=10 viewers",
            "CPU",
            "%",
            t_test_ind(
                &cpu_at_10(Architecture::P2p),
                &cpu_at_10(Architecture::Sfu),
            ),
        ),
        slice(
            "G2G Latency at 5% packet loss (N=5 viewers)",
            "Latency",
            "ms",
            t_test_ind(
                &latency_at_5loss(Architecture::P2p),
                &latency_at_5loss(Architecture::Sfu),
            ),
        ),
        slice(
            "Text Legibility Score at 1Mbps bandwidth",
            "TLS",
            "",
            t_test_ind(
                &tls_at_1mbps(Architecture::P2p),
                &tls_at_1mbps(Architecture::Sfu),
            ),
        ),
    ]
}

fn collect_metric<F, M>(dataset: &Dataset, arch: Architecture, filter: F, metric: M) -> Vec<f64>
where
    F: Fn(&AnalysisRow) -> bool,
    M: Fn(&AnalysisRow) -> f64,
{
    dataset
        .rows_for(arch)
        .filter(|r| filter(r))
        .map(metric)
        .collect()
}

// ============================================================================
// Summary Statistics
// ============================================================================

/// Per-architecture summary statistics exported to `summary_statistics.csv`.
#[derive(Debug, Clone)]
pub struct ArchitectureSummary {
    pub architecture: Architecture,
    pub total_tests: usize,
    pub avg_cpu_usage: f64,
    pub max_cpu_usage: f64,
    pub avg_latency: f64,
    pub min_latency: f64,
    pub max_latency: f64,
    pub avg_tls: f64,
    pub min_tls: f64,
    pub max_tls: f64,
}

/// Summary statistics per architecture; architectures with no rows are
/// omitted.
pub fn summary_statistics(dataset: &Dataset) -> Vec<ArchitectureSummary> {
    Architecture::ALL
        .iter()
        .filter_map(|&arch| {
            let cpus: Vec<f64> = dataset
                .rows_for(arch)
                .map(|r| r.record.presenter_cpu_avg)
                .collect();
            if cpus.is_empty() {
                return None;
            }
            let latencies: Vec<f64> = dataset
                .rows_for(arch)
                .map(|r| r.record.avg_latency_ms)
                .collect();
            let tls: Vec<f64> = dataset
                .rows_for(arch)
                .map(|r| r.record.text_legibility_score)
                .collect();

            Some(ArchitectureSummary {
                architecture: arch,
                total_tests: cpus.len(),
                avg_cpu_usage: mean(&cpus),
                max_cpu_usage: max(&cpus),
                avg_latency: mean(&latencies),
                min_latency: min(&latencies),
                max_latency: max(&latencies),
                avg_tls: mean(&tls),
                min_tls: min(&tls),
                max_tls: max(&tls),
            })
        })
        .collect()
}

// ============================================================================
// Analyzer
// ============================================================================

/// The analysis pipeline: a loaded dataset plus output configuration.
pub struct Analyzer {
    dataset: Dataset,
    output_dir: PathBuf,
}

impl Analyzer {
    pub fn new(dataset: Dataset, output_dir: PathBuf) -> Self {
        Self {
            dataset,
            output_dir,
        }
    }

    /// Run the complete pipeline: significance tests, charts and the
    /// summary statistics export.
    pub fn run(&self) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir)?;

        info!("analyzing {} rows", self.dataset.len());

        let slices = significance_tests(&self.dataset);
        report::print_significance_tests(&slices);

        charts::render_all(&self.dataset, &self.output_dir)?;

        let summaries = summary_statistics(&self.dataset);
        report::print_summary_statistics(&summaries);
        report::write_summary_csv(&self.output_dir.join("summary_statistics.csv"), &summaries)?;

        info!("analysis complete, outputs in {}", self.output_dir.display());
        Ok(())
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

fn min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::MAX, f64::min)
}

fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::MIN, f64::max)
}
