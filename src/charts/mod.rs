//! Chart Rendering Module
//!
//! Renders the five fixed comparison charts as PNG files: line charts
//! with error bars for CPU, latency, egress bandwidth and jitter, and a
//! grouped bar chart for text legibility per bandwidth tier.

use std::path::Path;

use plotters::prelude::*;
use tracing::{info, warn};

use crate::analysis::{grouped_by_architecture, GroupStat};
use crate::dataset::{AnalysisRow, Dataset};
use crate::error::{Error, Result};
use crate::types::Architecture;

const CHART_SIZE: (u32, u32) = (1000, 600);

/// Series color per architecture.
fn color_for(arch: Architecture) -> RGBColor {
    match arch {
        Architecture::P2p => RGBColor(231, 76, 60),
        Architecture::Sfu => RGBColor(52, 152, 219),
    }
}

/// Render all five charts into `output_dir`.
pub fn render_all(dataset: &Dataset, output_dir: &Path) -> Result<()> {
    cpu_vs_viewers(dataset, &output_dir.join("presenter_cpu_vs_viewers.png"))?;
    latency_vs_packet_loss(dataset, &output_dir.join("latency_vs_packet_loss.png"))?;
    tls_vs_bandwidth(dataset, &output_dir.join("tls_vs_bandwidth.png"))?;
    egress_vs_viewers(dataset, &output_dir.join("egress_bandwidth_vs_viewers.png"))?;
    jitter_vs_packet_loss(dataset, &output_dir.join("jitter_vs_packet_loss.png"))?;
    Ok(())
}

/// Presenter CPU utilization vs number of viewers.
fn cpu_vs_viewers(dataset: &Dataset, path: &Path) -> Result<()> {
    let series = grouped_by_architecture(
        dataset,
        |r| f64::from(r.record.num_viewers),
        |r| r.record.presenter_cpu_avg,
    );
    line_chart(
        path,
        "Presenter CPU Utilization vs Number of Viewers",
        "Number of Viewers",
        "Presenter CPU Utilization (%)",
        &series,
        |arch| arch.legend().to_string(),
    )
}

/// Average glass-to-glass latency vs packet loss rate, at 5 viewers.
///
/// Falls back to the full dataset when no 5-viewer rows exist.
fn latency_vs_packet_loss(dataset: &Dataset, path: &Path) -> Result<()> {
    let filtered: Vec<AnalysisRow> = dataset
        .rows
        .iter()
        .filter(|r| r.record.num_viewers == 5)
        .cloned()
        .collect();

    let view = if filtered.is_empty() && !dataset.is_empty() {
        warn!("no data for 5 viewers, using all available data");
        dataset.clone()
    } else {
        Dataset { rows: filtered }
    };

    let series = grouped_by_architecture(
        &view,
        |r| r.record.packet_loss_rate,
        |r| r.record.avg_latency_ms,
    );
    line_chart(
        path,
        "Glass-to-Glass Latency vs Packet Loss Rate",
        "Packet Loss Rate (%)",
        "Average G2G Latency (ms)",
        &series,
        |arch| format!("{} (N=5)", arch.label()),
    )
}

/// Estimated total egress bandwidth vs number of viewers.
fn egress_vs_viewers(dataset: &Dataset, path: &Path) -> Result<()> {
    let series = grouped_by_architecture(
        dataset,
        |r| f64::from(r.record.num_viewers),
        |r| r.egress_bandwidth_mbps,
    );
    line_chart(
        path,
        "Estimated Total Egress Bandwidth vs Number of Viewers",
        "Number of Viewers",
        "Estimated Total Egress Bandwidth (Mbps)",
        &series,
        |arch| arch.label().to_string(),
    )
}

/// Average jitter vs packet loss rate.
fn jitter_vs_packet_loss(dataset: &Dataset, path: &Path) -> Result<()> {
    let series = grouped_by_architecture(
        dataset,
        |r| r.record.packet_loss_rate,
        |r| r.record.avg_jitter_ms,
    );
    line_chart(
        path,
        "Average Jitter vs Packet Loss Rate",
        "Packet Loss Rate (%)",
        "Average Jitter (ms)",
        &series,
        |arch| arch.label().to_string(),
    )
}

/// Line chart with error bars, one series per architecture.
fn line_chart(
    path: &Path,
    title: &str,
    x_desc: &str,
    y_desc: &str,
    series: &[(Architecture, Vec<GroupStat>)],
    legend: impl Fn(Architecture) -> String,
) -> Result<()> {
    let name = title.to_string();
    let err = |e: &dyn std::fmt::Display| Error::chart(&name, e);

    let x_max = series
        .iter()
        .flat_map(|(_, stats)| stats.iter().map(|s| s.key))
        .fold(1.0f64, f64::max)
        * 1.08;
    let y_max = series
        .iter()
        .flat_map(|(_, stats)| stats.iter().map(|s| s.mean + s.std))
        .fold(1.0f64, f64::max)
        * 1.15;

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| err(&e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..x_max, 0.0..y_max)
        .map_err(|e| err(&e))?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()
        .map_err(|e| err(&e))?;

    for &(arch, ref stats) in series {
        if stats.is_empty() {
            continue;
        }
        let color = color_for(arch);

        chart
            .draw_series(LineSeries::new(
                stats.iter().map(|s| (s.key, s.mean)),
                color.stroke_width(3),
            ))
            .map_err(|e| err(&e))?
            .label(legend(arch))
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(3))
            });

        chart
            .draw_series(
                stats
                    .iter()
                    .map(|s| Circle::new((s.key, s.mean), 5, color.filled())),
            )
            .map_err(|e| err(&e))?;

        chart
            .draw_series(stats.iter().map(|s| {
                ErrorBar::new_vertical(
                    s.key,
                    (s.mean - s.std).max(0.0),
                    s.mean,
                    s.mean + s.std,
                    color.stroke_width(2),
                    8,
                )
            }))
            .map_err(|e| err(&e))?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()
        .map_err(|e| err(&e))?;

    root.present().map_err(|e| err(&e))?;
    info!("saved chart {}", path.display());
    Ok(())
}

/// Text legibility score vs presenter upload bandwidth, grouped bars.
fn tls_vs_bandwidth(dataset: &Dataset, path: &Path) -> Result<()> {
    let title = "Text Legibility Score vs Presenter Upload Bandwidth";
    let err = |e: &dyn std::fmt::Display| Error::chart(title, e);

    let series = grouped_by_architecture(
        dataset,
        |r| r.bandwidth_mbps,
        |r| r.record.text_legibility_score,
    );

    // Band per distinct bandwidth tier, ascending.
    let mut bandwidths: Vec<f64> = series
        .iter()
        .flat_map(|(_, stats)| stats.iter().map(|s| s.key))
        .collect();
    bandwidths.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    bandwidths.dedup();

    let bands = bandwidths.len().max(1) as f64;
    let y_max = series
        .iter()
        .flat_map(|(_, stats)| stats.iter().map(|s| s.mean + s.std))
        .fold(1.0f64, f64::max)
        * 1.15;

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| err(&e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5..bands - 0.5, 0.0..y_max)
        .map_err(|e| err(&e))?;

    let labels = bandwidths.clone();
    chart
        .configure_mesh()
        .x_desc("Presenter Upload Bandwidth (Mbps)")
        .y_desc("Text Legibility Score (TLS)")
        .x_labels(bandwidths.len().max(1))
        .x_label_formatter(&move |x| {
            let idx = x.round();
            if (x - idx).abs() < 0.01 && idx >= 0.0 && (idx as usize) < labels.len() {
                format!("{:.0}", labels[idx as usize])
            } else {
                String::new()
            }
        })
        .draw()
        .map_err(|e| err(&e))?;

    for &(arch, ref stats) in &series {
        if stats.is_empty() {
            continue;
        }
        let color = color_for(arch);
        let offset = match arch {
            Architecture::P2p => -0.35,
            Architecture::Sfu => 0.05,
        };

        let bars: Vec<Rectangle<(f64, f64)>> = stats
            .iter()
            .filter_map(|s| {
                let band = bandwidths.iter().position(|&b| b == s.key)? as f64;
                Some(Rectangle::new(
                    [(band + offset, 0.0), (band + offset + 0.3, s.mean)],
                    color.mix(0.8).filled(),
                ))
            })
            .collect();

        chart
            .draw_series(bars)
            .map_err(|e| err(&e))?
            .label(arch.label())
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 6), (x + 12, y + 6)], color.mix(0.8).filled())
            });

        chart
            .draw_series(stats.iter().filter_map(|s| {
                let band = bandwidths.iter().position(|&b| b == s.key)? as f64;
                Some(ErrorBar::new_vertical(
                    band + offset + 0.15,
                    (s.mean - s.std).max(0.0),
                    s.mean,
                    s.mean + s.std,
                    BLACK.stroke_width(2),
                    8,
                ))
            }))
            .map_err(|e| err(&e))?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .draw()
        .map_err(|e| err(&e))?;

    root.present().map_err(|e| err(&e))?;
    info!("saved chart {}", path.display());
    Ok(())
}
