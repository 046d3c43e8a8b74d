//! Dataset loading, validation and preprocessing.
//!
//! A dataset is a flat table of trial records persisted as CSV. Loading
//! validates column presence; preprocessing filters to successful rows and
//! derives the bandwidth-numeric and egress-bandwidth columns the analysis
//! pipeline consumes.

use std::fs::File;
use std::path::Path;

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::types::{parse_bandwidth_mbps, Architecture, TrialRecord, REQUIRED_COLUMNS};

/// A trial record augmented with the derived analysis columns.
#[derive(Debug, Clone)]
pub struct AnalysisRow {
    pub record: TrialRecord,
    /// Numeric presenter bandwidth parsed from the categorical label.
    pub bandwidth_mbps: f64,
    /// Estimated total egress bandwidth (Mbps).
    pub egress_bandwidth_mbps: f64,
}

impl AnalysisRow {
    /// Derive the analysis columns for one record.
    ///
    /// Returns `None` when the bandwidth label carries no parseable rate;
    /// such rows are dropped upstream with a warning.
    pub fn derive(record: TrialRecord) -> Option<Self> {
        let bandwidth_mbps = parse_bandwidth_mbps(&record.presenter_bandwidth)?;
        let egress_bandwidth_mbps = match record.architecture {
            Architecture::P2p => {
                record.presenter_bandwidth_usage * f64::from(record.num_viewers)
            }
            Architecture::Sfu => record.presenter_bandwidth_usage,
        };
        Some(Self {
            record,
            bandwidth_mbps,
            egress_bandwidth_mbps,
        })
    }
}

/// A preprocessed dataset: successful rows with derived columns.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub rows: Vec<AnalysisRow>,
}

impl Dataset {
    /// Build a dataset from raw records: keep successful rows, derive the
    /// analysis columns, drop rows that fail numeric derivation.
    pub fn from_records(records: Vec<TrialRecord>) -> Self {
        let total = records.len();
        let successful: Vec<TrialRecord> =
            records.into_iter().filter(|r| r.success).collect();
        info!(
            "found {} successful tests out of {} total",
            successful.len(),
            total
        );

        if successful.is_empty() {
            warn!("no successful tests found, all outputs will be empty");
        }

        let before = successful.len();
        let rows: Vec<AnalysisRow> = successful
            .into_iter()
            .filter_map(|record| {
                let bandwidth = record.presenter_bandwidth.clone();
                let row = AnalysisRow::derive(record);
                if row.is_none() {
                    warn!("dropping row with unparseable bandwidth {bandwidth:?}");
                }
                row
            })
            .collect();

        if rows.len() != before {
            warn!("removed {} rows with missing data", before - rows.len());
        }

        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Rows for one architecture.
    pub fn rows_for(&self, arch: Architecture) -> impl Iterator<Item = &AnalysisRow> {
        self.rows.iter().filter(move |r| r.record.architecture == arch)
    }
}

/// Load raw trial records from a CSV file.
///
/// Fatal when the file is missing or a required column is absent. Rows
/// that fail to deserialize (bad numeric fields) are dropped with a
/// warning rather than aborting the run.
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<TrialRecord>> {
    let path = path.as_ref();
    info!("loading data from {}", path.display());

    if !path.exists() {
        return Err(Error::InputNotFound(path.to_path_buf()));
    }

    let mut reader = csv::Reader::from_path(path)?;

    let headers = reader.headers()?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| (*col).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(Error::MissingColumns(missing));
    }

    let mut records = Vec::new();
    for (idx, result) in reader.deserialize::<TrialRecord>().enumerate() {
        match result {
            Ok(record) => records.push(record),
            Err(e) => warn!("dropping row {}: {e}", idx + 2),
        }
    }

    info!("loaded {} records", records.len());
    Ok(records)
}

/// Write trial records to a CSV file with the full column set.
pub fn write_records<P: AsRef<Path>>(path: P, records: &[TrialRecord]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    info!("wrote {} records to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(arch: Architecture, viewers: u32, bandwidth: &str, usage: f64) -> TrialRecord {
        TrialRecord {
            timestamp: "2026-08-29T12:00:00+00:00".into(),
            architecture: arch,
            num_viewers: viewers,
            packet_loss_rate: 0.0,
            presenter_bandwidth: bandwidth.into(),
            repetition: 1,
            presenter_cpu_avg: 20.0,
            presenter_cpu_max: 25.0,
            presenter_bandwidth_usage: usage,
            avg_latency_ms: 30.0,
            min_latency_ms: 24.0,
            max_latency_ms: 42.0,
            avg_jitter_ms: 6.0,
            text_legibility_score: 1.5,
            test_duration_ms: 15_000,
            success: true,
            error_message: String::new(),
        }
    }

    #[test]
    fn test_egress_derivation_p2p_multiplies_by_viewers() {
        let row = AnalysisRow::derive(record(Architecture::P2p, 5, "5mbit", 4.0)).unwrap();
        assert_eq!(row.egress_bandwidth_mbps, 20.0);
        assert_eq!(row.bandwidth_mbps, 5.0);
    }

    #[test]
    fn test_egress_derivation_sfu_is_single_stream() {
        let row = AnalysisRow::derive(record(Architecture::Sfu, 5, "5mbit", 4.0)).unwrap();
        assert_eq!(row.egress_bandwidth_mbps, 4.0);
    }

    #[test]
    fn test_single_viewer_p2p_egress_equals_usage() {
        let row = AnalysisRow::derive(record(Architecture::P2p, 1, "5mbit", 4.2)).unwrap();
        assert_eq!(row.egress_bandwidth_mbps, 4.2);
        assert_eq!(row.bandwidth_mbps, 5.0);
    }

    #[test]
    fn test_failed_rows_are_filtered() {
        let mut bad = record(Architecture::P2p, 1, "5mbit", 4.0);
        bad.success = false;
        bad.error_message = "browser crashed".into();
        let dataset =
            Dataset::from_records(vec![record(Architecture::Sfu, 2, "2mbit", 1.6), bad]);
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.rows[0].record.architecture, Architecture::Sfu);
    }

    #[test]
    fn test_unparseable_bandwidth_drops_row() {
        let dataset =
            Dataset::from_records(vec![record(Architecture::P2p, 1, "fast", 4.0)]);
        assert!(dataset.is_empty());
    }
}
