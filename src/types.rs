//! Core data types for Meshbench.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Conferencing architecture under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Architecture {
    /// Peer-to-peer mesh: the presenter streams directly to each viewer.
    #[serde(rename = "P2P")]
    P2p,
    /// Selective forwarding unit: the presenter streams once to a relay server.
    #[serde(rename = "SFU")]
    Sfu,
}

impl Architecture {
    /// All architectures, in report order.
    pub const ALL: [Self; 2] = [Self::P2p, Self::Sfu];

    /// CSV label for this architecture.
    pub fn label(self) -> &'static str {
        match self {
            Self::P2p => "P2P",
            Self::Sfu => "SFU",
        }
    }

    /// Human-readable name used in chart legends.
    pub fn legend(self) -> &'static str {
        match self {
            Self::P2p => "P2P Mesh",
            Self::Sfu => "SFU",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Architecture {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "P2P" => Ok(Self::P2p),
            "SFU" => Ok(Self::Sfu),
            other => Err(format!("unknown architecture: {other}")),
        }
    }
}

/// A single trial record: one row per simulated test run.
///
/// Field names map onto the CSV column set via serde renames; the column
/// order below is the on-disk order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    #[serde(rename = "Timestamp")]
    pub timestamp: String,

    #[serde(rename = "Architecture")]
    pub architecture: Architecture,

    #[serde(rename = "Num_Viewers")]
    pub num_viewers: u32,

    #[serde(rename = "Packet_Loss_Rate")]
    pub packet_loss_rate: f64,

    #[serde(rename = "Presenter_Bandwidth")]
    pub presenter_bandwidth: String,

    #[serde(rename = "Repetition")]
    pub repetition: u32,

    #[serde(rename = "Presenter_CPU_Avg")]
    pub presenter_cpu_avg: f64,

    #[serde(rename = "Presenter_CPU_Max")]
    pub presenter_cpu_max: f64,

    #[serde(rename = "Presenter_Bandwidth_Usage")]
    pub presenter_bandwidth_usage: f64,

    #[serde(rename = "Avg_Latency_Ms")]
    pub avg_latency_ms: f64,

    #[serde(rename = "Min_Latency_Ms")]
    pub min_latency_ms: f64,

    #[serde(rename = "Max_Latency_Ms")]
    pub max_latency_ms: f64,

    #[serde(rename = "Avg_Jitter_Ms")]
    pub avg_jitter_ms: f64,

    #[serde(rename = "Text_Legibility_Score")]
    pub text_legibility_score: f64,

    #[serde(rename = "Test_Duration_Ms")]
    pub test_duration_ms: u64,

    #[serde(rename = "Success", deserialize_with = "bool_from_csv")]
    pub success: bool,

    #[serde(rename = "Error_Message")]
    pub error_message: String,
}

/// Accept booleans in any case (`true`, `True`, `TRUE`) plus `1`/`0`.
/// Result files written by pandas-based tooling capitalize them.
fn bool_from_csv<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(serde::de::Error::custom(format!("invalid boolean: {raw:?}"))),
    }
}

/// Columns that must be present for the analysis pipeline to run.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "Architecture",
    "Num_Viewers",
    "Packet_Loss_Rate",
    "Presenter_Bandwidth",
    "Presenter_CPU_Avg",
    "Avg_Latency_Ms",
    "Text_Legibility_Score",
    "Success",
];

/// Parse the numeric rate out of a bandwidth label ("5mbit" -> 5.0).
///
/// Returns `None` when the label carries no leading digits or parses to
/// zero, so callers never divide by a zero bandwidth.
pub fn parse_bandwidth_mbps(label: &str) -> Option<f64> {
    let digits: String = label.chars().take_while(char::is_ascii_digit).collect();
    let value: f64 = digits.parse().ok()?;
    if value > 0.0 {
        Some(value)
    } else {
        None
    }
}

/// Round to two decimal places, the precision persisted in result CSVs.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_architecture_labels_round_trip() {
        for arch in Architecture::ALL {
            assert_eq!(arch.label().parse::<Architecture>().unwrap(), arch);
        }
    }

    #[test]
    fn test_parse_bandwidth_labels() {
        assert_eq!(parse_bandwidth_mbps("5mbit"), Some(5.0));
        assert_eq!(parse_bandwidth_mbps("2mbit"), Some(2.0));
        assert_eq!(parse_bandwidth_mbps("1mbit"), Some(1.0));
        assert_eq!(parse_bandwidth_mbps("10mbit"), Some(10.0));
    }

    #[test]
    fn test_parse_bandwidth_rejects_garbage() {
        assert_eq!(parse_bandwidth_mbps("mbit"), None);
        assert_eq!(parse_bandwidth_mbps(""), None);
        assert_eq!(parse_bandwidth_mbps("0mbit"), None);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.239), 1.24);
        assert_eq!(round2(33.333333), 33.33);
    }
}
