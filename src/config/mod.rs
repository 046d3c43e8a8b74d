//! Sweep configuration for Meshbench.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Parameter sweep configuration.
///
/// One trial is generated per combination of viewer count, packet loss
/// rate, bandwidth label and repetition, for each architecture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Viewer counts to sweep.
    #[serde(default = "default_viewer_counts")]
    pub viewer_counts: Vec<u32>,

    /// Packet loss rates to sweep (percent).
    #[serde(default = "default_loss_rates")]
    pub loss_rates: Vec<f64>,

    /// Presenter upload bandwidth labels to sweep (e.g. "5mbit").
    #[serde(default = "default_bandwidths")]
    pub bandwidths: Vec<String>,

    /// Repetitions per parameter combination.
    #[serde(default = "default_repetitions")]
    pub repetitions: u32,

    /// RNG seed for reproducible generation.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Nominal duration recorded per trial (ms).
    #[serde(default = "default_test_duration_ms")]
    pub test_duration_ms: u64,
}

fn default_viewer_counts() -> Vec<u32> {
    vec![1, 2, 5, 10]
}

fn default_loss_rates() -> Vec<f64> {
    vec![0.0, 1.0, 2.0, 5.0]
}

fn default_bandwidths() -> Vec<String> {
    vec!["5mbit".into(), "2mbit".into(), "1mbit".into()]
}

fn default_repetitions() -> u32 {
    5
}

fn default_seed() -> u64 {
    42
}

fn default_test_duration_ms() -> u64 {
    15_000
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self::full()
    }
}

impl SweepConfig {
    /// Full sweep: the comprehensive grid (480 trials).
    pub fn full() -> Self {
        Self {
            viewer_counts: default_viewer_counts(),
            loss_rates: default_loss_rates(),
            bandwidths: default_bandwidths(),
            repetitions: default_repetitions(),
            seed: default_seed(),
            test_duration_ms: default_test_duration_ms(),
        }
    }

    /// Short sweep: a quick smoke-test grid (8 trials).
    pub fn short() -> Self {
        Self {
            viewer_counts: vec![1, 2],
            loss_rates: vec![0.0, 1.0],
            bandwidths: vec!["5mbit".into()],
            repetitions: 1,
            ..Self::full()
        }
    }

    /// Production sweep: the full grid at reduced repetitions, used with
    /// the system load sampler.
    pub fn production() -> Self {
        Self {
            repetitions: 2,
            ..Self::full()
        }
    }

    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("failed to read config: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {e}")))?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| Error::Config(format!("failed to write config: {e}")))?;

        Ok(())
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.viewer_counts.is_empty() {
            return Err(Error::InvalidConfig("no viewer counts configured".into()));
        }
        if self.viewer_counts.contains(&0) {
            return Err(Error::InvalidConfig("viewer counts must be positive".into()));
        }
        if self.loss_rates.is_empty() {
            return Err(Error::InvalidConfig("no packet loss rates configured".into()));
        }
        if self.loss_rates.iter().any(|&l| !(0.0..=100.0).contains(&l)) {
            return Err(Error::InvalidConfig(
                "packet loss rates must be within [0, 100]".into(),
            ));
        }
        if self.bandwidths.is_empty() {
            return Err(Error::InvalidConfig("no bandwidths configured".into()));
        }
        for label in &self.bandwidths {
            if crate::types::parse_bandwidth_mbps(label).is_none() {
                return Err(Error::InvalidConfig(format!(
                    "bandwidth label {label:?} has no parseable Mbps rate"
                )));
            }
        }
        if self.repetitions == 0 {
            return Err(Error::InvalidConfig("repetitions must be positive".into()));
        }
        Ok(())
    }

    /// Total number of trials this sweep will produce (both architectures).
    pub fn trial_count(&self) -> usize {
        2 * self.viewer_counts.len()
            * self.loss_rates.len()
            * self.bandwidths.len()
            * self.repetitions as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_sweep_size() {
        assert_eq!(SweepConfig::full().trial_count(), 480);
    }

    #[test]
    fn test_short_sweep_size() {
        assert_eq!(SweepConfig::short().trial_count(), 8);
    }

    #[test]
    fn test_validate_rejects_empty_dimensions() {
        let mut config = SweepConfig::full();
        config.viewer_counts.clear();
        assert!(config.validate().is_err());

        let mut config = SweepConfig::full();
        config.repetitions = 0;
        assert!(config.validate().is_err());

        let mut config = SweepConfig::full();
        config.bandwidths = vec!["mbit".into()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = SweepConfig::full();
        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: SweepConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.viewer_counts, config.viewer_counts);
        assert_eq!(parsed.seed, config.seed);
    }
}
