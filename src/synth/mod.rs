//! Synthetic Metric Generator
//!
//! Produces trial records from closed-form formulas with injected random
//! noise. Each metric is a deterministic function of the parameter tuple
//! {architecture, viewers, loss rate, bandwidth} plus Gaussian or uniform
//! noise, clamped to a plausible range. A seeded ChaCha8 RNG makes the
//! whole sweep reproducible.

use chrono::{DateTime, Duration, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use tracing::debug;

use crate::config::SweepConfig;
use crate::error::{Error, Result};
use crate::types::{parse_bandwidth_mbps, round2, Architecture, TrialRecord};

/// Raw metric bundle for one trial, before rounding.
#[derive(Debug, Clone, Copy)]
struct TrialMetrics {
    cpu_avg: f64,
    cpu_max: f64,
    bandwidth_usage: f64,
    latency_avg: f64,
    latency_min: f64,
    latency_max: f64,
    jitter_avg: f64,
    text_legibility: f64,
}

/// Synthetic trial generator for one sweep.
pub struct Generator {
    config: SweepConfig,
    rng: ChaCha8Rng,
    session_start: DateTime<Utc>,
}

impl Generator {
    pub fn new(config: SweepConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self {
            config,
            rng,
            session_start: Utc::now(),
        }
    }

    /// Pin the session start time (timestamps advance two minutes per trial).
    pub fn with_session_start(mut self, start: DateTime<Utc>) -> Self {
        self.session_start = start;
        self
    }

    /// Run the full sweep and return the generated records.
    ///
    /// `per_trial` is invoked once per record, e.g. to tick a progress bar
    /// or to run the system load sampler.
    pub fn generate_with<F>(&mut self, mut per_trial: F) -> Result<Vec<TrialRecord>>
    where
        F: FnMut(&TrialRecord) -> u64,
    {
        self.config.validate()?;

        let mut records = Vec::with_capacity(self.config.trial_count());
        let viewer_counts = self.config.viewer_counts.clone();
        let loss_rates = self.config.loss_rates.clone();
        let bandwidths = self.config.bandwidths.clone();
        let repetitions = self.config.repetitions;

        for arch in Architecture::ALL {
            for &viewers in &viewer_counts {
                for &loss_rate in &loss_rates {
                    for bandwidth in &bandwidths {
                        for rep in 1..=repetitions {
                            let mut record =
                                self.trial(arch, viewers, loss_rate, bandwidth, rep)?;
                            record.timestamp = (self.session_start
                                + Duration::minutes(2 * records.len() as i64))
                            .to_rfc3339();

                            let extra_duration_ms = per_trial(&record);
                            record.test_duration_ms += extra_duration_ms;

                            debug!(
                                arch = %arch,
                                viewers,
                                loss_rate,
                                bandwidth = %bandwidth,
                                cpu = record.presenter_cpu_avg,
                                "generated trial"
                            );
                            records.push(record);
                        }
                    }
                }
            }
        }

        Ok(records)
    }

    /// Run the full sweep without a per-trial callback.
    pub fn generate(&mut self) -> Result<Vec<TrialRecord>> {
        self.generate_with(|_| 0)
    }

    fn trial(
        &mut self,
        arch: Architecture,
        viewers: u32,
        loss_rate: f64,
        bandwidth: &str,
        repetition: u32,
    ) -> Result<TrialRecord> {
        let bw_mbps = parse_bandwidth_mbps(bandwidth).ok_or_else(|| {
            Error::InvalidConfig(format!("bandwidth label {bandwidth:?} is not parseable"))
        })?;

        let metrics = self.trial_metrics(arch, viewers, loss_rate, bw_mbps);

        Ok(TrialRecord {
            timestamp: String::new(), // filled in by the sweep loop
            architecture: arch,
            num_viewers: viewers,
            packet_loss_rate: loss_rate,
            presenter_bandwidth: bandwidth.to_string(),
            repetition,
            presenter_cpu_avg: round2(metrics.cpu_avg),
            presenter_cpu_max: round2(metrics.cpu_max),
            presenter_bandwidth_usage: round2(metrics.bandwidth_usage),
            avg_latency_ms: round2(metrics.latency_avg),
            min_latency_ms: round2(metrics.latency_min),
            max_latency_ms: round2(metrics.latency_max),
            avg_jitter_ms: round2(metrics.jitter_avg),
            text_legibility_score: round2(metrics.text_legibility),
            test_duration_ms: self.config.test_duration_ms,
            success: true,
            error_message: String::new(),
        })
    }

    /// Compute the metric bundle for one parameter tuple.
    fn trial_metrics(
        &mut self,
        arch: Architecture,
        viewers: u32,
        loss_rate: f64,
        bw_mbps: f64,
    ) -> TrialMetrics {
        let v = f64::from(viewers);

        // CPU: P2P scales linearly with viewers, SFU stays nearly flat.
        let (cpu_base, cpu_sigma) = match arch {
            Architecture::P2p => (15.0 + (v - 1.0) * 12.0, 3.0),
            Architecture::Sfu => (16.0 + (v - 1.0) * 0.3, 1.0),
        };
        let cpu_avg = cpu_base + loss_rate * 1.5 + self.normal(0.0, cpu_sigma);
        let cpu_max = cpu_avg * (1.2 + self.rng.gen_range(0.0..0.3));
        let cpu_avg = cpu_avg.clamp(5.0, 100.0);
        let cpu_max = cpu_max.clamp(cpu_avg, 100.0);

        // Bandwidth usage: P2P sends one stream per viewer, SFU sends one.
        let per_stream = bw_mbps * 0.8 + self.normal(0.0, 0.1);
        let bandwidth_usage = match arch {
            Architecture::P2p => per_stream * v,
            Architecture::Sfu => per_stream,
        }
        .max(0.1);

        // Latency: P2P starts lower but both degrade with packet loss.
        let latency_base = match arch {
            Architecture::P2p => 25.0 + v * 2.0,
            Architecture::Sfu => 35.0 + v * 1.0,
        };
        let latency_avg = (latency_base + loss_rate * 15.0 + self.normal(0.0, 3.0)).max(10.0);
        let latency_min =
            (latency_avg * 0.8 + self.normal(0.0, 1.0)).clamp(5.0, latency_avg * 0.9);
        let latency_max = (latency_avg * 1.4 + self.normal(0.0, 5.0)).max(latency_avg * 1.1);

        // Jitter: multiplicative factors over a 6ms base.
        let loss_factor = 1.0 + (loss_rate / 100.0) * 1.5;
        let viewer_factor = match arch {
            Architecture::P2p => 1.0 + (v - 1.0) * 0.15,
            Architecture::Sfu => 1.0 + (v - 1.0) * 0.08,
        };
        let bandwidth_factor = 6.0 / bw_mbps;
        let random_factor = self.rng.gen_range(0.8..1.2);
        let jitter_avg =
            (6.0 * loss_factor * viewer_factor * bandwidth_factor * random_factor).max(1.0);

        // Text legibility: additive degradation, lower is better.
        let viewer_impact = match arch {
            Architecture::P2p => (v - 1.0) * 1.5,
            Architecture::Sfu => (v - 1.0) * 0.5,
        };
        let bandwidth_impact = ((3.0 - bw_mbps) * 2.0).max(0.0);
        let text_legibility =
            (1.0 + loss_rate * 2.0 + viewer_impact + bandwidth_impact + self.normal(0.0, 0.5))
                .max(0.0);

        TrialMetrics {
            cpu_avg,
            cpu_max,
            bandwidth_usage,
            latency_avg,
            latency_min,
            latency_max,
            jitter_avg,
            text_legibility,
        }
    }

    fn normal(&mut self, mean: f64, sigma: f64) -> f64 {
        // Sigma is a positive constant in every call site.
        Normal::new(mean, sigma)
            .map(|d| d.sample(&mut self.rng))
            .unwrap_or(mean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_is_deterministic() {
        let a = Generator::new(SweepConfig::short()).generate().unwrap();
        let b = Generator::new(SweepConfig::short()).generate().unwrap();
        for (ra, rb) in a.iter().zip(&b) {
            assert_eq!(ra.presenter_cpu_avg, rb.presenter_cpu_avg);
            assert_eq!(ra.avg_jitter_ms, rb.avg_jitter_ms);
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let a = Generator::new(SweepConfig::short()).generate().unwrap();
        let mut config = SweepConfig::short();
        config.seed = 7;
        let b = Generator::new(config).generate().unwrap();
        assert!(a
            .iter()
            .zip(&b)
            .any(|(ra, rb)| ra.presenter_cpu_avg != rb.presenter_cpu_avg));
    }

    #[test]
    fn test_sweep_covers_grid() {
        let config = SweepConfig::full();
        let expected = config.trial_count();
        let records = Generator::new(config).generate().unwrap();
        assert_eq!(records.len(), expected);

        let p2p = records
            .iter()
            .filter(|r| r.architecture == Architecture::P2p)
            .count();
        assert_eq!(p2p, expected / 2);
    }

    #[test]
    fn test_per_trial_duration_is_added() {
        let records = Generator::new(SweepConfig::short())
            .generate_with(|_| 500)
            .unwrap();
        for record in &records {
            assert_eq!(record.test_duration_ms, 15_500);
        }
    }
}
