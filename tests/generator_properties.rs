//! Generator Property Tests
//!
//! Every generated trial must respect the documented metric bounds, and
//! the sweep must be reproducible from its seed.

use meshbench::config::SweepConfig;
use meshbench::synth::Generator;
use meshbench::types::{parse_bandwidth_mbps, Architecture};

#[test]
fn generated_metrics_stay_within_bounds() {
    let records = Generator::new(SweepConfig::full()).generate().unwrap();
    assert_eq!(records.len(), 480);

    for record in &records {
        assert!(
            Architecture::ALL.contains(&record.architecture),
            "unexpected architecture"
        );

        assert!((0.0..=100.0).contains(&record.presenter_cpu_avg));
        assert!((0.0..=100.0).contains(&record.presenter_cpu_max));
        assert!(record.presenter_cpu_max >= record.presenter_cpu_avg);

        assert!(record.presenter_bandwidth_usage > 0.0);

        assert!(record.avg_latency_ms >= 10.0);
        assert!(record.min_latency_ms <= record.avg_latency_ms);
        assert!(record.max_latency_ms >= record.avg_latency_ms);

        assert!(record.avg_jitter_ms >= 1.0);
        assert!(record.text_legibility_score >= 0.0);

        assert!(record.num_viewers >= 1);
        assert!(record.repetition >= 1);
        assert!(record.success);
        assert!(record.error_message.is_empty());
        assert!(parse_bandwidth_mbps(&record.presenter_bandwidth).is_some());
    }
}

#[test]
fn sweep_is_reproducible_from_seed() {
    let a = Generator::new(SweepConfig::full()).generate().unwrap();
    let b = Generator::new(SweepConfig::full()).generate().unwrap();

    assert_eq!(a.len(), b.len());
    for (ra, rb) in a.iter().zip(&b) {
        assert_eq!(ra.architecture, rb.architecture);
        assert_eq!(ra.presenter_cpu_avg, rb.presenter_cpu_avg);
        assert_eq!(ra.avg_latency_ms, rb.avg_latency_ms);
        assert_eq!(ra.avg_jitter_ms, rb.avg_jitter_ms);
        assert_eq!(ra.text_legibility_score, rb.text_legibility_score);
    }
}

#[test]
fn p2p_cpu_scales_with_viewers_while_sfu_stays_flat() {
    let records = Generator::new(SweepConfig::full()).generate().unwrap();

    let mean_cpu = |arch: Architecture, viewers: u32| {
        let values: Vec<f64> = records
            .iter()
            .filter(|r| r.architecture == arch && r.num_viewers == viewers)
            .map(|r| r.presenter_cpu_avg)
            .collect();
        values.iter().sum::<f64>() / values.len() as f64
    };

    // P2P base is 15 + 12 per extra viewer; noise sigma is 3, so the gap
    // between 1 and 10 viewers (108 CPU points, clamped at 100) dwarfs it.
    assert!(mean_cpu(Architecture::P2p, 10) > mean_cpu(Architecture::P2p, 1) + 40.0);

    // SFU scales at 0.3 per extra viewer.
    let sfu_gap = mean_cpu(Architecture::Sfu, 10) - mean_cpu(Architecture::Sfu, 1);
    assert!(sfu_gap.abs() < 5.0);
}

#[test]
fn lower_bandwidth_degrades_legibility() {
    let records = Generator::new(SweepConfig::full()).generate().unwrap();

    let mean_tls = |bandwidth: &str| {
        let values: Vec<f64> = records
            .iter()
            .filter(|r| r.presenter_bandwidth == bandwidth)
            .map(|r| r.text_legibility_score)
            .collect();
        values.iter().sum::<f64>() / values.len() as f64
    };

    // Lower score is better; 1mbit carries a +4 impact over 5mbit.
    assert!(mean_tls("1mbit") > mean_tls("5mbit") + 2.0);
}
