//! System Load Sampler
//!
//! Perturbs the host with a handful of short-lived subprocesses (ping
//! floods and a dd burst) while a collector thread samples ambient CPU
//! utilization from /proc/stat. The samples are informational only: they
//! are logged as the session baseline and the measured wall time is folded
//! into the trial duration, but they never overwrite the formula-derived
//! metrics.

use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::types::Architecture;

/// Ambient measurements taken while the load ran.
#[derive(Debug, Clone, Default)]
pub struct LoadSample {
    /// Per-second CPU utilization samples (percent). Empty on platforms
    /// without /proc.
    pub cpu_samples: Vec<f64>,
    /// Wall time the load simulation actually took.
    pub wall_ms: u64,
}

impl LoadSample {
    pub fn cpu_avg(&self) -> Option<f64> {
        if self.cpu_samples.is_empty() {
            None
        } else {
            Some(self.cpu_samples.iter().sum::<f64>() / self.cpu_samples.len() as f64)
        }
    }

    pub fn cpu_max(&self) -> Option<f64> {
        self.cpu_samples
            .iter()
            .copied()
            .fold(None, |acc, x| Some(acc.map_or(x, |a: f64| a.max(x))))
    }
}

/// Configuration for one load run.
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// How long to sustain the load.
    pub duration: Duration,
    /// Ping target used to create network activity.
    pub ping_target: String,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(3),
            ping_target: "8.8.8.8".to_string(),
        }
    }
}

/// Run the load simulation for one trial and sample ambient CPU.
///
/// P2P spawns one ping per viewer (capped at four); SFU spawns a single
/// ping regardless of viewers. A dd burst adds CPU load. Missing binaries
/// are tolerated; the sample set is simply smaller.
pub fn run(arch: Architecture, viewers: u32, config: &LoadConfig) -> LoadSample {
    let start = Instant::now();
    let seconds = config.duration.as_secs().max(1);

    let collector = thread::spawn(move || collect_cpu_samples(seconds));

    let mut children = spawn_load(arch, viewers, config);

    thread::sleep(config.duration);

    for child in &mut children {
        let _ = child.kill();
        let _ = child.wait();
    }

    // Collector is joined before its samples are used anywhere.
    let cpu_samples = collector.join().unwrap_or_default();

    let sample = LoadSample {
        cpu_samples,
        wall_ms: start.elapsed().as_millis() as u64,
    };
    debug!(
        arch = %arch,
        viewers,
        cpu_avg = ?sample.cpu_avg(),
        wall_ms = sample.wall_ms,
        "load simulation finished"
    );
    sample
}

fn spawn_load(arch: Architecture, viewers: u32, config: &LoadConfig) -> Vec<Child> {
    let mut children = Vec::new();

    let ping_count = match arch {
        Architecture::P2p => viewers.min(4),
        Architecture::Sfu => 1,
    };

    for _ in 0..ping_count {
        match Command::new("ping")
            .args(["-i", "0.2", "-s", "1024", &config.ping_target])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => children.push(child),
            Err(e) => warn!("failed to spawn ping: {e}"),
        }
    }

    match Command::new("dd")
        .args(["if=/dev/zero", "of=/dev/null", "bs=1M", "count=512"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(child) => children.push(child),
        Err(e) => warn!("failed to spawn dd: {e}"),
    }

    children
}

/// Sample aggregate CPU utilization once a second for `seconds`.
fn collect_cpu_samples(seconds: u64) -> Vec<f64> {
    let mut samples = Vec::with_capacity(seconds as usize);
    let Some(mut prev) = read_cpu_times() else {
        return samples;
    };

    for _ in 0..seconds {
        thread::sleep(Duration::from_secs(1));
        let Some(next) = read_cpu_times() else {
            break;
        };
        let total = next.total.saturating_sub(prev.total);
        let idle = next.idle.saturating_sub(prev.idle);
        if total > 0 {
            let busy = total.saturating_sub(idle) as f64 / total as f64;
            samples.push(busy * 100.0);
        }
        prev = next;
    }

    samples
}

#[derive(Debug, Clone, Copy)]
struct CpuTimes {
    idle: u64,
    total: u64,
}

/// Parse the aggregate "cpu" line of /proc/stat.
fn read_cpu_times() -> Option<CpuTimes> {
    let stat = std::fs::read_to_string("/proc/stat").ok()?;
    let line = stat.lines().next()?;
    let fields: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .filter_map(|f| f.parse().ok())
        .collect();
    if fields.len() < 4 {
        return None;
    }

    // user nice system idle iowait irq softirq steal ...
    let idle = fields[3] + fields.get(4).copied().unwrap_or(0);
    let total = fields.iter().sum();
    Some(CpuTimes { idle, total })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_sample_stats() {
        let sample = LoadSample {
            cpu_samples: vec![10.0, 30.0, 20.0],
            wall_ms: 3000,
        };
        assert_eq!(sample.cpu_avg(), Some(20.0));
        assert_eq!(sample.cpu_max(), Some(30.0));

        let empty = LoadSample::default();
        assert_eq!(empty.cpu_avg(), None);
        assert_eq!(empty.cpu_max(), None);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_read_cpu_times_on_linux() {
        let times = read_cpu_times().expect("proc stat should parse");
        assert!(times.total >= times.idle);
    }
}
