//! # Meshbench
//!
//! Synthetic performance benchmarking for video-conferencing
//! architectures: peer-to-peer mesh vs selective forwarding unit.
//!
//! There is no real measurement pipeline here. Every trial result comes
//! from closed-form formulas with injected random noise, which makes the
//! datasets reproducible and the expected architecture trade-offs
//! (P2P scales cost linearly with viewers, SFU stays flat) visible in the
//! analysis output.
//!
//! ## Pipeline
//!
//! ┌──────────────┐    ┌─────────────┐    ┌──────────────┐    ┌─────────┐
//! │ synth        │───▶│ results.csv │───▶│ dataset      │───▶│ analysis│
//! │ (formula set)│    │ (flat table)│    │ (validate,   │    │ t-tests │
//! └──────────────┘    └─────────────┘    │  derive)     │    │ grouping│
//!                                        └──────────────┘    └────┬────┘
//!                                                       ┌─────────┴────────┐
//!                                                       ▼                  ▼
//!                                                   charts (PNG)    report (CSV, console)

pub mod analysis;
pub mod charts;
pub mod config;
pub mod dataset;
pub mod error;
pub mod report;
pub mod synth;
pub mod sysload;
pub mod types;

pub mod cli;

pub use config::SweepConfig;
pub use error::{Error, Result};
pub use types::{Architecture, TrialRecord};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
