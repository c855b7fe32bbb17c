//! # ctf-recon - Reconnaissance Toolkit for CTF Targets
//!
//! ctf-recon drives three kinds of brute-force discovery through one
//! bounded-concurrency probing engine, plus a few collaborators around it.
//!
//! ## Features
//!
//! - **Port scanning**: TCP connect probes over a port range
//! - **Subdomain enumeration**: DNS resolution of `word.domain` candidates
//! - **Directory brute force**: HTTP `HEAD` probes of `base/word+ext` paths
//! - **WHOIS / geolocation**: registry lookups and ip-api.com data
//! - **Recon pipeline**: nmap and gobuster orchestration with a JSON summary
//! - **Scan history**: every report saved and retrievable by id prefix
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use ctf_recon::scanner::{run_scan, ScanConfig, ScanPlan};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ScanConfig::new("10.10.11.5", ScanPlan::Ports { start: 1, end: 1024 })
//!         .with_concurrency(100)
//!         .with_timeout(Duration::from_millis(500));
//!
//!     let report = run_scan(&config).await.unwrap();
//!     ctf_recon::output::render_table(&report, &mut std::io::stdout()).unwrap();
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`candidates`] - Wordlist loading and candidate expansion
//! - [`scanner`] - The probe trait, the three probes, the worker pool and scan drivers
//! - [`report`] - Aggregation of probe outcomes into a sorted report
//! - [`output`] - Table, JSON and CSV rendering
//! - [`recon`] - External tools, WHOIS and the recon pipeline
//! - [`config`] / [`storage`] - Settings and persisted history
//! - [`error`] - Error types and exit codes

pub mod banner;
pub mod candidates;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod recon;
pub mod report;
pub mod scanner;
pub mod services;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use error::{CliError, ConfigError, ProbeFailure, ReconError, ResolutionError};
pub use report::{Aggregator, Finding, ScanReport};
pub use scanner::{run_scan, Probe, ProbeOutcome, ScanConfig, ScanKind, ScanPlan, WorkerPool};
pub use types::{Port, PortRange, RunId, ScanTarget, TargetSpec};
