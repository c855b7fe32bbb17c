//! Scanner module - drives the three scan kinds through the worker pool.
//!
//! Each driver follows the same shape: expand the configuration into
//! candidates, resolve anything run-level, build the pool, probe every
//! candidate through [`WorkerPool`], and hand the outcomes to an
//! [`Aggregator`]. Run-level problems surface as [`ReconError`] before any
//! probe is issued.

pub mod dns;
pub mod http;
pub mod pool;
pub mod tcp;
pub mod traits;

use crate::candidates::{expand_paths, expand_ports, expand_subdomains, load_wordlist};
use crate::error::{ReconError, ReconResult};
use crate::report::{Aggregator, ScanReport};
use crate::services::PORT_SERVICES;
use crate::types::{normalize_base_url, normalize_domain, TargetSpec};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub use dns::{DnsProbe, HostResolver, ResolvedHost, SystemResolver};
pub use http::{HttpHeadProbe, PathHit, DEFAULT_USER_AGENT, HTTP_TIMEOUT, INTERESTING_STATUS};
pub use pool::WorkerPool;
pub use tcp::TcpConnectProbe;
pub use traits::{Probe, ProbeOutcome, ScanKind};

/// Timeout for resolving a port-scan target, independent of the probe timeout.
const TARGET_RESOLVE_TIMEOUT: Duration = Duration::from_secs(5);

/// Slack the pool grants on top of a probe's own timeout before cutting it off.
const PROBE_GRACE: Duration = Duration::from_secs(1);

/// Scan-kind-specific parameters.
#[derive(Debug, Clone)]
pub enum ScanPlan {
    /// Inclusive port window, validated when the scan starts.
    Ports { start: u32, end: u32 },
    Subdomains {
        wordlist: PathBuf,
    },
    Directories {
        wordlist: PathBuf,
        extensions: Vec<String>,
        user_agent: String,
        accept_invalid_certs: bool,
    },
}

impl ScanPlan {
    pub fn kind(&self) -> ScanKind {
        match self {
            Self::Ports { .. } => ScanKind::Ports,
            Self::Subdomains { .. } => ScanKind::Subdomains,
            Self::Directories { .. } => ScanKind::Directories,
        }
    }
}

/// Immutable parameters for one scan run.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Host, domain or base URL depending on the plan.
    pub target: String,
    /// Maximum number of probes in flight.
    pub concurrency: usize,
    /// Per-probe timeout.
    pub timeout: Duration,
    pub plan: ScanPlan,
    /// Draw a progress bar while probing.
    pub show_progress: bool,
}

impl ScanConfig {
    pub fn new(target: impl Into<String>, plan: ScanPlan) -> Self {
        Self {
            target: target.into(),
            concurrency: 50,
            timeout: Duration::from_secs(3),
            plan,
            show_progress: false,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_progress(mut self) -> Self {
        self.show_progress = true;
        self
    }

    pub fn kind(&self) -> ScanKind {
        self.plan.kind()
    }
}

/// Execute a complete scan with the system resolver.
pub async fn run_scan(config: &ScanConfig) -> ReconResult<ScanReport> {
    match &config.plan {
        ScanPlan::Ports { .. } => {
            let resolver = SystemResolver::new(TARGET_RESOLVE_TIMEOUT);
            scan_ports(config, &resolver).await
        }
        ScanPlan::Subdomains { wordlist } => {
            let resolver = SystemResolver::new(config.timeout);
            scan_subdomains(config, wordlist, resolver).await
        }
        ScanPlan::Directories {
            wordlist,
            extensions,
            user_agent,
            accept_invalid_certs,
        } => {
            scan_directories(config, wordlist, extensions, user_agent, *accept_invalid_certs)
                .await
        }
    }
}

/// TCP connect scan of the plan's port range on the configured target.
///
/// The target is resolved exactly once, before any connection is attempted.
pub async fn scan_ports(
    config: &ScanConfig,
    resolver: &dyn HostResolver,
) -> ReconResult<ScanReport> {
    let ScanPlan::Ports { start, end } = &config.plan else {
        return Err(ReconError::PlanMismatch {
            expected: ScanKind::Ports,
            found: config.kind(),
        });
    };
    let started_at = Utc::now();
    let candidates = expand_ports(*start, *end)?;
    let target = TargetSpec::parse(&config.target)?.resolve(resolver).await?;
    let pool = build_pool(config)?;
    info!(host = %target, ports = candidates.len(), "starting port scan");

    let probe = TcpConnectProbe::new(target.ip, config.timeout);
    let outcomes = execute(config, pool, probe, candidates).await;

    let mut aggregator = Aggregator::new(ScanKind::Ports, &config.target, Some(&PORT_SERVICES))
        .with_resolved(target.ip)
        .started_at(started_at);
    aggregator.absorb(outcomes);
    Ok(seal(aggregator))
}

/// Resolve `word.domain` for every word of the wordlist.
pub async fn scan_subdomains<R>(
    config: &ScanConfig,
    wordlist: &Path,
    resolver: R,
) -> ReconResult<ScanReport>
where
    R: HostResolver + 'static,
{
    let started_at = Utc::now();
    let domain = normalize_domain(&config.target)?;
    let words = load_wordlist(wordlist)?;
    let candidates = expand_subdomains(&words, &domain);
    let pool = build_pool(config)?;
    info!(domain = %domain, candidates = candidates.len(), "starting subdomain enumeration");

    let outcomes = execute(config, pool, DnsProbe::new(resolver), candidates).await;

    let mut aggregator = Aggregator::new(ScanKind::Subdomains, domain, None).started_at(started_at);
    aggregator.absorb(outcomes);
    Ok(seal(aggregator))
}

/// HEAD every `word + extension` path below the configured base URL.
pub async fn scan_directories(
    config: &ScanConfig,
    wordlist: &Path,
    extensions: &[String],
    user_agent: &str,
    accept_invalid_certs: bool,
) -> ReconResult<ScanReport> {
    let started_at = Utc::now();
    let base_url = normalize_base_url(&config.target)?;
    let words = load_wordlist(wordlist)?;
    let candidates = expand_paths(&words, extensions);
    let pool = build_pool(config)?;
    info!(
        base_url = %base_url,
        words = words.len(),
        extensions = extensions.len().max(1),
        candidates = candidates.len(),
        "starting directory brute force"
    );

    let probe = HttpHeadProbe::new(&base_url, config.timeout, user_agent, accept_invalid_certs)?;
    let outcomes = execute(config, pool, probe, candidates).await;

    let mut aggregator =
        Aggregator::new(ScanKind::Directories, base_url, Some(&INTERESTING_STATUS))
            .started_at(started_at);
    aggregator.absorb(outcomes);
    Ok(seal(aggregator))
}

fn build_pool(config: &ScanConfig) -> Result<WorkerPool, ReconError> {
    Ok(WorkerPool::new(config.concurrency)?.with_probe_timeout(config.timeout + PROBE_GRACE))
}

async fn execute<P>(
    config: &ScanConfig,
    pool: WorkerPool,
    probe: P,
    candidates: Vec<P::Candidate>,
) -> Vec<ProbeOutcome<P::Finding>>
where
    P: Probe + 'static,
{
    let progress = config
        .show_progress
        .then(|| progress_bar(candidates.len() as u64));
    let pool = match progress {
        Some(ref pb) => pool.with_progress(pb.clone()),
        None => pool,
    };

    debug!(
        workers = pool.concurrency().min(candidates.len()),
        candidates = candidates.len(),
        "dispatching probes"
    );
    let outcomes = pool.run(Arc::new(probe), candidates).await;

    if let Some(pb) = progress {
        pb.finish_with_message("Scan complete");
    }
    outcomes
}

fn seal(aggregator: Aggregator<'_>) -> ScanReport {
    let report = aggregator.finish();
    info!(
        kind = %report.kind,
        candidates = report.candidates,
        interesting = report.interesting,
        timeouts = report.failures.timeout,
        duration_ms = report.duration_ms,
        "scan finished"
    );
    report
}

fn progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    ) {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb
}
