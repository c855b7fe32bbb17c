//! Result aggregation.
//!
//! The [`Aggregator`] reduces the pool's outcome vector to the interesting
//! subset, classifies every hit through the lookup table it was given,
//! tallies failure reasons, and produces a sorted [`ScanReport`].

use crate::error::ProbeFailure;
use crate::scanner::dns::ResolvedHost;
use crate::scanner::http::PathHit;
use crate::scanner::traits::{ProbeOutcome, ScanKind};
use crate::services::LookupTable;
use crate::types::{Port, RunId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Raw interesting result, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hit {
    OpenPort(Port),
    Path(PathHit),
    Host(ResolvedHost),
}

impl From<Port> for Hit {
    fn from(port: Port) -> Self {
        Self::OpenPort(port)
    }
}

impl From<PathHit> for Hit {
    fn from(hit: PathHit) -> Self {
        Self::Path(hit)
    }
}

impl From<ResolvedHost> for Hit {
    fn from(host: ResolvedHost) -> Self {
        Self::Host(host)
    }
}

/// A classified row of the final report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Finding {
    Port {
        port: Port,
        service: String,
        state: String,
    },
    Path {
        status: u16,
        meaning: String,
        url: String,
    },
    Subdomain {
        subdomain: String,
        ip: IpAddr,
    },
}

/// State reported for every open port.
pub const OPEN_STATE: &str = "OPEN";

/// Per-reason counts of uninteresting outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureTally {
    pub timeout: usize,
    pub refused: usize,
    pub unreachable: usize,
    pub transport: usize,
    pub uninteresting_status: usize,
    pub unresolved: usize,
    pub panicked: usize,
    pub aborted: usize,
}

impl FailureTally {
    pub fn record(&mut self, failure: &ProbeFailure) {
        match failure {
            ProbeFailure::Timeout => self.timeout += 1,
            ProbeFailure::Refused => self.refused += 1,
            ProbeFailure::Unreachable => self.unreachable += 1,
            ProbeFailure::Transport(_) => self.transport += 1,
            ProbeFailure::UninterestingStatus(_) => self.uninteresting_status += 1,
            ProbeFailure::Unresolved => self.unresolved += 1,
            ProbeFailure::Panicked => self.panicked += 1,
            ProbeFailure::Aborted => self.aborted += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.timeout
            + self.refused
            + self.unreachable
            + self.transport
            + self.uninteresting_status
            + self.unresolved
            + self.panicked
            + self.aborted
    }
}

/// Final state of one scan run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub id: RunId,
    pub kind: ScanKind,
    /// Target as given (host, domain or base URL).
    pub target: String,
    /// Address the target resolved to, for port scans.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<IpAddr>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// Number of candidates probed.
    pub candidates: usize,
    /// Number of interesting results; always `findings.len()`.
    pub interesting: usize,
    pub failures: FailureTally,
    pub findings: Vec<Finding>,
}

impl ScanReport {
    /// One-line summary used by history listings.
    pub fn summary(&self) -> String {
        format!(
            "{} {} - {}/{} interesting [{:.2}s]",
            self.kind,
            self.target,
            self.interesting,
            self.candidates,
            self.duration_ms as f64 / 1000.0
        )
    }
}

/// Builds a [`ScanReport`] from pool outcomes.
pub struct Aggregator<'a> {
    kind: ScanKind,
    target: String,
    resolved: Option<IpAddr>,
    table: Option<&'a LookupTable>,
    started_at: DateTime<Utc>,
    candidates: usize,
    hits: Vec<Hit>,
    failures: FailureTally,
}

impl<'a> Aggregator<'a> {
    /// Start aggregating a run. `table` classifies port or status hits.
    pub fn new(kind: ScanKind, target: impl Into<String>, table: Option<&'a LookupTable>) -> Self {
        Self {
            kind,
            target: target.into(),
            resolved: None,
            table,
            started_at: Utc::now(),
            candidates: 0,
            hits: Vec::new(),
            failures: FailureTally::default(),
        }
    }

    /// Record the address a port-scan target resolved to.
    pub fn with_resolved(mut self, ip: IpAddr) -> Self {
        self.resolved = Some(ip);
        self
    }

    /// Override the run start time.
    pub fn started_at(mut self, at: DateTime<Utc>) -> Self {
        self.started_at = at;
        self
    }

    /// Account for a batch of outcomes, in candidate order.
    pub fn absorb<F: Into<Hit>>(&mut self, outcomes: Vec<ProbeOutcome<F>>) {
        self.candidates += outcomes.len();
        for outcome in outcomes {
            match outcome {
                ProbeOutcome::Interesting(hit) => self.hits.push(hit.into()),
                ProbeOutcome::NotInteresting(reason) => self.failures.record(&reason),
            }
        }
    }

    /// Running count of interesting outcomes.
    pub fn interesting(&self) -> usize {
        self.hits.len()
    }

    fn label(&self, key: u16) -> String {
        self.table
            .map_or("?", |table| table.label(key))
            .to_string()
    }

    fn classify(&self, hit: Hit) -> Finding {
        match hit {
            Hit::OpenPort(port) => Finding::Port {
                port,
                service: self.label(port.as_u16()),
                state: OPEN_STATE.to_string(),
            },
            Hit::Path(PathHit { url, status }) => Finding::Path {
                status,
                meaning: self.label(status),
                url,
            },
            Hit::Host(ResolvedHost { subdomain, ip }) => Finding::Subdomain { subdomain, ip },
        }
    }

    /// Classify, sort and seal the report.
    ///
    /// Ports sort ascending, subdomains lexicographically; paths keep
    /// submission order.
    pub fn finish(mut self) -> ScanReport {
        let hits = std::mem::take(&mut self.hits);
        let mut findings: Vec<Finding> = hits.into_iter().map(|hit| self.classify(hit)).collect();
        sort_findings(self.kind, &mut findings);

        let completed_at = Utc::now();
        let duration_ms = (completed_at - self.started_at)
            .num_milliseconds()
            .max(0) as u64;

        ScanReport {
            id: RunId::new(),
            kind: self.kind,
            target: self.target,
            resolved: self.resolved,
            started_at: self.started_at,
            completed_at,
            duration_ms,
            candidates: self.candidates,
            interesting: findings.len(),
            failures: self.failures,
            findings,
        }
    }
}

fn sort_findings(kind: ScanKind, findings: &mut [Finding]) {
    match kind {
        ScanKind::Ports => findings.sort_by_key(|f| match f {
            Finding::Port { port, .. } => Some(*port),
            _ => None,
        }),
        ScanKind::Subdomains => findings.sort_by(|a, b| match (a, b) {
            (
                Finding::Subdomain { subdomain: sa, ip: ia },
                Finding::Subdomain { subdomain: sb, ip: ib },
            ) => sa.cmp(sb).then(ia.cmp(ib)),
            _ => std::cmp::Ordering::Equal,
        }),
        ScanKind::Directories => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::http::INTERESTING_STATUS;
    use crate::services::PORT_SERVICES;

    fn port(n: u16) -> Port {
        Port::new(n).unwrap()
    }

    #[test]
    fn test_ports_sorted_and_classified() {
        let mut agg = Aggregator::new(ScanKind::Ports, "10.0.0.1", Some(&PORT_SERVICES));
        agg.absorb(vec![
            ProbeOutcome::Interesting(port(443)),
            ProbeOutcome::NotInteresting(ProbeFailure::Refused),
            ProbeOutcome::Interesting(port(22)),
            ProbeOutcome::Interesting(port(31337)),
            ProbeOutcome::NotInteresting(ProbeFailure::Timeout),
        ]);
        assert_eq!(agg.interesting(), 3);

        let report = agg.finish();
        assert_eq!(report.candidates, 5);
        assert_eq!(report.interesting, 3);
        assert_eq!(report.failures.refused, 1);
        assert_eq!(report.failures.timeout, 1);
        assert_eq!(report.failures.total(), 2);

        let rows: Vec<(u16, &str)> = report
            .findings
            .iter()
            .map(|f| match f {
                Finding::Port { port, service, state } => {
                    assert_eq!(state, OPEN_STATE);
                    (port.as_u16(), service.as_str())
                }
                other => panic!("unexpected finding {:?}", other),
            })
            .collect();
        assert_eq!(rows, vec![(22, "SSH"), (443, "HTTPS"), (31337, "Unknown")]);
    }

    #[test]
    fn test_paths_keep_submission_order() {
        let mut agg = Aggregator::new(
            ScanKind::Directories,
            "http://box.htb",
            Some(&INTERESTING_STATUS),
        );
        agg.absorb(vec![
            ProbeOutcome::Interesting(PathHit {
                url: "http://box.htb/zeta".to_string(),
                status: 200,
            }),
            ProbeOutcome::NotInteresting(ProbeFailure::UninterestingStatus(404)),
            ProbeOutcome::Interesting(PathHit {
                url: "http://box.htb/alpha".to_string(),
                status: 403,
            }),
        ]);

        let report = agg.finish();
        let urls: Vec<&str> = report
            .findings
            .iter()
            .map(|f| match f {
                Finding::Path { url, .. } => url.as_str(),
                other => panic!("unexpected finding {:?}", other),
            })
            .collect();
        assert_eq!(urls, vec!["http://box.htb/zeta", "http://box.htb/alpha"]);
        assert_eq!(
            report.findings[1],
            Finding::Path {
                status: 403,
                meaning: "Forbidden".to_string(),
                url: "http://box.htb/alpha".to_string(),
            }
        );
        assert_eq!(report.failures.uninteresting_status, 1);
    }

    #[test]
    fn test_subdomains_sorted_lexicographically() {
        let ip: IpAddr = "10.0.0.9".parse().unwrap();
        let mut agg = Aggregator::new(ScanKind::Subdomains, "example.com", None);
        agg.absorb(vec![
            ProbeOutcome::Interesting(ResolvedHost {
                subdomain: "www.example.com".to_string(),
                ip,
            }),
            ProbeOutcome::Interesting(ResolvedHost {
                subdomain: "api.example.com".to_string(),
                ip,
            }),
            ProbeOutcome::NotInteresting(ProbeFailure::Unresolved),
        ]);

        let report = agg.finish();
        assert_eq!(
            report.findings,
            vec![
                Finding::Subdomain {
                    subdomain: "api.example.com".to_string(),
                    ip,
                },
                Finding::Subdomain {
                    subdomain: "www.example.com".to_string(),
                    ip,
                },
            ]
        );
    }

    #[test]
    fn test_report_serialization() {
        let mut agg = Aggregator::new(ScanKind::Ports, "box.htb", Some(&PORT_SERVICES))
            .with_resolved("10.10.11.5".parse().unwrap());
        agg.absorb(vec![ProbeOutcome::Interesting(port(80))]);
        let report = agg.finish();

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"type\":\"port\""));
        let parsed: ScanReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.findings, report.findings);
        assert_eq!(parsed.resolved, report.resolved);
        assert_eq!(parsed.id, report.id);
    }
}
