//! Probe trait abstraction.
//!
//! Defines the common contract for all probe implementations, enabling
//! the worker pool to stay generic over what is being probed.

use crate::error::ProbeFailure;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three kinds of scan the engine drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanKind {
    /// TCP connect scan over a port range.
    Ports,
    /// DNS brute force of `word.domain` names.
    Subdomains,
    /// HTTP HEAD brute force of `base_url/word+ext` paths.
    Directories,
}

impl fmt::Display for ScanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ports => write!(f, "Port Scan"),
            Self::Subdomains => write!(f, "Subdomain Enumeration"),
            Self::Directories => write!(f, "Directory Brute Force"),
        }
    }
}

/// Result of probing one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome<T> {
    /// The candidate is worth reporting.
    Interesting(T),
    /// The candidate is not worth reporting, and why.
    NotInteresting(ProbeFailure),
}

impl<T> ProbeOutcome<T> {
    pub fn is_interesting(&self) -> bool {
        matches!(self, Self::Interesting(_))
    }

    /// The failure reason, if this outcome is not interesting.
    pub fn failure(&self) -> Option<&ProbeFailure> {
        match self {
            Self::Interesting(_) => None,
            Self::NotInteresting(reason) => Some(reason),
        }
    }

    pub fn into_interesting(self) -> Option<T> {
        match self {
            Self::Interesting(finding) => Some(finding),
            Self::NotInteresting(_) => None,
        }
    }
}

/// A unit of work mapping one candidate to one outcome.
///
/// Implementations must not mutate shared state and must bound their own
/// I/O with a timeout. Every failure is reported as
/// [`ProbeOutcome::NotInteresting`]; probes never return errors.
///
/// # Example
///
/// ```ignore
/// use ctf_recon::scanner::{Probe, ProbeOutcome};
///
/// async fn check<P: Probe>(probe: &P, candidate: &P::Candidate) -> bool {
///     probe.probe(candidate).await.is_interesting()
/// }
/// ```
#[async_trait]
pub trait Probe: Send + Sync {
    /// What is being probed (a port, a hostname, a path).
    type Candidate: Send + Sync + 'static;
    /// What an interesting probe reports.
    type Finding: Send + 'static;

    /// The scan kind this probe implements.
    fn kind(&self) -> ScanKind;

    /// Probe a single candidate.
    async fn probe(&self, candidate: &Self::Candidate) -> ProbeOutcome<Self::Finding>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_kind_display() {
        assert_eq!(ScanKind::Ports.to_string(), "Port Scan");
        assert_eq!(ScanKind::Subdomains.to_string(), "Subdomain Enumeration");
        assert_eq!(ScanKind::Directories.to_string(), "Directory Brute Force");
    }

    #[test]
    fn test_outcome_accessors() {
        let hit: ProbeOutcome<u16> = ProbeOutcome::Interesting(80);
        assert!(hit.is_interesting());
        assert_eq!(hit.failure(), None);
        assert_eq!(hit.into_interesting(), Some(80));

        let miss: ProbeOutcome<u16> = ProbeOutcome::NotInteresting(ProbeFailure::Refused);
        assert!(!miss.is_interesting());
        assert_eq!(miss.failure(), Some(&ProbeFailure::Refused));
        assert_eq!(miss.into_interesting(), None);
    }
}
