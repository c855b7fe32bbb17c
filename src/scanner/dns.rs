//! DNS resolution probe for subdomain enumeration.
//!
//! Resolution goes through the [`HostResolver`] trait so the probe can run
//! against the system resolver in production and a stub in tests. Any
//! resolution problem, not only NXDOMAIN, is treated as "not interesting".

use crate::error::ProbeFailure;
use crate::scanner::traits::{Probe, ProbeOutcome, ScanKind};
use crate::types::preferred_address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::error::ResolveErrorKind;
use trust_dns_resolver::system_conf::read_system_conf;
use trust_dns_resolver::TokioAsyncResolver;

/// Forward name resolution.
#[async_trait]
pub trait HostResolver: Send + Sync {
    /// Resolve `host` to its addresses.
    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, ProbeFailure>;
}

#[async_trait]
impl<R: HostResolver + ?Sized> HostResolver for Arc<R> {
    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, ProbeFailure> {
        (**self).resolve(host).await
    }
}

/// Resolver backed by trust-dns using the host's resolver configuration.
pub struct SystemResolver {
    inner: TokioAsyncResolver,
}

impl SystemResolver {
    /// Build a resolver that makes a single attempt per name within `timeout`.
    ///
    /// Falls back to the default upstream configuration when the system
    /// configuration cannot be read.
    pub fn new(timeout: Duration) -> Self {
        let (config, mut opts) = read_system_conf().unwrap_or_else(|e| {
            debug!(error = %e, "system resolver config unavailable, using defaults");
            (ResolverConfig::default(), ResolverOpts::default())
        });
        opts.timeout = timeout;
        opts.attempts = 1;

        Self {
            inner: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

#[async_trait]
impl HostResolver for SystemResolver {
    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, ProbeFailure> {
        match self.inner.lookup_ip(host).await {
            Ok(lookup) => Ok(lookup.iter().collect()),
            Err(e) => Err(match e.kind() {
                ResolveErrorKind::NoRecordsFound { .. } => ProbeFailure::Unresolved,
                ResolveErrorKind::Timeout => ProbeFailure::Timeout,
                _ => ProbeFailure::Transport(e.to_string()),
            }),
        }
    }
}

/// A subdomain that resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedHost {
    pub subdomain: String,
    pub ip: IpAddr,
}

/// Probe that resolves full `word.domain` candidates.
pub struct DnsProbe<R> {
    resolver: R,
}

impl<R: HostResolver> DnsProbe<R> {
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl<R: HostResolver + 'static> Probe for DnsProbe<R> {
    type Candidate = String;
    type Finding = ResolvedHost;

    fn kind(&self) -> ScanKind {
        ScanKind::Subdomains
    }

    async fn probe(&self, subdomain: &String) -> ProbeOutcome<ResolvedHost> {
        match self.resolver.resolve(subdomain).await {
            Ok(addrs) => match preferred_address(&addrs) {
                Some(ip) => ProbeOutcome::Interesting(ResolvedHost {
                    subdomain: subdomain.clone(),
                    ip,
                }),
                None => ProbeOutcome::NotInteresting(ProbeFailure::Unresolved),
            },
            Err(failure) => ProbeOutcome::NotInteresting(failure),
        }
    }
}
