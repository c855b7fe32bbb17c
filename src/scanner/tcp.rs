//! TCP connect probe.
//!
//! Completes a full TCP handshake against each candidate port of an
//! already-resolved target. Only an established connection is interesting;
//! refusals, timeouts and unreachable errors are not.

use crate::error::ProbeFailure;
use crate::scanner::traits::{Probe, ProbeOutcome, ScanKind};
use crate::types::Port;
use async_trait::async_trait;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// TCP connect probe. Does not require elevated privileges.
pub struct TcpConnectProbe {
    target: IpAddr,
    timeout: Duration,
}

impl TcpConnectProbe {
    /// # Arguments
    /// * `target` - Address resolved once before the scan starts
    /// * `timeout` - Connection timeout per port
    pub fn new(target: IpAddr, timeout: Duration) -> Self {
        Self { target, timeout }
    }

    async fn attempt_connect(&self, addr: SocketAddr) -> Result<TcpStream, ProbeFailure> {
        match timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(classify_connect_error(&e)),
            Err(_) => Err(ProbeFailure::Timeout),
        }
    }
}

fn classify_connect_error(e: &io::Error) -> ProbeFailure {
    if e.kind() == io::ErrorKind::ConnectionRefused {
        return ProbeFailure::Refused;
    }
    if e.to_string().to_lowercase().contains("unreachable") {
        ProbeFailure::Unreachable
    } else {
        ProbeFailure::Transport(e.to_string())
    }
}

#[async_trait]
impl Probe for TcpConnectProbe {
    type Candidate = Port;
    type Finding = Port;

    fn kind(&self) -> ScanKind {
        ScanKind::Ports
    }

    async fn probe(&self, port: &Port) -> ProbeOutcome<Port> {
        let addr = SocketAddr::new(self.target, port.as_u16());
        match self.attempt_connect(addr).await {
            Ok(stream) => {
                drop(stream);
                ProbeOutcome::Interesting(*port)
            }
            Err(failure) => ProbeOutcome::NotInteresting(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use tokio::net::TcpListener;

    fn localhost_probe() -> TcpConnectProbe {
        TcpConnectProbe::new(IpAddr::V4(Ipv4Addr::LOCALHOST), Duration::from_millis(500))
    }

    #[tokio::test]
    async fn test_listening_port_is_open() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = Port::new(listener.local_addr().unwrap().port()).unwrap();

        let outcome = localhost_probe().probe(&port).await;
        assert_eq!(outcome, ProbeOutcome::Interesting(port));
    }

    #[tokio::test]
    async fn test_closed_port_is_not_interesting() {
        // Bind then drop to get a port nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = Port::new(listener.local_addr().unwrap().port()).unwrap();
        drop(listener);

        let outcome = localhost_probe().probe(&port).await;
        assert!(!outcome.is_interesting());
        assert!(matches!(
            outcome.failure(),
            Some(ProbeFailure::Refused | ProbeFailure::Timeout)
        ));
    }

    #[test]
    fn test_classify_refused() {
        let e = io::Error::from(io::ErrorKind::ConnectionRefused);
        assert_eq!(classify_connect_error(&e), ProbeFailure::Refused);

        let e = io::Error::new(io::ErrorKind::Other, "Network is unreachable");
        assert_eq!(classify_connect_error(&e), ProbeFailure::Unreachable);
    }
}
