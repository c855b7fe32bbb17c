//! Target specification types.
//!
//! Provides target parsing for the three scan kinds:
//! - Hosts for port scanning (IPv4, IPv6 or hostname)
//! - Base domains for subdomain enumeration
//! - Base URLs for directory brute forcing

use crate::error::{ConfigError, ResolutionError};
use crate::scanner::dns::HostResolver;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// A scan target that has been resolved to an IP address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanTarget {
    /// The original input (hostname or IP string).
    pub original: String,
    /// The resolved IP address.
    pub ip: IpAddr,
}

impl ScanTarget {
    pub fn new(original: impl Into<String>, ip: IpAddr) -> Self {
        Self {
            original: original.into(),
            ip,
        }
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.original == self.ip.to_string() {
            write!(f, "{}", self.ip)
        } else {
            write!(f, "{} ({})", self.original, self.ip)
        }
    }
}

/// A host to scan: either an address literal or a name to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSpec {
    /// A single IP address.
    Single(IpAddr),
    /// A hostname to be resolved.
    Hostname(String),
}

impl TargetSpec {
    /// Parse a target specification from a string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let s = s.trim();

        if let Ok(ip) = s.parse::<IpAddr>() {
            return Ok(Self::Single(ip));
        }

        if is_valid_hostname(s) {
            return Ok(Self::Hostname(s.to_ascii_lowercase()));
        }

        Err(ConfigError::InvalidTarget(s.to_string()))
    }

    /// Resolve to a single address, once, before any probing.
    ///
    /// IPv4 answers are preferred over IPv6 ones.
    pub async fn resolve(
        &self,
        resolver: &dyn HostResolver,
    ) -> Result<ScanTarget, ResolutionError> {
        match self {
            Self::Single(ip) => Ok(ScanTarget::new(ip.to_string(), *ip)),
            Self::Hostname(hostname) => {
                let addrs = resolver
                    .resolve(hostname)
                    .await
                    .map_err(|failure| ResolutionError::Failed {
                        host: hostname.clone(),
                        reason: failure.to_string(),
                    })?;

                preferred_address(&addrs)
                    .map(|ip| ScanTarget::new(hostname.clone(), ip))
                    .ok_or_else(|| ResolutionError::NoAddresses(hostname.clone()))
            }
        }
    }
}

impl FromStr for TargetSpec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(ip) => write!(f, "{}", ip),
            Self::Hostname(hostname) => write!(f, "{}", hostname),
        }
    }
}

/// Pick the first IPv4 address, falling back to the first address of any family.
pub fn preferred_address(addrs: &[IpAddr]) -> Option<IpAddr> {
    addrs
        .iter()
        .find(|ip| ip.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
}

/// Check for a dotted-quad IPv4 literal: four dot-separated integers 0-255.
pub fn is_dotted_quad(s: &str) -> bool {
    let parts: Vec<&str> = s.split('.').collect();
    parts.len() == 4
        && parts.iter().all(|p| {
            !p.is_empty()
                && p.chars().all(|c| c.is_ascii_digit())
                && p.parse::<u16>().map_or(false, |n| n <= 255)
        })
}

/// Normalize a base domain for subdomain enumeration.
pub fn normalize_domain(s: &str) -> Result<String, ConfigError> {
    let domain = s.trim().trim_end_matches('.').to_ascii_lowercase();
    if is_valid_hostname(&domain) {
        Ok(domain)
    } else {
        Err(ConfigError::InvalidTarget(s.trim().to_string()))
    }
}

/// Normalize a base URL for directory brute forcing.
///
/// Trailing slashes are stripped and a missing scheme defaults to `http://`.
pub fn normalize_base_url(s: &str) -> Result<String, ConfigError> {
    let trimmed = s.trim().trim_end_matches('/');
    let url = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    match reqwest::Url::parse(&url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.host().is_some() => {
            Ok(url)
        }
        _ => Err(ConfigError::InvalidTarget(s.trim().to_string())),
    }
}

/// Check if a string is a valid hostname.
fn is_valid_hostname(s: &str) -> bool {
    if s.is_empty() || s.len() > 253 {
        return false;
    }

    // Each label must be 1-63 characters, alphanumeric or hyphen, no edge hyphens
    for label in s.split('.') {
        if label.is_empty() || label.len() > 63 {
            return false;
        }
        if !label.chars().next().map_or(false, |c| c.is_ascii_alphanumeric()) {
            return false;
        }
        if !label.chars().last().map_or(false, |c| c.is_ascii_alphanumeric()) {
            return false;
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_parse_ipv4() {
        let spec = TargetSpec::parse("10.10.11.5").unwrap();
        assert!(matches!(spec, TargetSpec::Single(IpAddr::V4(_))));
    }

    #[test]
    fn test_parse_hostname_lowercases() {
        let spec = TargetSpec::parse(" Box.HTB ").unwrap();
        assert_eq!(spec, TargetSpec::Hostname("box.htb".to_string()));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(TargetSpec::parse("not a host").is_err());
        assert!(TargetSpec::parse("").is_err());
    }

    #[test]
    fn test_dotted_quad() {
        assert!(is_dotted_quad("192.168.1.1"));
        assert!(is_dotted_quad("0.0.0.0"));
        assert!(!is_dotted_quad("256.1.1.1"));
        assert!(!is_dotted_quad("1.2.3"));
        assert!(!is_dotted_quad("example.com"));
        assert!(!is_dotted_quad("1.2.3.-4"));
    }

    #[test]
    fn test_preferred_address() {
        let v6 = IpAddr::V6(Ipv6Addr::LOCALHOST);
        let v4 = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(preferred_address(&[v6, v4]), Some(v4));
        assert_eq!(preferred_address(&[v6]), Some(v6));
        assert_eq!(preferred_address(&[]), None);
    }

    #[test]
    fn test_normalize_domain() {
        assert_eq!(normalize_domain(" Example.COM. ").unwrap(), "example.com");
        assert!(normalize_domain("-bad.com").is_err());
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("http://10.10.10.10/").unwrap(),
            "http://10.10.10.10"
        );
        assert_eq!(
            normalize_base_url("target.htb//").unwrap(),
            "http://target.htb"
        );
        assert_eq!(
            normalize_base_url("https://site.local/app/").unwrap(),
            "https://site.local/app"
        );
        assert!(normalize_base_url("ftp://site.local").is_err());
    }
}
