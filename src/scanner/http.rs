//! HTTP HEAD probe for directory brute forcing.
//!
//! Issues `HEAD base_url/candidate` and reports the path when the status
//! code is in [`INTERESTING_STATUS`]. Redirects are not followed, so a
//! `301` for a directory is observed as such.
//!
//! Transport failures and uninteresting status codes are both reported as
//! not interesting. The report cannot tell a live server answering `404`
//! apart from one that never answered; only the failure tally keeps the
//! distinction.

use crate::error::{ProbeFailure, ReconError, ReconResult};
use crate::scanner::traits::{Probe, ProbeOutcome, ScanKind};
use crate::services::LookupTable;
use async_trait::async_trait;
use reqwest::{redirect, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// User agent sent with every probe.
pub const DEFAULT_USER_AGENT: &str = "CTFRecon/1.0";

/// Client-side request timeout.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Status codes worth reporting and what they mean.
pub static INTERESTING_STATUS: LookupTable = LookupTable::new(
    &[
        (200, "OK"),
        (201, "Created"),
        (204, "No Content"),
        (301, "Moved Permanently"),
        (302, "Found (Redirect)"),
        (401, "Unauthorized"),
        (403, "Forbidden"),
        (405, "Method Not Allowed"),
        (500, "Internal Server Error"),
    ],
    "?",
);

/// A path that answered with an interesting status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathHit {
    pub url: String,
    pub status: u16,
}

/// HTTP HEAD probe bound to one base URL.
pub struct HttpHeadProbe {
    client: Client,
    base_url: String,
}

impl HttpHeadProbe {
    /// Build a probe for an already-normalized base URL (no trailing slash).
    ///
    /// # Arguments
    /// * `base_url` - Scheme, host and optional path prefix
    /// * `timeout` - Whole-request timeout
    /// * `user_agent` - Value of the `User-Agent` header
    /// * `accept_invalid_certs` - Skip TLS verification (self-signed targets)
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        user_agent: &str,
        accept_invalid_certs: bool,
    ) -> ReconResult<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .connect_timeout(timeout)
            .redirect(redirect::Policy::none())
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .map_err(|e| ReconError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Full URL probed for a candidate path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl Probe for HttpHeadProbe {
    type Candidate = String;
    type Finding = PathHit;

    fn kind(&self) -> ScanKind {
        ScanKind::Directories
    }

    async fn probe(&self, path: &String) -> ProbeOutcome<PathHit> {
        let url = self.url_for(path);
        match self.client.head(&url).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                if INTERESTING_STATUS.contains(status) {
                    ProbeOutcome::Interesting(PathHit { url, status })
                } else {
                    ProbeOutcome::NotInteresting(ProbeFailure::UninterestingStatus(status))
                }
            }
            Err(e) if e.is_timeout() => ProbeOutcome::NotInteresting(ProbeFailure::Timeout),
            Err(e) => ProbeOutcome::NotInteresting(ProbeFailure::Transport(e.to_string())),
        }
    }
}
