//! WHOIS and IP geolocation lookups.
//!
//! WHOIS speaks the plain RFC 3912 protocol: send the query line on TCP/43,
//! read until the server closes. The query starts at IANA, which names the
//! registry for the TLD in a `refer:` line; the registry may in turn name
//! the registrar's server.

use crate::error::LookupError;
use serde::Serialize;
use std::net::IpAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Root WHOIS server every query starts from.
pub const IANA_WHOIS: &str = "whois.iana.org";

/// Endpoint for ip-api.com geolocation; the address is appended.
pub const GEO_ENDPOINT: &str = "http://ip-api.com/json";

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_REFERRALS: usize = 3;
const MAX_LIST_VALUES: usize = 3;

/// Upper bound on the bytes read from one WHOIS answer.
pub const MAX_RESPONSE_BYTES: u64 = 64 * 1024;

/// Labelled values in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Fields(pub Vec<(String, String)>);

impl Fields {
    pub fn get(&self, label: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(l, v)| (l.as_str(), v.as_str()))
    }
}

/// Display label, accepted raw keys, and whether several values are joined.
const WHOIS_FIELDS: &[(&str, &[&str], bool)] = &[
    ("Domain Name", &["domain name", "domain"], false),
    ("Registrar", &["registrar"], false),
    ("Creation Date", &["creation date", "created", "registered"], false),
    (
        "Expiration Date",
        &[
            "registry expiry date",
            "registrar registration expiration date",
            "expiration date",
            "expires",
            "paid-till",
        ],
        false,
    ),
    ("Updated Date", &["updated date", "last-modified", "changed"], false),
    ("Name Servers", &["name server", "nserver"], true),
    ("Status", &["domain status", "status"], true),
    (
        "Emails",
        &["registrant email", "admin email", "tech email", "registrar abuse contact email"],
        true,
    ),
    ("Org", &["registrant organization", "org", "organization"], false),
];

fn key_values(response: &str) -> impl Iterator<Item = (String, &str)> {
    response.lines().filter_map(|line| {
        let line = line.trim();
        if line.is_empty()
            || line.starts_with('%')
            || line.starts_with('#')
            || line.starts_with(">>>")
        {
            return None;
        }
        let (key, value) = line.split_once(':')?;
        let value = value.trim();
        (!value.is_empty()).then(|| (key.trim().to_ascii_lowercase(), value))
    })
}

/// Extract the interesting fields of a WHOIS response.
///
/// Single-valued fields keep the first occurrence; list fields keep up to
/// three distinct values joined with `, `.
pub fn parse_whois_response(response: &str) -> Fields {
    let pairs: Vec<(String, &str)> = key_values(response).collect();
    let mut fields = Vec::new();

    for (label, keys, multi) in WHOIS_FIELDS {
        let mut values: Vec<&str> = Vec::new();
        for (key, value) in &pairs {
            if !keys.contains(&key.as_str()) {
                continue;
            }
            if !values.iter().any(|v| v.eq_ignore_ascii_case(value)) {
                values.push(*value);
            }
            if !multi || values.len() == MAX_LIST_VALUES {
                break;
            }
        }
        if !values.is_empty() {
            fields.push((label.to_string(), values.join(", ")));
        }
    }

    Fields(fields)
}

/// The next server to ask, if the response names one.
pub fn referral(response: &str) -> Option<String> {
    key_values(response)
        .find(|(key, _)| key == "refer" || key == "whois" || key == "registrar whois server")
        .map(|(_, value)| value.trim_start_matches("whois://").to_string())
}

fn server_addr(server: &str) -> String {
    if server.contains(':') {
        server.to_string()
    } else {
        format!("{}:43", server)
    }
}

/// Send one WHOIS query and read the full response.
pub async fn query_server(
    server: &str,
    query: &str,
    limit: Duration,
) -> Result<String, LookupError> {
    let fail = |reason: String| LookupError::Whois {
        server: server.to_string(),
        reason,
    };

    let exchange = async {
        let mut stream = TcpStream::connect(server_addr(server)).await?;
        stream.write_all(format!("{}\r\n", query).as_bytes()).await?;
        let mut raw = Vec::new();
        stream.take(MAX_RESPONSE_BYTES).read_to_end(&mut raw).await?;
        Ok::<_, std::io::Error>(raw)
    };

    match timeout(limit, exchange).await {
        Ok(Ok(raw)) => Ok(String::from_utf8_lossy(&raw).into_owned()),
        Ok(Err(e)) => Err(fail(e.to_string())),
        Err(_) => Err(fail("timed out".to_string())),
    }
}

/// WHOIS client following referrals from a root server.
#[derive(Debug, Clone)]
pub struct WhoisClient {
    root: String,
    timeout: Duration,
}

impl Default for WhoisClient {
    fn default() -> Self {
        Self::new(IANA_WHOIS, LOOKUP_TIMEOUT)
    }
}

impl WhoisClient {
    pub fn new(root: impl Into<String>, timeout: Duration) -> Self {
        Self {
            root: root.into(),
            timeout,
        }
    }

    /// Look up `domain`, returning the fields of the most specific answer.
    ///
    /// A failing referral keeps whatever the previous server returned.
    pub async fn lookup(&self, domain: &str) -> Result<Fields, LookupError> {
        let mut server = self.root.clone();
        let mut response = query_server(&server, domain, self.timeout).await?;
        let mut best = Fields::default();

        for _ in 0..MAX_REFERRALS {
            let Some(next) = referral(&response) else {
                break;
            };
            if next.eq_ignore_ascii_case(&server) {
                break;
            }
            debug!(from = %server, to = %next, "following WHOIS referral");
            match query_server(&next, domain, self.timeout).await {
                Ok(answer) => {
                    let fields = parse_whois_response(&answer);
                    if !fields.is_empty() {
                        best = fields;
                    }
                    server = next;
                    response = answer;
                }
                Err(e) => {
                    warn!(error = %e, "WHOIS referral failed");
                    break;
                }
            }
        }

        if best.is_empty() {
            best = parse_whois_response(&response);
        }
        Ok(best)
    }
}

/// ip-api.com fields and their display labels.
const GEO_FIELDS: &[(&str, &str)] = &[
    ("country", "Country"),
    ("regionName", "Region"),
    ("city", "City"),
    ("zip", "Zip"),
    ("isp", "ISP"),
    ("org", "Org"),
    ("as", "AS"),
];

/// Extract geolocation fields from an ip-api.com response body.
///
/// Anything but `"status": "success"` means no data for the address.
pub fn parse_geo(ip: IpAddr, body: &serde_json::Value) -> Result<Fields, LookupError> {
    if body.get("status").and_then(|s| s.as_str()) != Some("success") {
        return Err(LookupError::NoGeolocation(ip.to_string()));
    }

    let fields = GEO_FIELDS
        .iter()
        .filter_map(|(key, label)| {
            let value = match body.get(*key)? {
                serde_json::Value::String(s) if !s.is_empty() => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                _ => return None,
            };
            Some((label.to_string(), value))
        })
        .collect();
    Ok(Fields(fields))
}

/// Geolocation client for ip-api.com.
pub struct GeoClient {
    client: reqwest::Client,
    endpoint: String,
}

impl GeoClient {
    pub fn new(endpoint: impl Into<String>, user_agent: &str) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(LOOKUP_TIMEOUT)
            .build()
            .map_err(|e| LookupError::Geolocation(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub async fn lookup(&self, ip: IpAddr) -> Result<Fields, LookupError> {
        let url = format!("{}/{}", self.endpoint.trim_end_matches('/'), ip);
        let body: serde_json::Value = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LookupError::Geolocation(e.to_string()))?
            .json()
            .await
            .map_err(|e| LookupError::Geolocation(e.to_string()))?;
        parse_geo(ip, &body)
    }
}
