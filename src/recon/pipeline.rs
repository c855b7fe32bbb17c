//! Automated recon pipeline.
//!
//! Runs `nmap`, then subdomain and directory brute forcing with `gobuster`
//! in parallel where they apply, then snapshots the HTTP response headers
//! of the target. Each stage's raw output lands in the output directory and
//! a JSON summary ties them together. A failing stage is logged and left
//! out of the summary; it never stops the stages after it.

use crate::error::ConfigResult;
use crate::recon::external::{web_detected, ToolCommand, ToolRunner};
use crate::storage::{write_json_artifact, write_text_artifact};
use crate::types::is_dotted_quad;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};

/// File name of the JSON summary inside the output directory.
pub const SUMMARY_FILE: &str = "report.json";

/// How thorough the nmap stage is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScanMode {
    /// Top ports only.
    Fast,
    /// All 65535 ports.
    Full,
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fast => write!(f, "FAST"),
            Self::Full => write!(f, "FULL"),
        }
    }
}

/// Inputs for one pipeline run.
#[derive(Debug, Clone)]
pub struct ReconOptions {
    /// Host name or IPv4 address, without scheme.
    pub target: String,
    pub mode: ScanMode,
    pub output_dir: PathBuf,
    pub subdomain_wordlist: PathBuf,
    pub dir_wordlist: PathBuf,
    pub user_agent: String,
    pub header_timeout: Duration,
}

/// Outcome of a pipeline run, as written to `report.json`.
///
/// A stage that was skipped or failed is `None`. A failed header snapshot
/// is an empty map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconSummary {
    pub target: String,
    pub scan_mode: ScanMode,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub nmap: Option<String>,
    pub dns: Option<String>,
    pub web: Option<String>,
    pub http_headers: BTreeMap<String, String>,
}

/// Run one tool stage and persist its output as `<name>.txt`.
async fn run_stage<T: ToolRunner + ?Sized>(
    tools: &T,
    name: &str,
    command: ToolCommand,
    output_dir: &Path,
) -> Option<String> {
    match tools.run(&command).await {
        Ok(output) => {
            info!(stage = name, bytes = output.len(), "stage finished");
            if let Err(e) = write_text_artifact(output_dir, &format!("{}.txt", name), &output) {
                warn!(stage = name, error = %e, "could not save stage output");
            }
            Some(output)
        }
        Err(e) => {
            error!(stage = name, error = %e, "stage failed");
            None
        }
    }
}

/// `GET http://target` and collect the response headers.
pub async fn fetch_headers(
    target: &str,
    user_agent: &str,
    timeout: Duration,
) -> Result<BTreeMap<String, String>, reqwest::Error> {
    let client = reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()?;
    let response = client.get(format!("http://{}", target)).send().await?;

    Ok(response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect())
}

/// Run the full pipeline and write `report.json`.
///
/// Only failing to write the summary itself is an error.
pub async fn run_recon<T: ToolRunner + ?Sized>(
    options: &ReconOptions,
    tools: &T,
) -> ConfigResult<ReconSummary> {
    let start_time = Utc::now();
    let target = options.target.as_str();
    let out = options.output_dir.as_path();
    info!(host = target, mode = %options.mode, "recon started");

    let nmap = run_stage(
        tools,
        "nmap",
        ToolCommand::nmap(target, options.mode == ScanMode::Fast),
        out,
    )
    .await;
    let open_web = web_detected(nmap.as_deref().unwrap_or(""));

    let dns_stage = async {
        if is_dotted_quad(target) {
            info!("target is an IP address, skipping subdomain stage");
            return None;
        }
        run_stage(
            tools,
            "dns",
            ToolCommand::gobuster_dns(target, &options.subdomain_wordlist),
            out,
        )
        .await
    };
    let web_stage = async {
        if !open_web {
            info!("no web service detected, skipping directory stage");
            return None;
        }
        run_stage(
            tools,
            "web",
            ToolCommand::gobuster_dir(target, &options.dir_wordlist),
            out,
        )
        .await
    };
    let (dns, web) = tokio::join!(dns_stage, web_stage);

    let snapshot = fetch_headers(target, &options.user_agent, options.header_timeout).await;
    let http_headers = snapshot.unwrap_or_else(|e| {
        error!(error = %e, "HTTP header analysis failed");
        BTreeMap::new()
    });

    let summary = ReconSummary {
        target: options.target.clone(),
        scan_mode: options.mode,
        start_time,
        end_time: Utc::now(),
        nmap,
        dns,
        web,
        http_headers,
    };

    write_json_artifact(out, SUMMARY_FILE, &summary)?;
    info!("recon completed");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use crate::scanner::http::tests::spawn_server;
    use async_trait::async_trait;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Canned output per program/subcommand; records every invocation.
    struct StubTools {
        nmap: Result<&'static str, ()>,
        calls: Mutex<Vec<ToolCommand>>,
    }

    impl StubTools {
        fn new(nmap: Result<&'static str, ()>) -> Self {
            Self {
                nmap,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|c| c.to_string())
                .collect()
        }
    }

    #[async_trait]
    impl ToolRunner for StubTools {
        async fn run(&self, command: &ToolCommand) -> Result<String, ToolError> {
            self.calls.lock().unwrap().push(command.clone());
            match (command.program.as_str(), command.args.first().map(String::as_str)) {
                ("nmap", _) => self
                    .nmap
                    .map(str::to_string)
                    .map_err(|_| ToolError::NotFound("nmap".to_string())),
                ("gobuster", Some("dns")) => Ok("Found: www.box.htb\n".to_string()),
                ("gobuster", Some("dir")) => Ok("/admin (Status: 301)\n".to_string()),
                _ => Ok(String::new()),
            }
        }
    }

    fn options(target: &str, mode: ScanMode, dir: &Path) -> ReconOptions {
        ReconOptions {
            target: target.to_string(),
            mode,
            output_dir: dir.to_path_buf(),
            subdomain_wordlist: PathBuf::from("wordlists/subdomains.txt"),
            dir_wordlist: PathBuf::from("wordlists/dirs.txt"),
            user_agent: "CTFRecon/1.0".to_string(),
            header_timeout: Duration::from_secs(2),
        }
    }

    #[tokio::test]
    async fn test_all_stages_run_for_web_host() {
        let base = spawn_server(&[("/", 200)]).await;
        let target = base.trim_start_matches("http://").to_string();
        let dir = TempDir::new().unwrap();
        let tools = StubTools::new(Ok("80/tcp open http nginx\n"));

        let summary = run_recon(&options(&target, ScanMode::Fast, dir.path()), &tools)
            .await
            .unwrap();

        assert_eq!(summary.nmap.as_deref(), Some("80/tcp open http nginx\n"));
        assert_eq!(summary.dns.as_deref(), Some("Found: www.box.htb\n"));
        assert_eq!(summary.web.as_deref(), Some("/admin (Status: 301)\n"));
        let headers = &summary.http_headers;
        assert_eq!(headers.get("content-length").map(String::as_str), Some("0"));

        let calls = tools.calls();
        assert_eq!(calls[0], format!("nmap -F -sC -sV {}", target));
        assert_eq!(calls.len(), 3);

        for file in ["nmap.txt", "dns.txt", "web.txt", SUMMARY_FILE] {
            assert!(dir.path().join(file).exists(), "{} missing", file);
        }
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join(SUMMARY_FILE)).unwrap())
                .unwrap();
        assert_eq!(json["scan_mode"], "FAST");
        assert_eq!(json["target"], target.as_str());
    }

    #[tokio::test]
    async fn test_failed_nmap_skips_dependent_stages() {
        let dir = TempDir::new().unwrap();
        let tools = StubTools::new(Err(()));
        let mut opts = options("10.255.255.1", ScanMode::Full, dir.path());
        opts.header_timeout = Duration::from_millis(200);

        let summary = run_recon(&opts, &tools).await.unwrap();

        assert!(summary.nmap.is_none());
        assert!(summary.dns.is_none());
        assert!(summary.web.is_none());
        assert_eq!(tools.calls(), vec!["nmap -p- -sC -sV 10.255.255.1"]);
        assert!(!dir.path().join("nmap.txt").exists());

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join(SUMMARY_FILE)).unwrap())
                .unwrap();
        assert_eq!(json["scan_mode"], "FULL");
        assert!(json["nmap"].is_null());
        assert!(json["web"].is_null());
        assert_eq!(json["http_headers"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_hostname_without_web_runs_dns_only() {
        let dir = TempDir::new().unwrap();
        let tools = StubTools::new(Ok("22/tcp open ssh\n"));
        let mut opts = options("box.invalid", ScanMode::Fast, dir.path());
        opts.header_timeout = Duration::from_millis(200);

        let summary = run_recon(&opts, &tools).await.unwrap();

        assert!(summary.dns.is_some());
        assert!(summary.web.is_none());
        assert!(summary.http_headers.is_empty());
        assert_eq!(tools.calls().len(), 2);
    }
}
