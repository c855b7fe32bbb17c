//! Scan subcommands.
//!
//! `ports`, `subdomains` and `dirs` merge their flags over the configured
//! defaults into one immutable [`ScanConfig`], run it, print the report and
//! save it to history.

use crate::cli::Context;
use crate::error::CliResult;
use crate::output::{self, OutputFormat};
use crate::report::ScanReport;
use crate::scanner::{run_scan, ScanConfig, ScanPlan};
use crate::storage::ScanStore;
use clap::{Args, Parser};
use std::path::PathBuf;
use std::time::Duration;

/// Flags shared by every scan kind.
#[derive(Args, Debug, Clone, Default)]
pub struct ScanOptions {
    /// Maximum number of probes in flight
    #[arg(short = 'c', long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Per-probe timeout in milliseconds
    #[arg(short = 't', long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Output format for results
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Don't save scan results to history
    #[arg(long)]
    pub no_save: bool,
}

impl ScanOptions {
    fn apply(
        &self,
        config: ScanConfig,
        concurrency: usize,
        timeout_ms: u64,
        ctx: &Context,
    ) -> ScanConfig {
        let config = config
            .with_concurrency(self.concurrency.unwrap_or(concurrency))
            .with_timeout(Duration::from_millis(self.timeout.unwrap_or(timeout_ms)));
        if ctx.verbose {
            config.with_progress()
        } else {
            config
        }
    }

    fn format(&self, ctx: &Context) -> OutputFormat {
        self.output.unwrap_or(ctx.settings.default_output_format)
    }
}

/// Run a scan and handle its report.
async fn execute_scan(
    config: ScanConfig,
    detail: String,
    opts: &ScanOptions,
    ctx: &Context,
) -> CliResult<()> {
    let format = opts.format(ctx);
    if ctx.chatty(format) {
        output::print_scan_header(config.kind(), &config.target, &detail);
    }

    let report = run_scan(&config).await?;
    output::format_report(&report, format)?;
    save_report(&report, opts, ctx, format)
}

fn save_report(
    report: &ScanReport,
    opts: &ScanOptions,
    ctx: &Context,
    format: OutputFormat,
) -> CliResult<()> {
    if opts.no_save || !ctx.settings.auto_save_scans {
        return Ok(());
    }
    let store = ScanStore::new()?;
    store.save(report)?;

    if ctx.chatty(format) {
        output::print_info(&format!("Scan saved as {}", report.id.short()));
    }
    Ok(())
}

/// Scan a target for open TCP ports.
#[derive(Parser, Debug)]
pub struct PortsCommand {
    /// Target IP address or hostname
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// First port of the range
    #[arg(long, value_name = "PORT")]
    pub start: Option<u32>,

    /// Last port of the range (inclusive)
    #[arg(long, value_name = "PORT")]
    pub end: Option<u32>,

    #[command(flatten)]
    pub scan: ScanOptions,
}

impl PortsCommand {
    pub async fn execute(&self, ctx: &Context) -> CliResult<()> {
        let defaults = &ctx.settings.ports;
        let start = self.start.unwrap_or(defaults.start);
        let end = self.end.unwrap_or(defaults.end);

        let config = self.scan.apply(
            ScanConfig::new(&self.target, ScanPlan::Ports { start, end }),
            defaults.concurrency,
            defaults.timeout_ms,
            ctx,
        );
        let detail = format!(
            "Scanning ports {}-{} with {} workers...",
            start, end, config.concurrency
        );
        execute_scan(config, detail, &self.scan, ctx).await
    }
}

/// Enumerate subdomains of a domain.
#[derive(Parser, Debug)]
pub struct SubdomainsCommand {
    /// Base domain, e.g. example.com
    #[arg(value_name = "DOMAIN")]
    pub domain: String,

    /// Wordlist of subdomain labels
    #[arg(short, long, value_name = "FILE")]
    pub wordlist: Option<PathBuf>,

    #[command(flatten)]
    pub scan: ScanOptions,
}

impl SubdomainsCommand {
    pub async fn execute(&self, ctx: &Context) -> CliResult<()> {
        let defaults = &ctx.settings.subdomains;
        let wordlist = self
            .wordlist
            .clone()
            .unwrap_or_else(|| defaults.wordlist.clone());

        let detail = format!("Wordlist: {}", wordlist.display());
        let config = self.scan.apply(
            ScanConfig::new(&self.domain, ScanPlan::Subdomains { wordlist }),
            defaults.concurrency,
            defaults.timeout_ms,
            ctx,
        );
        execute_scan(config, detail, &self.scan, ctx).await
    }
}

/// Brute force paths on a web server.
#[derive(Parser, Debug)]
pub struct DirsCommand {
    /// Base URL, e.g. http://10.10.10.1 (http:// is assumed when omitted)
    #[arg(value_name = "URL")]
    pub url: String,

    /// Wordlist of path names
    #[arg(short, long, value_name = "FILE")]
    pub wordlist: Option<PathBuf>,

    /// Comma-separated extensions appended to every word, e.g. ".php,.bak"
    #[arg(short = 'x', long, value_delimiter = ',', allow_hyphen_values = true)]
    pub extensions: Option<Vec<String>>,

    /// Accept invalid TLS certificates
    #[arg(short = 'k', long)]
    pub insecure: bool,

    #[command(flatten)]
    pub scan: ScanOptions,
}

impl DirsCommand {
    pub async fn execute(&self, ctx: &Context) -> CliResult<()> {
        let defaults = &ctx.settings.dirs;
        let wordlist = self
            .wordlist
            .clone()
            .unwrap_or_else(|| defaults.wordlist.clone());
        let extensions = self
            .extensions
            .clone()
            .unwrap_or_else(|| defaults.extensions.clone());

        let detail = format!(
            "Wordlist: {} x {} extension(s)",
            wordlist.display(),
            extensions.len().max(1)
        );
        let config = self.scan.apply(
            ScanConfig::new(
                &self.url,
                ScanPlan::Directories {
                    wordlist,
                    extensions,
                    user_agent: ctx.settings.user_agent.clone(),
                    accept_invalid_certs: self.insecure,
                },
            ),
            defaults.concurrency,
            defaults.timeout_ms,
            ctx,
        );
        execute_scan(config, detail, &self.scan, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppSettings;
    use crate::error::{CliError, ConfigError, ReconError};

    fn context() -> Context {
        Context {
            settings: AppSettings::default(),
            verbose: false,
            quiet: true,
            output_dir: PathBuf::from("output"),
        }
    }

    #[test]
    fn test_flags_override_settings() {
        let ctx = context();
        let opts = ScanOptions {
            concurrency: Some(8),
            timeout: None,
            output: None,
            no_save: true,
        };
        let config = opts.apply(
            ScanConfig::new("10.0.0.1", ScanPlan::Ports { start: 1, end: 10 }),
            ctx.settings.ports.concurrency,
            ctx.settings.ports.timeout_ms,
            &ctx,
        );
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.timeout, Duration::from_millis(500));
        assert!(!config.show_progress);
    }

    #[test]
    fn test_extensions_flag() {
        let cmd = DirsCommand::try_parse_from(["dirs", "box.htb", "-x", ".php,.bak"]).unwrap();
        assert_eq!(
            cmd.extensions,
            Some(vec![".php".to_string(), ".bak".to_string()])
        );
    }

    #[tokio::test]
    async fn test_invalid_range_maps_to_config_exit_code() {
        let cmd = PortsCommand::try_parse_from([
            "ports", "127.0.0.1", "--start", "100", "--end", "10", "--no-save",
        ])
        .unwrap();

        let err = cmd.execute(&context()).await.unwrap_err();
        assert!(matches!(
            err,
            CliError::Recon(ReconError::Config(ConfigError::InvalidPorts(_)))
        ));
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_missing_wordlist_maps_to_config_exit_code() {
        let cmd = SubdomainsCommand::try_parse_from([
            "subdomains",
            "example.com",
            "-w",
            "/nonexistent/words.txt",
            "--no-save",
        ])
        .unwrap();

        let err = cmd.execute(&context()).await.unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
