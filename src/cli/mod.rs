//! CLI subcommand definitions and handlers.
//!
//! Implements a git-like subcommand architecture:
//! - `ctf-recon ports <target>` - TCP connect scan
//! - `ctf-recon subdomains <domain>` - DNS brute force
//! - `ctf-recon dirs <url>` - HTTP directory brute force
//! - `ctf-recon whois <target>` - WHOIS and IP geolocation
//! - `ctf-recon recon <target>` - Automated nmap/gobuster pipeline
//! - `ctf-recon history` - View saved scans

mod history;
mod recon;
mod scan;
mod whois;

pub use history::HistoryCommand;
pub use recon::ReconCommand;
pub use scan::{DirsCommand, PortsCommand, ScanOptions, SubdomainsCommand};
pub use whois::WhoisCommand;

use crate::config::AppSettings;
use crate::error::CliResult;
use crate::output::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ctf-recon - Reconnaissance toolkit for CTF targets.
///
/// Port scanning, subdomain enumeration and directory brute forcing run on
/// a bounded pool of concurrent probes. WHOIS lookups and an automated
/// nmap/gobuster pipeline round out the toolkit.
#[derive(Parser, Debug)]
#[command(name = "ctf-recon")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Reconnaissance toolkit for CTF targets", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output and progress bars
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to custom configuration file
    #[arg(long, global = true, value_name = "PATH", env = "CTF_RECON_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory for recon artifacts
    #[arg(long, global = true, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a target for open TCP ports
    #[command(alias = "portscan")]
    Ports(PortsCommand),

    /// Enumerate subdomains from a wordlist
    #[command(alias = "subdomain")]
    Subdomains(SubdomainsCommand),

    /// Brute force directories and files on a web server
    #[command(alias = "dirbrute")]
    Dirs(DirsCommand),

    /// WHOIS and IP geolocation lookup
    Whois(WhoisCommand),

    /// Run the automated nmap/gobuster recon pipeline
    Recon(ReconCommand),

    /// View scan history
    History(HistoryCommand),
}

impl Commands {
    /// Format the command will print its main result in.
    pub fn output_format(&self, settings: &AppSettings) -> OutputFormat {
        let chosen = match self {
            Self::Ports(cmd) => cmd.scan.output,
            Self::Subdomains(cmd) => cmd.scan.output,
            Self::Dirs(cmd) => cmd.scan.output,
            Self::History(cmd) => cmd.output,
            Self::Whois(_) | Self::Recon(_) => Some(OutputFormat::Plain),
        };
        chosen.unwrap_or(settings.default_output_format)
    }

    /// Execute the command.
    pub async fn execute(&self, ctx: &Context) -> CliResult<()> {
        match self {
            Self::Ports(cmd) => cmd.execute(ctx).await,
            Self::Subdomains(cmd) => cmd.execute(ctx).await,
            Self::Dirs(cmd) => cmd.execute(ctx).await,
            Self::Whois(cmd) => cmd.execute(ctx).await,
            Self::Recon(cmd) => cmd.execute(ctx).await,
            Self::History(cmd) => cmd.execute(ctx),
        }
    }
}

/// Settings and global flags shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub settings: AppSettings,
    pub verbose: bool,
    pub quiet: bool,
    /// `--output-dir` or the configured output directory.
    pub output_dir: PathBuf,
}

impl Context {
    /// Whether decorative output (banners, headers, notices) is wanted.
    pub fn chatty(&self, format: OutputFormat) -> bool {
        !self.quiet && !format.is_machine_readable()
    }
}

impl Cli {
    /// Load settings and merge the global flags into a [`Context`].
    pub fn context(&self) -> CliResult<Context> {
        let settings = AppSettings::resolve(self.config.as_deref())?;
        let output_dir = self
            .output_dir
            .clone()
            .unwrap_or_else(|| settings.output_dir.clone());
        Ok(Context {
            settings,
            verbose: self.verbose,
            quiet: self.quiet,
            output_dir,
        })
    }

    /// Log file to append to, for commands that keep one.
    pub fn log_file(&self, ctx: &Context) -> Option<PathBuf> {
        matches!(self.command, Commands::Recon(_)).then(|| ctx.output_dir.join("recon.log"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_aliases_parse() {
        let cli =
            Cli::try_parse_from(["ctf-recon", "portscan", "10.0.0.1", "--end", "100"]).unwrap();
        assert!(matches!(cli.command, Commands::Ports(ref c) if c.end == Some(100)));

        let cli = Cli::try_parse_from(["ctf-recon", "subdomain", "box.htb"]).unwrap();
        assert!(matches!(cli.command, Commands::Subdomains(_)));

        let cli = Cli::try_parse_from(["ctf-recon", "dirbrute", "http://box.htb", "-k"]).unwrap();
        assert!(matches!(cli.command, Commands::Dirs(ref c) if c.insecure));
    }

    #[test]
    fn test_output_format_falls_back_to_settings() {
        let mut settings = AppSettings::default();
        settings.default_output_format = OutputFormat::Csv;

        let cli = Cli::try_parse_from(["ctf-recon", "ports", "10.0.0.1"]).unwrap();
        assert_eq!(cli.command.output_format(&settings), OutputFormat::Csv);

        let cli = Cli::try_parse_from(["ctf-recon", "ports", "10.0.0.1", "-o", "json"]).unwrap();
        assert_eq!(cli.command.output_format(&settings), OutputFormat::Json);

        let cli = Cli::try_parse_from(["ctf-recon", "recon", "box.htb"]).unwrap();
        assert_eq!(cli.command.output_format(&settings), OutputFormat::Plain);
    }

    #[test]
    fn test_context_and_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("settings.json");
        AppSettings::default().save_to(&config).unwrap();
        let config = config.to_str().unwrap();

        let cli = Cli::try_parse_from([
            "ctf-recon", "--config", config, "--output-dir", "loot", "recon", "box.htb",
        ])
        .unwrap();
        let ctx = cli.context().unwrap();
        assert_eq!(ctx.output_dir, PathBuf::from("loot"));
        assert_eq!(cli.log_file(&ctx), Some(PathBuf::from("loot/recon.log")));

        let cli =
            Cli::try_parse_from(["ctf-recon", "--config", config, "whois", "box.htb"]).unwrap();
        let ctx = cli.context().unwrap();
        assert_eq!(ctx.output_dir, PathBuf::from("output"));
        assert_eq!(cli.log_file(&ctx), None);
    }
}
