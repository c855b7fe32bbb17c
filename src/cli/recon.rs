//! Recon subcommand implementation.

use crate::cli::Context;
use crate::error::CliResult;
use crate::output;
use crate::recon::pipeline::SUMMARY_FILE;
use crate::recon::{run_recon, ReconOptions, ScanMode, SystemTools};
use crate::scanner::HTTP_TIMEOUT;
use chrono::Local;
use clap::Parser;
use std::path::PathBuf;

/// Run nmap, gobuster and an HTTP header check against a target.
#[derive(Parser, Debug)]
pub struct ReconCommand {
    /// Target domain or IP address
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// Fast nmap scan (top ports only)
    #[arg(long)]
    pub fast: bool,

    /// Wordlist for the gobuster dns stage
    #[arg(long, value_name = "FILE")]
    pub dns_wordlist: Option<PathBuf>,

    /// Wordlist for the gobuster dir stage
    #[arg(long, value_name = "FILE")]
    pub dir_wordlist: Option<PathBuf>,
}

impl ReconCommand {
    fn options(&self, ctx: &Context) -> ReconOptions {
        ReconOptions {
            target: self.target.clone(),
            mode: if self.fast { ScanMode::Fast } else { ScanMode::Full },
            output_dir: ctx.output_dir.clone(),
            subdomain_wordlist: self
                .dns_wordlist
                .clone()
                .unwrap_or_else(|| ctx.settings.subdomains.wordlist.clone()),
            dir_wordlist: self
                .dir_wordlist
                .clone()
                .unwrap_or_else(|| ctx.settings.dirs.wordlist.clone()),
            user_agent: ctx.settings.user_agent.clone(),
            header_timeout: HTTP_TIMEOUT,
        }
    }

    pub async fn execute(&self, ctx: &Context) -> CliResult<()> {
        let options = self.options(ctx);

        if !ctx.quiet {
            output::print_section("Recon Automation Framework Started");
            println!("Target     : {}", options.target);
            println!("Start Time : {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
            println!("Scan Mode  : {}", options.mode);
        }

        let summary = run_recon(&options, &SystemTools).await?;

        if !ctx.quiet {
            output::print_section("Recon Completed");
            let stages = [
                ("nmap", summary.nmap.is_some()),
                ("dns", summary.dns.is_some()),
                ("web", summary.web.is_some()),
                ("http headers", !summary.http_headers.is_empty()),
            ];
            for (stage, ran) in stages {
                if ran {
                    output::print_success(&format!("{} stage completed", stage));
                } else {
                    output::print_warning(&format!("{} stage skipped or failed", stage));
                }
            }
            output::print_info(&format!(
                "Results saved in '{}'",
                options.output_dir.display()
            ));
            output::print_info(&format!(
                "Structured report saved as {}",
                options.output_dir.join(SUMMARY_FILE).display()
            ));
        }
        Ok(())
    }
}
