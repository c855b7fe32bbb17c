//! Startup banner.

use chrono::{DateTime, Local};
use console::{colors_enabled_stderr, style};

const LOGO: &str = r"
  ██████╗████████╗███████╗    ██████╗ ███████╗ ██████╗ ██████╗ ███╗   ██╗
 ██╔════╝╚══██╔══╝██╔════╝    ██╔══██╗██╔════╝██╔════╝██╔═══██╗████╗  ██║
 ██║        ██║   █████╗      ██████╔╝█████╗  ██║     ██║   ██║██╔██╗ ██║
 ██║        ██║   ██╔══╝      ██╔══██╗██╔══╝  ██║     ██║   ██║██║╚██╗██║
 ╚██████╗   ██║   ██║         ██║  ██║███████╗╚██████╗╚██████╔╝██║ ╚████║
  ╚═════╝   ╚═╝   ╚═╝         ╚═╝  ╚═╝╚══════╝ ╚═════╝ ╚═════╝ ╚═╝  ╚═══╝";

const TAGLINE: &str = "CTF Recon Tool | Port Scan | Subdomain Enum | WHOIS | Dir Brute";

/// Banner stamped with `now`, coloured only when `colored` is set.
pub fn banner_text(now: DateTime<Local>, colored: bool) -> String {
    format!(
        "{}\n\n  {} v{}\n  {}\n",
        style(LOGO).cyan().bold().force_styling(colored),
        style(TAGLINE).yellow().force_styling(colored),
        env!("CARGO_PKG_VERSION"),
        now.format("%Y-%m-%d %H:%M:%S")
    )
}

/// Print the banner to stderr so it never mixes with report output.
pub fn print_banner() {
    eprintln!("{}", banner_text(Local::now(), colors_enabled_stderr()));
}
