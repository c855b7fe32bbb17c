//! Plain text output formatting.
//!
//! [`render_table`] writes the deterministic result table; the `print_*`
//! helpers add colour and go straight to the terminal.

use crate::report::{Finding, ScanReport};
use crate::scanner::ScanKind;
use console::style;
use std::io::{self, Write};

const RULE: &str = "═══════════════════════════════════════════════════════════════";

/// Write the fixed-width findings table and summary line.
///
/// Output contains no timestamps or durations, so two reports with the same
/// findings render byte-identically.
pub fn render_table<W: Write>(report: &ScanReport, out: &mut W) -> io::Result<()> {
    match empty_message(report.kind) {
        Some(message) if report.findings.is_empty() => writeln!(out, "[!] {}", message)?,
        _ => {
            write_header(report.kind, out)?;
            for finding in &report.findings {
                writeln!(out, "[+] {}", row(finding))?;
            }
        }
    }

    writeln!(out)?;
    writeln!(out, "[*] {}", summary_line(report.kind, report.findings.len()))
}

fn write_header<W: Write>(kind: ScanKind, out: &mut W) -> io::Result<()> {
    match kind {
        ScanKind::Ports => {
            writeln!(out, "{:<10} {:<15} STATE", "PORT", "SERVICE")?;
            writeln!(out, "{}", "-".repeat(35))
        }
        ScanKind::Directories => {
            writeln!(out, "{:<10} {:<25} URL", "STATUS", "MEANING")?;
            writeln!(out, "{}", "-".repeat(80))
        }
        ScanKind::Subdomains => {
            writeln!(out, "{:<40} IP ADDRESS", "SUBDOMAIN")?;
            writeln!(out, "{}", "-".repeat(60))
        }
    }
}

fn row(finding: &Finding) -> String {
    match finding {
        Finding::Port {
            port,
            service,
            state,
        } => format!("{:<10} {:<15} {}", port.as_u16(), service, state),
        Finding::Path {
            status,
            meaning,
            url,
        } => format!("{:<10} {:<25} {}", status, meaning, url),
        Finding::Subdomain { subdomain, ip } => format!("{:<40} {}", subdomain, ip),
    }
}

fn summary_line(kind: ScanKind, count: usize) -> String {
    match kind {
        ScanKind::Ports => format!("{} open port(s) found.", count),
        ScanKind::Directories => format!("{} interesting path(s) found.", count),
        ScanKind::Subdomains => format!("{} subdomain(s) discovered.", count),
    }
}

/// Warning shown instead of an empty table. Directory scans always print
/// the table header.
fn empty_message(kind: ScanKind) -> Option<&'static str> {
    match kind {
        ScanKind::Ports => Some("No open ports found in the given range."),
        ScanKind::Subdomains => Some("No subdomains found. Try a larger wordlist."),
        ScanKind::Directories => None,
    }
}

/// Print a report in human-readable form with a styled header.
pub fn print_plain(report: &ScanReport) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out, "  {}", style(report.kind).cyan().bold())?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    writeln!(out, "  {} {}", style("Target:").bold(), report.target)?;
    if let Some(ip) = report.resolved {
        writeln!(out, "  {} {}", style("IP Address:").bold(), ip)?;
    }
    writeln!(
        out,
        "  {} {}",
        style("Run ID:").bold(),
        style(report.id.short()).dim()
    )?;
    writeln!(
        out,
        "  {} {} candidates probed in {:.2}s",
        style("Statistics:").bold(),
        report.candidates,
        report.duration_ms as f64 / 1000.0
    )?;
    if report.failures.timeout > 0 {
        writeln!(
            out,
            "               {} timed out",
            style(report.failures.timeout).yellow()
        )?;
    }
    writeln!(out)?;

    render_table(report, &mut out)?;
    writeln!(out)?;
    Ok(())
}

/// Print a scan header before probing begins.
pub fn print_scan_header(kind: ScanKind, target: &str, detail: &str) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style(kind).cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "{} Target: {}",
        style("•").dim(),
        style(target).white().bold()
    );
    println!("{} {}", style("•").dim(), detail);
    println!();
}

/// Print a section title.
pub fn print_section(title: &str) {
    println!();
    println!("{}", style("=".repeat(50)).cyan().bold());
    println!("  {}", style(title).cyan().bold());
    println!("{}", style("=".repeat(50)).cyan().bold());
}

/// Print aligned `key: value` pairs, or `empty` when there are none.
pub fn print_kv_section<'a, I>(title: &str, pairs: I, empty: &str)
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    print_section(title);
    let mut any = false;
    for (key, value) in pairs {
        any = true;
        println!("  {:<20} {}", style(format!("{}:", key)).bold(), value);
    }
    if !any {
        print_warning(empty);
    }
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("[-]").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("[!]").yellow().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", style("[+]").green().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    println!("{} {}", style("[*]").blue().bold(), msg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProbeFailure;
    use crate::report::Aggregator;
    use crate::scanner::{PathHit, ProbeOutcome, INTERESTING_STATUS};
    use crate::services::PORT_SERVICES;
    use crate::types::Port;

    fn render(report: &ScanReport) -> String {
        let mut out = Vec::new();
        render_table(report, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_port_table() {
        let mut agg = Aggregator::new(ScanKind::Ports, "10.0.0.1", Some(&PORT_SERVICES));
        agg.absorb(vec![
            ProbeOutcome::Interesting(Port::new(80).unwrap()),
            ProbeOutcome::NotInteresting(ProbeFailure::Refused),
            ProbeOutcome::Interesting(Port::new(22).unwrap()),
        ]);
        let text = render(&agg.finish());

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "PORT       SERVICE         STATE");
        assert_eq!(lines[1], "-".repeat(35));
        assert_eq!(lines[2], "[+] 22         SSH             OPEN");
        assert_eq!(lines[3], "[+] 80         HTTP            OPEN");
        assert_eq!(lines[5], "[*] 2 open port(s) found.");
    }

    #[test]
    fn test_directory_table() {
        let mut agg = Aggregator::new(
            ScanKind::Directories,
            "http://box.htb",
            Some(&INTERESTING_STATUS),
        );
        agg.absorb(vec![ProbeOutcome::Interesting(PathHit {
            url: "http://box.htb/admin".to_string(),
            status: 301,
        })]);
        let text = render(&agg.finish());

        assert!(text.starts_with("STATUS     MEANING                   URL\n"));
        assert!(
            text.contains("[+] 301        Moved Permanently         http://box.htb/admin\n")
        );
        assert!(text.ends_with("[*] 1 interesting path(s) found.\n"));
    }

    #[test]
    fn test_empty_report() {
        let mut agg = Aggregator::new(ScanKind::Subdomains, "example.com", None);
        agg.absorb::<crate::scanner::ResolvedHost>(vec![ProbeOutcome::NotInteresting(
            ProbeFailure::Unresolved,
        )]);
        let text = render(&agg.finish());
        assert_eq!(
            text,
            "[!] No subdomains found. Try a larger wordlist.\n\n[*] 0 subdomain(s) discovered.\n"
        );
    }

    #[test]
    fn test_empty_directory_report_keeps_header_and_summary() {
        let mut agg = Aggregator::new(
            ScanKind::Directories,
            "http://box.htb",
            Some(&INTERESTING_STATUS),
        );
        agg.absorb::<PathHit>(vec![ProbeOutcome::NotInteresting(
            ProbeFailure::UninterestingStatus(404),
        )]);
        let text = render(&agg.finish());

        assert!(text.starts_with("STATUS     MEANING                   URL\n"));
        assert!(!text.contains("[+]"));
        assert!(text.ends_with("[*] 0 interesting path(s) found.\n"));
    }

    #[test]
    fn test_empty_port_report_has_summary() {
        let mut agg = Aggregator::new(ScanKind::Ports, "10.0.0.1", Some(&PORT_SERVICES));
        agg.absorb::<Port>(vec![ProbeOutcome::NotInteresting(ProbeFailure::Refused)]);
        let text = render(&agg.finish());

        assert!(text.starts_with("[!] No open ports found in the given range.\n"));
        assert!(text.ends_with("[*] 0 open port(s) found.\n"));
    }

    #[test]
    fn test_render_ignores_timing() {
        let build = || {
            let mut agg = Aggregator::new(ScanKind::Ports, "10.0.0.1", Some(&PORT_SERVICES));
            agg.absorb(vec![ProbeOutcome::Interesting(Port::new(443).unwrap())]);
            agg.finish()
        };
        let first = build();
        let second = build();
        assert_ne!(first.id, second.id);
        assert_eq!(render(&first), render(&second));
    }
}
