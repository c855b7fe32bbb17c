//! CSV output formatting.

use crate::report::{Finding, ScanReport};
use crate::scanner::ScanKind;
use std::io::{self, Write};

/// Write a report's findings as CSV, one row per finding.
pub fn write_csv<W: Write>(report: &ScanReport, out: W) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    match report.kind {
        ScanKind::Ports => wtr.write_record(["port", "service", "state"])?,
        ScanKind::Directories => wtr.write_record(["status", "meaning", "url"])?,
        ScanKind::Subdomains => wtr.write_record(["subdomain", "ip"])?,
    }

    for finding in &report.findings {
        match finding {
            Finding::Port {
                port,
                service,
                state,
            } => wtr.write_record([port.to_string().as_str(), service, state])?,
            Finding::Path {
                status,
                meaning,
                url,
            } => wtr.write_record([status.to_string().as_str(), meaning, url])?,
            Finding::Subdomain { subdomain, ip } => {
                wtr.write_record([subdomain.as_str(), ip.to_string().as_str()])?
            }
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Print a report as CSV on stdout.
pub fn print_csv(report: &ScanReport) -> io::Result<()> {
    let stdout = io::stdout();
    write_csv(report, stdout.lock())
}
