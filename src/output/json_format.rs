//! JSON output formatting.

use crate::report::ScanReport;
use std::io::{self, Write};

/// Write a report as pretty-printed JSON.
pub fn write_json<W: Write>(report: &ScanReport, out: &mut W) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)
}

/// Print a report as JSON on stdout.
pub fn print_json(report: &ScanReport) -> io::Result<()> {
    let stdout = io::stdout();
    write_json(report, &mut stdout.lock())
}
