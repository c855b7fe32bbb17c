//! History subcommand implementation.

use crate::cli::Context;
use crate::error::CliResult;
use crate::output::{self, OutputFormat};
use crate::storage::ScanStore;
use chrono::Local;
use clap::Parser;
use console::style;

/// View saved scans.
#[derive(Parser, Debug)]
pub struct HistoryCommand {
    /// Number of recent scans to show
    #[arg(short = 'n', long, default_value = "10")]
    pub count: usize,

    /// Show the full report of one scan (id or id prefix)
    #[arg(long, value_name = "ID")]
    pub show: Option<String>,

    /// Output format for --show
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,
}

impl HistoryCommand {
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        let store = ScanStore::new()?;

        if let Some(prefix) = &self.show {
            let report = store.find_by_prefix(prefix)?;
            let format = self.output.unwrap_or(ctx.settings.default_output_format);
            output::format_report(&report, format)?;
            return Ok(());
        }

        let reports = store.list_recent(self.count)?;
        if reports.is_empty() {
            output::print_info("No saved scans.");
            return Ok(());
        }

        println!();
        println!(
            "  {:<10} {:<19}  {}",
            style("ID").bold(),
            style("STARTED").bold(),
            style("SUMMARY").bold()
        );
        for report in &reports {
            println!(
                "  {:<10} {:<19}  {}",
                style(report.id.short()).dim(),
                report
                    .started_at
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M:%S"),
                report.summary()
            );
        }
        println!();
        Ok(())
    }
}
