//! WHOIS subcommand implementation.

use crate::cli::Context;
use crate::error::CliResult;
use crate::output;
use crate::recon::whois::GEO_ENDPOINT;
use crate::recon::{GeoClient, WhoisClient};
use crate::scanner::SystemResolver;
use crate::types::TargetSpec;
use clap::Parser;
use std::time::Duration;

/// WHOIS and IP geolocation lookup.
#[derive(Parser, Debug)]
pub struct WhoisCommand {
    /// Domain name or IP address
    #[arg(value_name = "TARGET")]
    pub target: String,
}

impl WhoisCommand {
    /// Geolocate the target's address, then query WHOIS for domain names.
    ///
    /// Only an unresolvable target is an error; lookup failures are warnings.
    pub async fn execute(&self, ctx: &Context) -> CliResult<()> {
        output::print_section(&format!("WHOIS / IP Lookup: {}", self.target));

        let spec = TargetSpec::parse(&self.target)?;
        let target = spec
            .resolve(&SystemResolver::new(Duration::from_secs(5)))
            .await?;
        let domain = match &spec {
            TargetSpec::Hostname(name) => {
                output::print_info(&format!("Resolved IP: {}", target.ip));
                Some(name.as_str())
            }
            TargetSpec::Single(_) => None,
        };

        match GeoClient::new(GEO_ENDPOINT, &ctx.settings.user_agent)?
            .lookup(target.ip)
            .await
        {
            Ok(fields) => {
                output::print_kv_section("IP Geolocation", fields.iter(), "No geolocation data.")
            }
            Err(e) => output::print_warning(&e.to_string()),
        }

        match domain {
            Some(domain) => match WhoisClient::default().lookup(domain).await {
                Ok(fields) => output::print_kv_section(
                    "WHOIS Info",
                    fields.iter(),
                    "WHOIS returned no known fields.",
                ),
                Err(e) => output::print_warning(&format!("WHOIS lookup failed: {}", e)),
            },
            None => output::print_info("Target is an IP, skipping WHOIS domain query."),
        }

        Ok(())
    }
}
