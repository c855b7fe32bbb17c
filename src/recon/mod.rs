//! Collaborators outside the probing engine: external scanning tools,
//! WHOIS and geolocation lookups, and the automated recon pipeline.

pub mod external;
pub mod pipeline;
pub mod whois;

pub use external::{run_tool, web_detected, SystemTools, ToolCommand, ToolRunner};
pub use pipeline::{run_recon, ReconOptions, ReconSummary, ScanMode};
pub use whois::{Fields, GeoClient, WhoisClient};
