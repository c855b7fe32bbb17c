//! Configuration management for ctf-recon.
//!
//! Provides XDG-compliant paths and persisted application settings with
//! per-scan-kind defaults.

mod settings;

pub use settings::{AppSettings, DirSettings, Paths, PortSettings, SubdomainSettings};
