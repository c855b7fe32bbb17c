//! Error types for ctf-recon.
//!
//! Uses `thiserror` for ergonomic error definitions. Errors come in two
//! tiers: run-level errors ([`ConfigError`], [`ResolutionError`]) abort a
//! scan before any probing starts, while [`ProbeFailure`] describes why a
//! single candidate was not interesting and never leaves the report.

use crate::scanner::ScanKind;
use crate::types::PortError;
use std::path::PathBuf;
use thiserror::Error;

/// Invalid or unusable run configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("wordlist not found: {}", .0.display())]
    WordlistNotFound(PathBuf),

    #[error("failed to read wordlist {}: {reason}", .path.display())]
    WordlistUnreadable { path: PathBuf, reason: String },

    #[error("wordlist {} contains no entries", .0.display())]
    EmptyWordlist(PathBuf),

    #[error("invalid port bounds: {0}")]
    InvalidPorts(#[from] PortError),

    #[error("concurrency must be at least 1")]
    InvalidConcurrency,

    #[error("invalid target: {0}")]
    InvalidTarget(String),

    #[error("could not determine configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {}: {reason}", .path.display())]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to write {}: {reason}", .path.display())]
    WriteFailed { path: PathBuf, reason: String },

    #[error("invalid settings format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The scan target could not be turned into an address.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("failed to resolve hostname '{host}': {reason}")]
    Failed { host: String, reason: String },

    #[error("no IP addresses found for hostname '{0}'")]
    NoAddresses(String),
}

/// Why a single probe did not produce an interesting result.
///
/// These are recovered locally by the probe or the worker pool and only
/// ever show up as aggregate counts in the final report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeFailure {
    #[error("timed out")]
    Timeout,

    #[error("connection refused")]
    Refused,

    #[error("unreachable")]
    Unreachable,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("status {0} is not interesting")]
    UninterestingStatus(u16),

    #[error("name did not resolve")]
    Unresolved,

    #[error("probe panicked")]
    Panicked,

    #[error("probe worker aborted before completing")]
    Aborted,
}

/// Run-level error returned by the scan drivers.
#[derive(Error, Debug)]
pub enum ReconError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("scan plan is for {found}, expected {expected}")]
    PlanMismatch { expected: ScanKind, found: ScanKind },
}

/// Errors from the scan history store.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("scan not found: {0}")]
    ScanNotFound(String),

    #[error("ambiguous scan id prefix '{prefix}': {matches} matches")]
    AmbiguousPrefix { prefix: String, matches: usize },

    #[error("failed to save: {0}")]
    SaveFailed(String),

    #[error("failed to load: {0}")]
    LoadFailed(String),

    #[error("storage directory error: {0}")]
    DirectoryError(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors from running an external scanning binary.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("'{0}' is not installed or not on PATH")]
    NotFound(String),

    #[error("failed to run '{program}': {reason}")]
    SpawnFailed { program: String, reason: String },
}

/// Errors from WHOIS and geolocation lookups.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("WHOIS query to {server} failed: {reason}")]
    Whois { server: String, reason: String },

    #[error("geolocation request failed: {0}")]
    Geolocation(String),

    #[error("geolocation unavailable for {0} (private or reserved address?)")]
    NoGeolocation(String),
}

/// Top-level error for CLI commands.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Recon(#[from] ReconError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl CliError {
    /// Process exit code; configuration and resolution failures are
    /// distinguishable from generic errors.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Recon(ReconError::Config(_)) => 2,
            Self::Resolution(_) | Self::Recon(ReconError::Resolution(_)) => 3,
            _ => 1,
        }
    }
}

/// Result type alias for scan drivers.
pub type ReconResult<T> = Result<T, ReconError>;

/// Result type alias for configuration handling.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let missing = CliError::from(ReconError::from(ConfigError::WordlistNotFound(
            PathBuf::from("nope.txt"),
        )));
        assert_eq!(missing.exit_code(), 2);

        let unresolved = CliError::from(ReconError::from(ResolutionError::NoAddresses(
            "example.invalid".to_string(),
        )));
        assert_eq!(unresolved.exit_code(), 3);

        assert_eq!(CliError::Other("boom".to_string()).exit_code(), 1);
    }

    #[test]
    fn test_wordlist_errors_are_distinguishable() {
        let missing = ConfigError::WordlistNotFound(PathBuf::from("words.txt"));
        let empty = ConfigError::EmptyWordlist(PathBuf::from("words.txt"));
        assert_eq!(missing.to_string(), "wordlist not found: words.txt");
        assert_eq!(empty.to_string(), "wordlist words.txt contains no entries");
    }
}
