//! Tracing subscriber setup.
//!
//! Human-facing diagnostics go to stderr, filtered by `RUST_LOG` or the
//! verbosity flags. The recon pipeline can additionally append a plain
//! log file next to its artifacts.

use crate::error::{ConfigError, ConfigResult};
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Filter used when `RUST_LOG` is unset.
pub fn default_directive(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "ctf_recon=error"
    } else if verbose {
        "ctf_recon=debug"
    } else {
        "ctf_recon=warn"
    }
}

fn env_filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the global subscriber.
///
/// `log_file` is opened in append mode and always records `info` and above
/// for this crate, independent of the terminal verbosity.
pub fn init_logging(verbose: bool, quiet: bool, log_file: Option<&Path>) -> ConfigResult<()> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(env_filter_or(default_directive(verbose, quiet)));

    let file_layer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| ConfigError::WriteFailed {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_target(false)
                    .with_ansi(false)
                    .with_filter(env_filter_or("ctf_recon=info")),
            )
        }
        None => None,
    };

    if tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .is_err()
    {
        debug!("tracing subscriber already installed");
    }
    Ok(())
}
