//! Candidate generation.
//!
//! Every scan expands its configuration into the complete, ordered list of
//! candidates before the worker pool starts. Failing to produce that list
//! is a run-level [`ConfigError`]; an empty wordlist is reported separately
//! from a missing or unreadable one.

use crate::error::{ConfigError, ConfigResult};
use crate::types::{Port, PortRange};
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

/// Load a wordlist: one token per line, trimmed, blank lines dropped.
pub fn load_wordlist(path: impl AsRef<Path>) -> ConfigResult<Vec<String>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ConfigError::WordlistNotFound(path.to_path_buf()),
        _ => ConfigError::WordlistUnreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    })?;

    let words: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if words.is_empty() {
        return Err(ConfigError::EmptyWordlist(path.to_path_buf()));
    }

    debug!(path = %path.display(), words = words.len(), "loaded wordlist");
    Ok(words)
}

/// Expand words with file extensions, word-major and extension-minor.
///
/// `N` words and `M` extensions yield exactly `N * M` paths. An empty
/// extension list behaves like `[""]`.
pub fn expand_paths(words: &[String], extensions: &[String]) -> Vec<String> {
    if extensions.is_empty() {
        return words.to_vec();
    }

    let mut paths = Vec::with_capacity(words.len() * extensions.len());
    for word in words {
        for ext in extensions {
            paths.push(format!("{}{}", word, ext));
        }
    }
    paths
}

/// Expand an inclusive port window into ascending port candidates.
pub fn expand_ports(start: u32, end: u32) -> ConfigResult<Vec<Port>> {
    let range = PortRange::from_bounds(start, end)?;
    Ok(range.iter().collect())
}

/// Expand words into `word.domain` hostnames, in wordlist order.
pub fn expand_subdomains(words: &[String], domain: &str) -> Vec<String> {
    words
        .iter()
        .map(|word| format!("{}.{}", word, domain))
        .collect()
}
