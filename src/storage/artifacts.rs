//! Output-directory artifacts written by the recon pipeline.

use crate::error::{ConfigError, ConfigResult};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

fn prepare(dir: &Path, name: &str) -> ConfigResult<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| ConfigError::WriteFailed {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(dir.join(name))
}

/// Write `value` as pretty JSON to `dir/name`, creating `dir` if needed.
pub fn write_json_artifact<T: Serialize>(
    dir: &Path,
    name: &str,
    value: &T,
) -> ConfigResult<PathBuf> {
    let path = prepare(dir, name)?;
    let content =
        serde_json::to_string_pretty(value).map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
    fs::write(&path, content).map_err(|e| ConfigError::WriteFailed {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    debug!(path = %path.display(), "wrote artifact");
    Ok(path)
}

/// Write raw text to `dir/name`, creating `dir` if needed.
pub fn write_text_artifact(dir: &Path, name: &str, text: &str) -> ConfigResult<PathBuf> {
    let path = prepare(dir, name)?;
    fs::write(&path, text).map_err(|e| ConfigError::WriteFailed {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    debug!(path = %path.display(), "wrote artifact");
    Ok(path)
}
