//! Application settings and paths.
//!
//! Manages XDG-compliant paths for configuration and data, and the settings
//! file that supplies defaults for every scan kind.

use crate::error::{ConfigError, ConfigResult};
use crate::output::OutputFormat;
use crate::scanner::DEFAULT_USER_AGENT;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

/// Global paths singleton.
static PATHS: OnceLock<Paths> = OnceLock::new();

/// Application directory paths following the XDG Base Directory layout.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/ctf-recon)
    pub config_dir: PathBuf,
    /// Data directory (~/.local/share/ctf-recon)
    pub data_dir: PathBuf,
}

impl Paths {
    /// Get the global paths instance, creating the directories on first use.
    pub fn get() -> ConfigResult<&'static Paths> {
        if let Some(paths) = PATHS.get() {
            return Ok(paths);
        }
        let paths = Self::new()?;
        Ok(PATHS.get_or_init(|| paths))
    }

    fn new() -> ConfigResult<Self> {
        let project = ProjectDirs::from("com", "ctf-recon", "ctf-recon")
            .ok_or(ConfigError::DirectoryNotFound)?;

        let paths = Self {
            config_dir: project.config_dir().to_path_buf(),
            data_dir: project.data_dir().to_path_buf(),
        };

        fs::create_dir_all(&paths.config_dir)?;
        fs::create_dir_all(&paths.data_dir)?;

        Ok(paths)
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    /// Get the path to the scans storage directory.
    pub fn scans_dir(&self) -> PathBuf {
        self.data_dir.join("scans")
    }
}

/// Port scan defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortSettings {
    pub start: u32,
    pub end: u32,
    pub concurrency: usize,
    pub timeout_ms: u64,
}

impl Default for PortSettings {
    fn default() -> Self {
        Self {
            start: 1,
            end: 1024,
            concurrency: 100,
            timeout_ms: 500,
        }
    }
}

/// Subdomain enumeration defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubdomainSettings {
    pub wordlist: PathBuf,
    pub concurrency: usize,
    pub timeout_ms: u64,
}

impl Default for SubdomainSettings {
    fn default() -> Self {
        Self {
            wordlist: PathBuf::from("wordlists/subdomains.txt"),
            concurrency: 50,
            timeout_ms: 3000,
        }
    }
}

/// Directory brute force defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirSettings {
    pub wordlist: PathBuf,
    pub extensions: Vec<String>,
    pub concurrency: usize,
    pub timeout_ms: u64,
}

impl Default for DirSettings {
    fn default() -> Self {
        Self {
            wordlist: PathBuf::from("wordlists/dirs.txt"),
            extensions: ["", ".php", ".html", ".txt", ".bak"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            concurrency: 30,
            timeout_ms: 5000,
        }
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub ports: PortSettings,
    pub subdomains: SubdomainSettings,
    pub dirs: DirSettings,
    /// `User-Agent` for HTTP probes and the header snapshot.
    pub user_agent: String,
    /// Where the recon pipeline writes its artifacts.
    pub output_dir: PathBuf,
    /// Default output format.
    pub default_output_format: OutputFormat,
    /// Auto-save scan results to history.
    pub auto_save_scans: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            ports: PortSettings::default(),
            subdomains: SubdomainSettings::default(),
            dirs: DirSettings::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            output_dir: PathBuf::from("output"),
            default_output_format: OutputFormat::Plain,
            auto_save_scans: true,
        }
    }
}

impl AppSettings {
    /// Load settings from the default location, or defaults if none exist.
    pub fn load() -> ConfigResult<Self> {
        let file = Paths::get()?.settings_file();
        if !file.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    /// Load from `--config` when given, otherwise from the default location.
    pub fn resolve(explicit: Option<&Path>) -> ConfigResult<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => Self::load(),
        }
    }

    /// Save settings to a specific file.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        fs::write(path, content).map_err(|e| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn port_timeout(&self) -> Duration {
        Duration::from_millis(self.ports.timeout_ms)
    }

    pub fn subdomain_timeout(&self) -> Duration {
        Duration::from_millis(self.subdomains.timeout_ms)
    }

    pub fn dir_timeout(&self) -> Duration {
        Duration::from_millis(self.dirs.timeout_ms)
    }
}
