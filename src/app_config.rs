use anyhow::{Context, Result};
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::file_utils::FileManager;

/// Application configuration module
/// This module handles loading, defaulting and saving the JSON options file.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Optional log file; may start with a path token such as `?user`
    #[serde(default)]
    pub log_file: Option<String>,

    /// Automation settings
    #[serde(default)]
    pub automation: AutomationConfig,

    /// Values the application stores back on every start
    #[serde(default)]
    pub app: AppState,
}

/// Automation script settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AutomationConfig {
    /// Pipe-delimited list of directories searched for scripts by relative name
    #[serde(default = "default_autoload")]
    pub autoload: String,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self { autoload: default_autoload() }
    }
}

impl AutomationConfig {
    /// Autoload directory entries in listed order, empty entries skipped
    pub fn autoload_dirs(&self) -> impl Iterator<Item = &str> {
        self.autoload.split('|').map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Bookkeeping persisted by the application itself
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct AppState {
    /// Version of the last run that started with this configuration
    #[serde(default)]
    pub last_version: String,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_autoload() -> String {
    "?user/automation/autoload/|?data/automation/autoload/".to_string()
}

/// Where a loaded configuration came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// Read from an existing file
    File,
    /// File did not exist; defaults were written out
    Created,
    /// File exists but could not be parsed; defaults are in use
    InvalidFallback,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: LogLevel::default(),
            log_file: None,
            automation: AutomationConfig::default(),
            app: AppState::default(),
        }
    }
}

impl Config {
    /// Load the configuration, creating a default file if none exists.
    ///
    /// A file that exists but does not parse is reported and left untouched;
    /// the defaults are used for this run.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<(Self, ConfigSource)> {
        let path = path.as_ref();

        if !path.exists() {
            warn!("Config file not found at {:?}, creating default config.", path);
            let config = Config::default();
            config.save(path)?;
            return Ok((config, ConfigSource::Created));
        }

        match Self::read(path) {
            Ok(config) => Ok((config, ConfigSource::File)),
            Err(e) => {
                error!("Configuration file is invalid. Error reported: {:#}", e);
                Ok((Config::default(), ConfigSource::InvalidFallback))
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {:?}", path))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Save the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        FileManager::write_to_file(path, &config_json)
            .with_context(|| format!("Failed to write config to file: {:?}", path))
    }

    /// Record the running version. Returns true when the stored value changed.
    pub fn remember_version(&mut self, version: &str) -> bool {
        if self.app.last_version == version {
            return false;
        }
        debug!("Updating last version from {:?} to {:?}", self.app.last_version, version);
        self.app.last_version = version.to_string();
        true
    }
}
