use crate::error::{Error, Result};
use crate::hasher::HashAlgorithm;
use config::{Config, ConfigError, File as ConfigFile, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Settings as read from a TOML file or collected from the command line.
/// Every field is optional until [`FileConfig::resolve`] checks what is
/// required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub source: Option<PathBuf>,
    pub destination: Option<PathBuf>,
    pub interval_ms: Option<u64>,
    pub log_file: Option<PathBuf>,
    pub log_level: Option<String>,
    pub hash_algorithm: Option<HashAlgorithm>,
    pub ignore_patterns: Vec<String>,
}

/// What the sync engine needs to run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub interval: Duration,
    pub hash_algorithm: HashAlgorithm,
    pub ignore_patterns: Vec<String>,
}

/// Fully resolved settings for one process.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub sync: SyncOptions,
    pub log_file: PathBuf,
    pub log_level: String,
}

pub fn load_configuration(path: &Path) -> Result<FileConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::from(path).format(FileFormat::Toml).required(true))
        .build()?;
    builder.try_deserialize::<FileConfig>()
}

impl FileConfig {
    /// Layer `overrides` on top of `self`. Set values in `overrides` win;
    /// ignore patterns from both are kept.
    pub fn merge(self, overrides: FileConfig) -> FileConfig {
        let mut ignore_patterns = self.ignore_patterns;
        ignore_patterns.extend(overrides.ignore_patterns);

        FileConfig {
            source: overrides.source.or(self.source),
            destination: overrides.destination.or(self.destination),
            interval_ms: overrides.interval_ms.or(self.interval_ms),
            log_file: overrides.log_file.or(self.log_file),
            log_level: overrides.log_level.or(self.log_level),
            hash_algorithm: overrides.hash_algorithm.or(self.hash_algorithm),
            ignore_patterns,
        }
    }

    pub fn resolve(self) -> Result<AppConfig> {
        let mut missing = Vec::new();
        if self.source.is_none() {
            missing.push("--source");
        }
        if self.destination.is_none() {
            missing.push("--destination");
        }
        if self.interval_ms.is_none() {
            missing.push("--interval");
        }
        if self.log_file.is_none() {
            missing.push("--log");
        }

        match (self.source, self.destination, self.interval_ms, self.log_file) {
            (Some(source), Some(destination), Some(interval_ms), Some(log_file)) => {
                if interval_ms == 0 {
                    return Err(Error::Config(ConfigError::Message(
                        "interval must be a positive number of milliseconds".to_string(),
                    )));
                }
                Ok(AppConfig {
                    sync: SyncOptions {
                        source,
                        destination,
                        interval: Duration::from_millis(interval_ms),
                        hash_algorithm: self.hash_algorithm.unwrap_or_default(),
                        ignore_patterns: self.ignore_patterns,
                    },
                    log_file,
                    log_level: self
                        .log_level
                        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
                })
            }
            _ => Err(Error::MissingOptions(missing)),
        }
    }
}

/// True when either directory contains the other (or they are the same).
/// Syncing overlapping roots would copy the tree into itself.
pub fn roots_overlap(first: &Path, second: &Path) -> bool {
    first.starts_with(second) || second.starts_with(first)
}
