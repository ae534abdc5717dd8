use clap::Parser;
use folder_sync::{FileConfig, HashAlgorithm};
use std::path::PathBuf;

#[derive(Debug, Parser)] // requires `derive` feature
#[command(name = "folder-sync")]
#[command(about = "Keep a destination folder in one-way sync with a source folder", long_about = None)]
pub struct Cli {
    /// Source root directory
    #[arg(short, long, value_name = "PATH")]
    pub source: Option<PathBuf>,

    /// Destination root directory
    #[arg(short, long, value_name = "PATH")]
    pub destination: Option<PathBuf>,

    /// Polling interval in milliseconds
    #[arg(
        short,
        long,
        value_name = "MILLISECONDS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval: Option<u64>,

    /// Log file; every line is also echoed to stdout
    #[arg(short, long, value_name = "PATH")]
    pub log: Option<PathBuf>,

    /// TOML file providing defaults for any of these options
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Content hash used to detect changed files
    #[arg(long, value_enum, value_name = "ALGORITHM")]
    pub hash: Option<HashAlgorithm>,

    /// Glob of relative paths to leave out of the sync (repeatable)
    #[arg(short = 'x', long = "ignore", value_name = "GLOB")]
    pub ignore: Vec<String>,

    /// Also log snapshot dumps and cycle summaries
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Command-line values as a config layer to put over the config file.
    pub fn overrides(&self) -> FileConfig {
        FileConfig {
            source: self.source.clone(),
            destination: self.destination.clone(),
            interval_ms: self.interval,
            log_file: self.log.clone(),
            log_level: self.verbose.then(|| "debug".to_string()),
            hash_algorithm: self.hash,
            ignore_patterns: self.ignore.clone(),
        }
    }
}
