use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Missing required options: {}", .0.join(", "))]
    MissingOptions(Vec<&'static str>),

    #[error("Root directory not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("Root is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error(
        "Source {} and destination {} overlap",
        source_root.display(),
        destination_root.display()
    )]
    OverlappingRoots {
        source_root: PathBuf,
        destination_root: PathBuf,
    },

    #[error("Error walking {}: {source}", root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Invalid ignore pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

impl Error {
    /// True for errors about the sync roots themselves rather than a single
    /// file inside them.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Error::RootNotFound(_) | Error::NotADirectory(_) | Error::OverlappingRoots { .. }
        )
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
