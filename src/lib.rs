pub mod config;
pub mod engine;
pub mod error;
pub mod hasher;
pub mod progress;
pub mod reconciler;
pub mod scanner;
pub mod shutdown;
pub mod snapshot;

pub use crate::config::{AppConfig, FileConfig, SyncOptions};
pub use crate::engine::SyncEngine;
pub use crate::error::{Error, Result};
pub use crate::hasher::{Fingerprint, HashAlgorithm};
pub use crate::progress::{LogReporter, SilentReporter, SyncReporter};
pub use crate::reconciler::{Operation, Reconciler, SyncPlan, SyncSummary};
pub use crate::scanner::{ScanFailure, ScanOutcome, TreeScanner};
pub use crate::shutdown::Shutdown;
pub use crate::snapshot::{RelativePath, TreeSnapshot};
