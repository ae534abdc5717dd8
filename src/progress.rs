use crate::error::Error;
use crate::reconciler::{Operation, SyncSummary};
use crate::snapshot::{RelativePath, TreeSnapshot};
use indicatif::HumanDuration;
use std::io;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Trait for reporting sync activity.
///
/// The engine and reconciler report through this instead of a global logger,
/// so callers decide where events go. All methods have default no-op
/// implementations.
pub trait SyncReporter: Send + Sync {
    fn on_cycle_start(&self, _cycle: u64) {}
    fn on_unreadable(&self, _root: &Path, _path: &RelativePath, _error: &io::Error) {}
    fn on_snapshots(&self, _source: &TreeSnapshot, _destination: &TreeSnapshot) {}
    fn on_in_sync(&self) {}
    fn on_create(&self, _path: &RelativePath) {}
    fn on_update(&self, _path: &RelativePath) {}
    fn on_delete(&self, _path: &RelativePath) {}
    fn on_prune_dir(&self, _path: &RelativePath) {}
    fn on_replace_entry(&self, _path: &RelativePath) {}
    fn on_operation_failed(&self, _operation: Operation, _path: &RelativePath, _error: &io::Error) {}
    fn on_cycle_complete(&self, _summary: &SyncSummary, _duration: Duration) {}
    fn on_cycle_failed(&self, _error: &Error) {}
}

/// No-op reporter for silent operation.
pub struct SilentReporter;

impl SyncReporter for SilentReporter {}

/// Reporter that turns every event into a `tracing` event. Operations log at
/// INFO, failures and unreadable entries at ERROR, snapshot dumps and cycle
/// summaries at DEBUG.
pub struct LogReporter;

impl SyncReporter for LogReporter {
    fn on_cycle_start(&self, cycle: u64) {
        debug!("Starting sync cycle {}", cycle);
    }

    fn on_unreadable(&self, root: &Path, path: &RelativePath, err: &io::Error) {
        error!("Failed to read {}: {}", path.to_path(root).display(), err);
    }

    fn on_snapshots(&self, source: &TreeSnapshot, destination: &TreeSnapshot) {
        debug!("source files: {:?}", source);
        debug!("destination files: {:?}", destination);
    }

    fn on_in_sync(&self) {
        debug!("No changes in source folder");
    }

    fn on_create(&self, path: &RelativePath) {
        info!("Creating file: {}", path);
    }

    fn on_update(&self, path: &RelativePath) {
        info!("Copying file: {}", path);
    }

    fn on_delete(&self, path: &RelativePath) {
        info!("Removing file: {}", path);
    }

    fn on_prune_dir(&self, path: &RelativePath) {
        info!("Removing empty directory: {}", path);
    }

    fn on_replace_entry(&self, path: &RelativePath) {
        info!("Replacing link or special file: {}", path);
    }

    fn on_operation_failed(&self, operation: Operation, path: &RelativePath, err: &io::Error) {
        error!("Failed to {} {}: {}", operation, path, err);
    }

    fn on_cycle_complete(&self, summary: &SyncSummary, duration: Duration) {
        if summary.is_noop() {
            return;
        }
        if summary.failed > 0 {
            warn!(
                "Sync finished with {} failed operations, will retry next cycle",
                summary.failed
            );
        }
        if summary.unreadable > 0 {
            warn!(
                "Skipped {} unreadable entries, will retry next cycle",
                summary.unreadable
            );
        }
        debug!(
            "Sync cycle completed in {}: {} created, {} updated, {} deleted, {} directories removed",
            HumanDuration(duration),
            summary.created,
            summary.updated,
            summary.deleted,
            summary.pruned_dirs,
        );
    }

    fn on_cycle_failed(&self, err: &Error) {
        error!("Sync cycle skipped: {}", err);
    }
}
