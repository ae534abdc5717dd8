use crate::progress::SyncReporter;
use crate::snapshot::{RelativePath, TreeSnapshot};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

mod plan;

pub use plan::SyncPlan;

/// A single filesystem operation against the destination tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Delete,
    PruneDir,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self {
            Operation::Create => "create file",
            Operation::Update => "copy file",
            Operation::Delete => "remove file",
            Operation::PruneDir => "remove directory",
        };
        f.write_str(action)
    }
}

/// Counts of what one reconciliation actually did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncSummary {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub pruned_dirs: usize,
    pub failed: usize,
    /// Entries either scan could not read. They are retried next cycle.
    pub unreadable: usize,
}

impl SyncSummary {
    /// Number of successful file copies (creates and updates).
    pub fn copies(&self) -> usize {
        self.created + self.updated
    }

    pub fn is_noop(&self) -> bool {
        *self == SyncSummary::default()
    }
}

/// Makes the destination root hold exactly the source root's files.
///
/// Each path is handled independently: a failed operation is reported and
/// counted, and the rest of the plan still runs.
pub struct Reconciler<'a> {
    source_root: &'a Path,
    destination_root: &'a Path,
    reporter: &'a dyn SyncReporter,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        source_root: &'a Path,
        destination_root: &'a Path,
        reporter: &'a dyn SyncReporter,
    ) -> Self {
        Self {
            source_root,
            destination_root,
            reporter,
        }
    }

    pub fn reconcile(&self, source: &TreeSnapshot, destination: &TreeSnapshot) -> SyncSummary {
        let plan = if source == destination {
            SyncPlan::default()
        } else {
            SyncPlan::between(source, destination)
        };
        // Unreadable entries can make the snapshots differ with nothing to do.
        if plan.is_empty() {
            self.reporter.on_in_sync();
            return SyncSummary::default();
        }
        self.apply(&plan)
    }

    /// Forward pass (creates, updates) then reverse pass (deletes).
    pub fn apply(&self, plan: &SyncPlan) -> SyncSummary {
        let mut summary = SyncSummary::default();

        for path in &plan.create {
            self.reporter.on_create(path);
            match self.create_file(path) {
                Ok(()) => summary.created += 1,
                Err(err) => self.record_failure(Operation::Create, path, &err, &mut summary),
            }
        }

        for path in &plan.update {
            self.reporter.on_update(path);
            match self.copy_file(path) {
                Ok(()) => summary.updated += 1,
                Err(err) => self.record_failure(Operation::Update, path, &err, &mut summary),
            }
        }

        for path in &plan.delete {
            self.reporter.on_delete(path);
            match fs::remove_file(path.to_path(self.destination_root)) {
                Ok(()) => {
                    summary.deleted += 1;
                    self.prune_parent(path, &mut summary);
                }
                Err(err) => self.record_failure(Operation::Delete, path, &err, &mut summary),
            }
        }

        summary
    }

    fn create_file(&self, path: &RelativePath) -> io::Result<()> {
        let target = self.prepare_target(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(path.to_path(self.source_root), &target)?;
        Ok(())
    }

    fn copy_file(&self, path: &RelativePath) -> io::Result<()> {
        let target = self.prepare_target(path)?;
        fs::copy(path.to_path(self.source_root), &target)?;
        Ok(())
    }

    /// Resolve `path` in the destination so that writing it cannot leave the
    /// destination root. The scan never follows links, so a symlink (or other
    /// non-regular entry) at the target or at one of its parent directories is
    /// invisible to it; such an entry is removed here and replaced by the real
    /// file or directory.
    fn prepare_target(&self, path: &RelativePath) -> io::Result<PathBuf> {
        for dir in path.ancestors() {
            let dir_path = dir.to_path(self.destination_root);
            match fs::symlink_metadata(&dir_path) {
                Ok(metadata) if metadata.file_type().is_symlink() => {
                    self.reporter.on_replace_entry(&dir);
                    remove_link(&dir_path)?;
                }
                Ok(_) => {}
                // The rest of the chain does not exist yet either.
                Err(err) if err.kind() == io::ErrorKind::NotFound => break,
                Err(err) => return Err(err),
            }
        }

        let target = path.to_path(self.destination_root);
        match fs::symlink_metadata(&target) {
            Ok(metadata) if metadata.is_file() || metadata.is_dir() => {}
            Ok(_) => {
                self.reporter.on_replace_entry(path);
                remove_link(&target)?;
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err),
        }
        Ok(target)
    }

    /// Remove the immediate parent of a deleted file if it is now empty.
    /// Single level only; the destination root itself is never removed.
    fn prune_parent(&self, path: &RelativePath, summary: &mut SyncSummary) {
        let Some(parent) = path.parent() else {
            return;
        };
        let dir = parent.to_path(self.destination_root);

        match is_empty_dir(&dir) {
            Ok(true) => {
                self.reporter.on_prune_dir(&parent);
                match fs::remove_dir(&dir) {
                    Ok(()) => summary.pruned_dirs += 1,
                    Err(err) => self.record_failure(Operation::PruneDir, &parent, &err, summary),
                }
            }
            Ok(false) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => self.record_failure(Operation::PruneDir, &parent, &err, summary),
        }
    }

    fn record_failure(
        &self,
        operation: Operation,
        path: &RelativePath,
        err: &io::Error,
        summary: &mut SyncSummary,
    ) {
        self.reporter.on_operation_failed(operation, path, err);
        summary.failed += 1;
    }
}

/// Remove a symlink or special file without touching what a link points to.
fn remove_link(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        // Directory symlinks on Windows.
        Err(err) => fs::remove_dir(path).map_err(|_| err),
    }
}

fn is_empty_dir(dir: &Path) -> io::Result<bool> {
    Ok(fs::read_dir(dir)?.next().is_none())
}
