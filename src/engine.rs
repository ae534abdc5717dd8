use crate::config::{self, SyncOptions};
use crate::error::{Error, Result};
use crate::progress::SyncReporter;
use crate::reconciler::{Reconciler, SyncSummary};
use crate::scanner::{self, ScanOutcome, TreeScanner};
use crate::shutdown::Shutdown;
use indicatif::HumanDuration;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// The sync driver: scan both roots, reconcile, sleep, repeat.
///
/// Nothing is carried between cycles except the configured options; both
/// snapshots are rebuilt from scratch every time.
pub struct SyncEngine {
    options: SyncOptions,
    scanner: TreeScanner,
    reporter: Arc<dyn SyncReporter>,
}

impl SyncEngine {
    pub fn new(options: SyncOptions, reporter: Arc<dyn SyncReporter>) -> Result<Self> {
        let scanner = TreeScanner::new(options.hash_algorithm, &options.ignore_patterns)?;
        Ok(Self {
            options,
            scanner,
            reporter,
        })
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Both roots must be existing directories, and neither may contain the
    /// other.
    pub fn check_roots(&self) -> Result<()> {
        scanner::check_root(&self.options.source)?;
        scanner::check_root(&self.options.destination)?;

        let source_root = fs::canonicalize(&self.options.source)?;
        let destination_root = fs::canonicalize(&self.options.destination)?;
        if config::roots_overlap(&source_root, &destination_root) {
            return Err(Error::OverlappingRoots {
                source_root,
                destination_root,
            });
        }
        Ok(())
    }

    /// One reconciliation cycle. The two scans run concurrently; if either
    /// root cannot be scanned nothing in the destination is touched. Entries
    /// that could not be read are reported and reconciled around.
    pub fn run_cycle(&self) -> Result<SyncSummary> {
        let (source, destination) = rayon::join(
            || self.scanner.scan_with_failures(&self.options.source),
            || self.scanner.scan_with_failures(&self.options.destination),
        );
        let source = source?;
        let destination = destination?;

        self.report_failures(&self.options.source, &source);
        self.report_failures(&self.options.destination, &destination);
        self.reporter.on_snapshots(&source.snapshot, &destination.snapshot);

        let reconciler = Reconciler::new(
            &self.options.source,
            &self.options.destination,
            self.reporter.as_ref(),
        );
        let mut summary = reconciler.reconcile(&source.snapshot, &destination.snapshot);
        summary.unreadable = source.failures.len() + destination.failures.len();
        Ok(summary)
    }

    fn report_failures(&self, root: &Path, outcome: &ScanOutcome) {
        for failure in &outcome.failures {
            self.reporter.on_unreadable(root, &failure.path, &failure.error);
        }
    }

    /// Run cycles every `interval` until `shutdown` is triggered.
    ///
    /// Root problems found before the first cycle are returned as errors. After
    /// that, a failed cycle is reported and retried on the next tick.
    pub fn run(&self, shutdown: &Shutdown) -> Result<()> {
        self.check_roots()?;

        info!(
            "Syncing {} to {} every {} using {}",
            self.options.source.display(),
            self.options.destination.display(),
            HumanDuration(self.options.interval),
            self.options.hash_algorithm,
        );

        let mut cycle = 0u64;
        while !shutdown.is_triggered() {
            cycle += 1;
            self.reporter.on_cycle_start(cycle);

            let cycle_start = Instant::now();
            match self.run_cycle() {
                Ok(summary) => self
                    .reporter
                    .on_cycle_complete(&summary, cycle_start.elapsed()),
                Err(err) => self.reporter.on_cycle_failed(&err),
            }

            if shutdown.wait_timeout(self.options.interval) {
                break;
            }
        }

        info!("Sync stopped after {} cycles", cycle);
        Ok(())
    }
}
