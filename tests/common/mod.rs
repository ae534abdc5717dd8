#![allow(dead_code)]

use folder_sync::{
    Error, HashAlgorithm, Operation, RelativePath, SyncReporter, SyncSummary, TreeScanner,
    TreeSnapshot,
};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

/// Everything a reporter can be told, flattened for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    CycleStart(u64),
    Unreadable(String),
    Snapshots { source: usize, destination: usize },
    InSync,
    Create(String),
    Update(String),
    Delete(String),
    PruneDir(String),
    ReplaceEntry(String),
    Failed(Operation, String),
    CycleComplete(SyncSummary),
    CycleFailed(String),
}

#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<Event>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    /// Only the per-path file operations, including replaced links and failures.
    pub fn operations(&self) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|event| {
                matches!(
                    event,
                    Event::Create(_)
                        | Event::Update(_)
                        | Event::Delete(_)
                        | Event::PruneDir(_)
                        | Event::ReplaceEntry(_)
                        | Event::Failed(..)
                )
            })
            .collect()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl SyncReporter for RecordingReporter {
    fn on_cycle_start(&self, cycle: u64) {
        self.push(Event::CycleStart(cycle));
    }

    fn on_unreadable(&self, _root: &Path, path: &RelativePath, _error: &io::Error) {
        self.push(Event::Unreadable(path.to_string()));
    }

    fn on_snapshots(&self, source: &TreeSnapshot, destination: &TreeSnapshot) {
        self.push(Event::Snapshots {
            source: source.len(),
            destination: destination.len(),
        });
    }

    fn on_in_sync(&self) {
        self.push(Event::InSync);
    }

    fn on_create(&self, path: &RelativePath) {
        self.push(Event::Create(path.to_string()));
    }

    fn on_update(&self, path: &RelativePath) {
        self.push(Event::Update(path.to_string()));
    }

    fn on_delete(&self, path: &RelativePath) {
        self.push(Event::Delete(path.to_string()));
    }

    fn on_prune_dir(&self, path: &RelativePath) {
        self.push(Event::PruneDir(path.to_string()));
    }

    fn on_replace_entry(&self, path: &RelativePath) {
        self.push(Event::ReplaceEntry(path.to_string()));
    }

    fn on_operation_failed(&self, operation: Operation, path: &RelativePath, _error: &io::Error) {
        self.push(Event::Failed(operation, path.to_string()));
    }

    fn on_cycle_complete(&self, summary: &SyncSummary, _duration: Duration) {
        self.push(Event::CycleComplete(*summary));
    }

    fn on_cycle_failed(&self, error: &Error) {
        self.push(Event::CycleFailed(error.to_string()));
    }
}

pub fn write_file(root: &Path, rel: &str, content: impl AsRef<[u8]>) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

pub fn scan(root: &Path) -> TreeSnapshot {
    TreeScanner::new(HashAlgorithm::Xxhash64, &[])
        .unwrap()
        .scan(root)
        .unwrap()
}
