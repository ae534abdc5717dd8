use crate::error::{Error, Result};
use crate::scanner::ScanFailure;
use crate::snapshot::RelativePath;
use glob::Pattern;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Result of walking one root: every regular file found, plus the entries
/// below the root that could not be listed.
#[derive(Debug, Default)]
pub struct Listing {
    pub files: Vec<(RelativePath, PathBuf)>,
    pub failures: Vec<ScanFailure>,
}

/// Iterative depth-first traversal of `root`. Returns every regular file as
/// its relative key plus absolute path. Links are not followed; symlinks and
/// special files are skipped, as is anything matching an ignore pattern.
///
/// A directory below the root that cannot be read is recorded in
/// [`Listing::failures`] and the walk continues. Failing to read the root
/// itself is an error.
pub fn collect_files(root: &Path, ignore_patterns: &[Pattern]) -> Result<Listing> {
    let mut listing = Listing::default();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| !is_ignored(root, entry, ignore_patterns));

    for entry_result in walker {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(err) => {
                let rel = err.path().and_then(|path| relative_key(root, path));
                match rel {
                    Some(path) if err.depth() > 0 => listing.failures.push(ScanFailure {
                        path,
                        error: io::Error::from(err),
                    }),
                    _ => {
                        return Err(Error::Walk {
                            root: root.to_path_buf(),
                            source: err,
                        })
                    }
                }
                continue;
            }
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            continue;
        }
        if !file_type.is_file() {
            debug!("Skipping non-regular entry {}", entry.path().display());
            continue;
        }

        match relative_key(root, entry.path()) {
            Some(rel) => listing.files.push((rel, entry.into_path())),
            None => warn!(
                "Skipping file with unsupported name: {}",
                entry.path().display()
            ),
        }
    }

    Ok(listing)
}

fn relative_key(root: &Path, path: &Path) -> Option<RelativePath> {
    path.strip_prefix(root)
        .ok()
        .and_then(RelativePath::from_relative)
}

fn is_ignored(root: &Path, entry: &DirEntry, ignore_patterns: &[Pattern]) -> bool {
    if ignore_patterns.is_empty() {
        return false;
    }
    match relative_key(root, entry.path()) {
        Some(rel) => ignore_patterns
            .iter()
            .any(|pattern| pattern.matches(rel.as_str())),
        None => false,
    }
}
