use crate::hasher::Fingerprint;
use std::collections::btree_map::{self, BTreeMap};
use std::collections::btree_set::{self, BTreeSet};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// A file location relative to a sync root, always `/`-separated so the same
/// key is produced no matter where the root lives or which platform scanned it.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelativePath(String);

impl RelativePath {
    /// Build from a path already stripped of its root. Returns `None` for an
    /// empty path, for `..`/absolute components, or for names that are not
    /// valid UTF-8.
    pub fn from_relative(path: &Path) -> Option<Self> {
        let mut segments: Vec<&str> = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(name) => segments.push(name.to_str()?),
                Component::CurDir => {}
                _ => return None,
            }
        }

        if segments.is_empty() {
            return None;
        }
        Some(Self(segments.join("/")))
    }

    /// Parse a `/`-separated key. Rejects empty input and `.`/`..` or empty
    /// segments.
    pub fn parse(path: &str) -> Option<Self> {
        let valid = path
            .split('/')
            .all(|segment| !matches!(segment, "" | "." | "..") && !segment.contains('\\'));
        valid.then(|| Self(path.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve against a root directory.
    pub fn to_path(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        for segment in self.0.split('/') {
            path.push(segment);
        }
        path
    }

    /// The containing directory, or `None` for a file directly under the root.
    pub fn parent(&self) -> Option<RelativePath> {
        self.0
            .rsplit_once('/')
            .map(|(parent, _)| RelativePath(parent.to_string()))
    }

    /// Every proper ancestor directory, outermost first.
    pub fn ancestors(&self) -> impl Iterator<Item = RelativePath> + '_ {
        self.0
            .match_indices('/')
            .map(|(end, _)| RelativePath(self.0[..end].to_string()))
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

#[cfg(test)]
impl From<&str> for RelativePath {
    fn from(path: &str) -> Self {
        RelativePath::parse(path).expect("valid relative path")
    }
}

/// The complete path → fingerprint state of one root at one instant.
///
/// Entries that were found but could not be read (a file that failed to hash,
/// a directory that could not be listed) are kept apart in `unreadable`: their
/// content is unknown, so they must be neither treated as present nor as absent.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TreeSnapshot {
    files: BTreeMap<RelativePath, Fingerprint>,
    unreadable: BTreeSet<RelativePath>,
}

impl TreeSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: RelativePath, fingerprint: Fingerprint) -> Option<Fingerprint> {
        self.files.insert(path, fingerprint)
    }

    pub fn get(&self, path: &RelativePath) -> Option<&Fingerprint> {
        self.files.get(path)
    }

    pub fn contains(&self, path: &RelativePath) -> bool {
        self.files.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, RelativePath, Fingerprint> {
        self.files.iter()
    }

    pub fn paths(&self) -> btree_map::Keys<'_, RelativePath, Fingerprint> {
        self.files.keys()
    }

    /// Record an entry whose content could not be read. Any fingerprint
    /// already recorded for it is dropped.
    pub fn mark_unreadable(&mut self, path: RelativePath) {
        self.files.remove(&path);
        self.unreadable.insert(path);
    }

    /// Entries recorded with [`mark_unreadable`](Self::mark_unreadable).
    pub fn unreadable(&self) -> btree_set::Iter<'_, RelativePath> {
        self.unreadable.iter()
    }

    /// Whether `path` itself, or a directory containing it, could not be read.
    pub fn is_unreadable(&self, path: &RelativePath) -> bool {
        if self.unreadable.is_empty() {
            return false;
        }
        self.unreadable.contains(path) || path.ancestors().any(|dir| self.unreadable.contains(&dir))
    }
}

impl From<BTreeMap<RelativePath, Fingerprint>> for TreeSnapshot {
    fn from(files: BTreeMap<RelativePath, Fingerprint>) -> Self {
        Self {
            files,
            unreadable: BTreeSet::new(),
        }
    }
}

impl FromIterator<(RelativePath, Fingerprint)> for TreeSnapshot {
    fn from_iter<I: IntoIterator<Item = (RelativePath, Fingerprint)>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().collect(),
            unreadable: BTreeSet::new(),
        }
    }
}

impl<'a> IntoIterator for &'a TreeSnapshot {
    type Item = (&'a RelativePath, &'a Fingerprint);
    type IntoIter = btree_map::Iter<'a, RelativePath, Fingerprint>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

impl fmt::Debug for TreeSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unreadable.is_empty() {
            return f.debug_map().entries(self.files.iter()).finish();
        }
        f.debug_struct("TreeSnapshot")
            .field("files", &self.files)
            .field("unreadable", &self.unreadable)
            .finish()
    }
}
