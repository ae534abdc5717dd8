use crate::error::{Error, Result};
use crate::hasher::{self, Fingerprint, HashAlgorithm};
use crate::snapshot::{RelativePath, TreeSnapshot};
use glob::Pattern;
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

pub mod walk;

/// An entry found during a scan whose content could not be read.
#[derive(Debug)]
pub struct ScanFailure {
    pub path: RelativePath,
    pub error: io::Error,
}

/// A snapshot plus the per-entry failures behind its unreadable set.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub snapshot: TreeSnapshot,
    pub failures: Vec<ScanFailure>,
}

/// Builds a [`TreeSnapshot`] of a root directory. Read-only.
#[derive(Debug, Clone)]
pub struct TreeScanner {
    algorithm: HashAlgorithm,
    ignore_patterns: Vec<Pattern>,
}

impl TreeScanner {
    pub fn new(algorithm: HashAlgorithm, ignore_globs: &[String]) -> Result<Self> {
        let ignore_patterns = ignore_globs
            .iter()
            .map(|glob| {
                Pattern::new(glob).map_err(|source| Error::Pattern {
                    pattern: glob.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            algorithm,
            ignore_patterns,
        })
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Like [`scan_with_failures`](Self::scan_with_failures), keeping only the
    /// snapshot.
    pub fn scan(&self, root: &Path) -> Result<TreeSnapshot> {
        self.scan_with_failures(root).map(|outcome| outcome.snapshot)
    }

    /// Walk `root` and fingerprint every regular file under it, hashing in
    /// parallel. Only a bad root fails the scan; a file that cannot be hashed
    /// or a directory that cannot be listed is marked unreadable in the
    /// snapshot and returned as a [`ScanFailure`].
    pub fn scan_with_failures(&self, root: &Path) -> Result<ScanOutcome> {
        check_root(root)?;

        let scan_start = Instant::now();
        let listing = walk::collect_files(root, &self.ignore_patterns)?;
        let (fingerprints, hash_failures) = fingerprint_all(listing.files, self.algorithm);

        let mut snapshot: TreeSnapshot = fingerprints.into_iter().collect();
        let mut failures = listing.failures;
        failures.extend(hash_failures);
        for failure in &failures {
            snapshot.mark_unreadable(failure.path.clone());
        }

        debug!(
            "Scanned {} in {:.2}s: {} files, {} unreadable",
            root.display(),
            scan_start.elapsed().as_secs_f64(),
            snapshot.len(),
            failures.len()
        );

        Ok(ScanOutcome { snapshot, failures })
    }
}

fn fingerprint_all(
    files: Vec<(RelativePath, PathBuf)>,
    algorithm: HashAlgorithm,
) -> (Vec<(RelativePath, Fingerprint)>, Vec<ScanFailure>) {
    let results: Vec<_> = files
        .into_par_iter()
        .map(|(rel, path)| match hasher::fingerprint_file(&path, algorithm) {
            Ok(fingerprint) => Ok((rel, fingerprint)),
            Err(error) => Err(ScanFailure { path: rel, error }),
        })
        .collect();

    let mut fingerprints = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(entry) => fingerprints.push(entry),
            Err(failure) => failures.push(failure),
        }
    }
    (fingerprints, failures)
}

/// A root must exist and be a directory.
pub fn check_root(root: &Path) -> Result<()> {
    match fs::metadata(root) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(Error::NotADirectory(root.to_path_buf())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            Err(Error::RootNotFound(root.to_path_buf()))
        }
        Err(err) => Err(Error::Io(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn keys(snapshot: &TreeSnapshot) -> Vec<String> {
        snapshot.paths().map(|p| p.to_string()).collect()
    }

    /// Layout:
    ///   root/
    ///     top.txt
    ///     sub/
    ///       file.txt
    ///       deeper/
    ///         leaf.bin
    ///     empty/
    fn create_test_tree(root: &Path) {
        fs::create_dir_all(root.join("sub").join("deeper")).unwrap();
        fs::create_dir_all(root.join("empty")).unwrap();
        fs::write(root.join("top.txt"), "top").unwrap();
        fs::write(root.join("sub").join("file.txt"), "file").unwrap();
        fs::write(root.join("sub").join("deeper").join("leaf.bin"), [0xAAu8; 16]).unwrap();
    }

    fn scanner() -> TreeScanner {
        TreeScanner::new(HashAlgorithm::Xxhash64, &[]).unwrap()
    }

    #[test]
    fn test_scan_nested_tree() {
        let tmp = tempdir().unwrap();
        create_test_tree(tmp.path());

        let snapshot = scanner().scan(tmp.path()).unwrap();
        assert_eq!(
            keys(&snapshot),
            vec!["sub/deeper/leaf.bin", "sub/file.txt", "top.txt"]
        );
    }

    #[test]
    fn test_empty_directories_are_invisible() {
        let tmp = tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("a").join("b")).unwrap();

        let snapshot = scanner().scan(tmp.path()).unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_relative_keys_independent_of_root_location() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        let nested_root = second.path().join("some").join("other").join("place");
        create_test_tree(first.path());
        create_test_tree(&nested_root);

        let a = scanner().scan(first.path()).unwrap();
        let b = scanner().scan(&nested_root).unwrap();
        assert_eq!(keys(&a), keys(&b));
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_root_is_not_found() {
        let tmp = tempdir().unwrap();
        let missing = tmp.path().join("nope");
        match scanner().scan(&missing) {
            Err(Error::RootNotFound(path)) => assert_eq!(path, missing),
            other => panic!("expected RootNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_file_root_is_not_a_directory() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("plain.txt");
        fs::write(&file, "x").unwrap();
        assert!(matches!(
            scanner().scan(&file),
            Err(Error::NotADirectory(_))
        ));
    }

    #[test]
    fn test_ignore_patterns_hide_files_and_directories() {
        let tmp = tempdir().unwrap();
        create_test_tree(tmp.path());
        fs::write(tmp.path().join("scratch.tmp"), "tmp").unwrap();

        let scanner = TreeScanner::new(
            HashAlgorithm::Xxhash64,
            &["*.tmp".to_string(), "sub/deeper".to_string()],
        )
        .unwrap();
        let snapshot = scanner.scan(tmp.path()).unwrap();
        assert_eq!(keys(&snapshot), vec!["sub/file.txt", "top.txt"]);
    }

    #[test]
    fn test_invalid_ignore_pattern_rejected() {
        let result = TreeScanner::new(HashAlgorithm::Xxhash64, &["[".to_string()]);
        assert!(matches!(result, Err(Error::Pattern { .. })));
    }

    #[test]
    fn test_scan_does_not_touch_filesystem() {
        let tmp = tempdir().unwrap();
        create_test_tree(tmp.path());

        let listed = |root: &Path| -> Vec<RelativePath> {
            walk::collect_files(root, &[])
                .unwrap()
                .files
                .into_iter()
                .map(|(rel, _)| rel)
                .collect()
        };

        let before = listed(tmp.path());
        scanner().scan(tmp.path()).unwrap();
        assert_eq!(before, listed(tmp.path()));
        assert!(tmp.path().join("empty").is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_skipped() {
        let tmp = tempdir().unwrap();
        create_test_tree(tmp.path());
        std::os::unix::fs::symlink(tmp.path().join("top.txt"), tmp.path().join("link.txt"))
            .unwrap();
        std::os::unix::fs::symlink(tmp.path().join("sub"), tmp.path().join("linkdir")).unwrap();

        let snapshot = scanner().scan(tmp.path()).unwrap();
        assert!(!snapshot.contains(&RelativePath::from("link.txt")));
        assert!(!snapshot.contains(&RelativePath::from("linkdir/file.txt")));
        assert_eq!(snapshot.len(), 3);
    }

    #[test]
    fn test_file_that_fails_to_hash_is_marked_unreadable() {
        let tmp = tempdir().unwrap();
        create_test_tree(tmp.path());

        // A file that disappears between listing and hashing.
        let files = vec![
            (RelativePath::from("top.txt"), tmp.path().join("top.txt")),
            (RelativePath::from("gone.txt"), tmp.path().join("gone.txt")),
        ];
        let (fingerprints, failures) = fingerprint_all(files, HashAlgorithm::Xxhash64);

        assert_eq!(fingerprints.len(), 1);
        assert_eq!(fingerprints[0].0, RelativePath::from("top.txt"));
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].path, RelativePath::from("gone.txt"));
        assert_eq!(failures[0].error.kind(), io::ErrorKind::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_does_not_fail_scan() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempdir().unwrap();
        create_test_tree(tmp.path());
        let locked = tmp.path().join("locked.txt");
        fs::write(&locked, "secret").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read(&locked).is_ok() {
            // Permission bits are not enforced for this user (root).
            return;
        }

        let outcome = scanner().scan_with_failures(tmp.path()).unwrap();
        assert_eq!(
            keys(&outcome.snapshot),
            vec!["sub/deeper/leaf.bin", "sub/file.txt", "top.txt"]
        );
        assert!(outcome.snapshot.is_unreadable(&RelativePath::from("locked.txt")));
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].path, RelativePath::from("locked.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_unlistable_directory_does_not_fail_scan() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempdir().unwrap();
        create_test_tree(tmp.path());
        let sealed = tmp.path().join("sub").join("deeper");
        fs::set_permissions(&sealed, fs::Permissions::from_mode(0o000)).unwrap();
        let readable = fs::read_dir(&sealed).is_ok();
        if readable {
            fs::set_permissions(&sealed, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let outcome = scanner().scan_with_failures(tmp.path()).unwrap();
        fs::set_permissions(&sealed, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(keys(&outcome.snapshot), vec!["sub/file.txt", "top.txt"]);
        assert!(outcome
            .snapshot
            .is_unreadable(&RelativePath::from("sub/deeper/leaf.bin")));
        assert_eq!(outcome.failures[0].path, RelativePath::from("sub/deeper"));
    }
}
