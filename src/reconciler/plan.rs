use crate::snapshot::{RelativePath, TreeSnapshot};

/// The three disjoint path groups that turn `destination` into `source`.
/// Built once per cycle and executed immediately; never persisted.
///
/// Paths the source scan could not read are left out of every group, so an
/// unreadable source file never causes its destination copy to be removed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncPlan {
    /// In source, absent from destination.
    pub create: Vec<RelativePath>,
    /// In both with differing fingerprints, or unreadable in destination.
    pub update: Vec<RelativePath>,
    /// In destination, neither present nor unreadable in source.
    pub delete: Vec<RelativePath>,
}

impl SyncPlan {
    pub fn between(source: &TreeSnapshot, destination: &TreeSnapshot) -> Self {
        let mut plan = Self::default();

        for (path, source_fingerprint) in source {
            if destination.is_unreadable(path) {
                plan.update.push(path.clone());
                continue;
            }
            match destination.get(path) {
                None => plan.create.push(path.clone()),
                Some(dest_fingerprint) if dest_fingerprint != source_fingerprint => {
                    plan.update.push(path.clone())
                }
                Some(_) => {}
            }
        }

        plan.delete = destination
            .paths()
            .filter(|path| !source.contains(path) && !source.is_unreadable(path))
            .cloned()
            .collect();

        plan
    }

    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.update.is_empty() && self.delete.is_empty()
    }

    /// Total number of file operations in the plan.
    pub fn len(&self) -> usize {
        self.create.len() + self.update.len() + self.delete.len()
    }
}
