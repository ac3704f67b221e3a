//! Partial identity set.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

use crate::utils::path::normalize_path;

/// Canonical paths of every file registered as a partial this session.
///
/// Grows on each discovery and never shrinks. A stale entry (deleted file)
/// only means a change to that path would still force a reload.
#[derive(Debug, Default, Clone)]
pub struct PartialSet {
    paths: FxHashSet<PathBuf>,
}

impl PartialSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a canonical path. Returns `true` if it was not present.
    pub fn insert(&mut self, canonical: PathBuf) -> bool {
        self.paths.insert(canonical)
    }

    /// Membership test for an already canonical path.
    #[inline]
    pub fn contains(&self, canonical: &Path) -> bool {
        self.paths.contains(canonical)
    }

    /// Membership test that canonicalizes `path` first.
    pub fn contains_file(&self, path: &Path) -> bool {
        self.contains(&normalize_path(path))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }
}
