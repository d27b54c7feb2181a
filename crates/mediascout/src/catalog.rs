//! Pass 1: walk a tree and catalog candidate files per directory
//!
//! The walk applies the banned-name matcher, the classifier and the
//! extension lists, and reports every decision to the event recorder.
//! Surviving files land in their parent directory's bucket, in walk order.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::cancel::CancellationToken;
use crate::error::Result;
use crate::events::{reason, EventRecorder, FileEvent, FileRef};
use crate::filters::ExtensionList;
use crate::media::{extension, Classifier, MediaKind};
use crate::patterns::NameMatcher;
use crate::tree::{parent_dir, SharedTree, ROOT};

/// Filtering configuration shared by every tree of a scan
#[derive(Clone)]
pub struct ScanFilters {
    pub recursive: bool,
    pub banned: NameMatcher,
    pub classifier: Arc<dyn Classifier>,
    pub ignore_sidecars: bool,
    pub included: ExtensionList,
    pub excluded: ExtensionList,
}

/// Candidate files of one tree, bucketed by directory.
///
/// Directory keys iterate in lexicographic order. Files are full tree
/// paths, kept in discovery order.
pub struct Catalog {
    tree: SharedTree,
    dirs: BTreeMap<String, Vec<String>>,
}

impl Catalog {
    fn new(tree: SharedTree) -> Self {
        Self {
            tree,
            dirs: BTreeMap::new(),
        }
    }

    pub fn tree(&self) -> &SharedTree {
        &self.tree
    }

    /// Directories with their candidate files, in lexicographic order.
    pub fn dirs(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.dirs.iter().map(|(d, f)| (d.as_str(), f.as_slice()))
    }

    pub fn files(&self, dir: &str) -> Option<&[String]> {
        self.dirs.get(dir).map(|f| f.as_slice())
    }

    pub fn dir_count(&self) -> usize {
        self.dirs.len()
    }

    pub fn file_count(&self) -> usize {
        self.dirs.values().map(|f| f.len()).sum()
    }

    /// Split into the tree and its buckets, consumed directory by directory.
    pub fn into_parts(self) -> (SharedTree, BTreeMap<String, Vec<String>>) {
        (self.tree, self.dirs)
    }
}

/// Catalogs of all trees of a scan, in the order the trees were given
#[derive(Default)]
pub struct ScanState {
    catalogs: Vec<Catalog>,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, catalog: Catalog) {
        self.catalogs.push(catalog);
    }

    pub fn len(&self) -> usize {
        self.catalogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }

    pub fn catalogs(&self) -> &[Catalog] {
        &self.catalogs
    }

    pub fn into_catalogs(self) -> Vec<Catalog> {
        self.catalogs
    }
}

/// Pass-1 scanner
pub struct CatalogScanner<'a> {
    filters: &'a ScanFilters,
    recorder: &'a dyn EventRecorder,
    cancel: &'a CancellationToken,
}

impl<'a> CatalogScanner<'a> {
    pub fn new(
        filters: &'a ScanFilters,
        recorder: &'a dyn EventRecorder,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            filters,
            recorder,
            cancel,
        }
    }

    /// Walk `tree` and build its catalog.
    ///
    /// Walk errors and cancellation abort the scan; no partial catalog is
    /// returned.
    pub fn scan(&self, tree: &SharedTree) -> Result<Catalog> {
        let mut catalog = Catalog::new(Arc::clone(tree));
        let tree_name = tree.name();
        tracing::info!(tree = %tree_name, recursive = self.filters.recursive, "Cataloging tree");

        for entry in tree.walk(self.filters.recursive) {
            let entry = entry?;
            if entry.is_dir {
                // a non-recursive walk still lists the root's sub-directories
                if !entry.lossy && (self.filters.recursive || entry.path == ROOT) {
                    catalog.dirs.entry(entry.path).or_default();
                }
                continue;
            }

            let dir = parent_dir(&entry.path);
            if !self.filters.recursive && dir != ROOT {
                continue;
            }
            self.cancel.check()?;

            if entry.lossy {
                self.discard(FileRef::new(tree_name, &entry.path), reason::INVALID_NAME);
                continue;
            }

            if self.accept(tree_name, &entry.path) {
                catalog
                    .dirs
                    .entry(dir.to_string())
                    .or_default()
                    .push(entry.path);
            }
        }

        tracing::info!(
            tree = %tree_name,
            dirs = catalog.dir_count(),
            files = catalog.file_count(),
            "Tree cataloged"
        );
        Ok(catalog)
    }

    /// Apply the filters to one file, recording the decision.
    fn accept(&self, tree_name: &str, path: &str) -> bool {
        let file = FileRef::new(tree_name, path);
        let filters = self.filters;

        if let Some(pattern) = filters.banned.matching_pattern(path) {
            tracing::trace!(path = %path, pattern = %pattern, "Banned");
            self.discard(file, reason::BANNED);
            return false;
        }

        let ext = extension(path);
        match filters.classifier.kind_of(ext) {
            MediaKind::Unsupported => {
                self.recorder
                    .record(FileEvent::DiscoveredUnsupported, file, Some(reason::UNSUPPORTED));
                return false;
            }
            MediaKind::Image => self.recorder.record(FileEvent::DiscoveredImage, file, None),
            MediaKind::Video => self.recorder.record(FileEvent::DiscoveredVideo, file, None),
            MediaKind::Sidecar => {
                self.recorder.record(FileEvent::DiscoveredSidecar, file, None);
                if filters.ignore_sidecars {
                    self.discard(file, reason::SIDECAR_IGNORED);
                    return false;
                }
            }
        }

        if !filters.included.includes(ext) {
            self.discard(file, reason::NOT_INCLUDED);
            return false;
        }
        if filters.excluded.excludes(ext) {
            self.discard(file, reason::EXCLUDED);
            return false;
        }
        true
    }

    fn discard(&self, file: FileRef<'_>, why: &str) {
        self.recorder
            .record(FileEvent::DiscoveredDiscarded, file, Some(why));
    }
}
