//! Folder browser: runs Pass 1 over every tree, then streams Pass 2

use std::sync::Arc;

use crate::album::AlbumNamer;
use crate::cancel::CancellationToken;
use crate::catalog::{CatalogScanner, ScanFilters, ScanState};
use crate::config::ImportConfig;
use crate::error::Result;
use crate::events::EventRecorder;
use crate::grouper::{GroupStream, Grouper};
use crate::linker::LinkPolicy;
use crate::materialize::Materializer;
use crate::media::{Classifier, SupportedMedia};
use crate::metadata::{FilenameDateReader, MetadataReader};
use crate::tree::SharedTree;

/// Browses one or more trees for asset groups.
///
/// ```no_run
/// use std::sync::Arc;
/// use mediascout::{CancellationToken, DirTree, FolderBrowser, ImportConfig, Recorder, SharedTree};
///
/// # fn main() -> mediascout::Result<()> {
/// let recorder = Arc::new(Recorder::new());
/// let tree: SharedTree = Arc::new(DirTree::new("/photos")?);
/// let browser = FolderBrowser::new(&ImportConfig::default(), recorder.clone(), vec![tree])?;
///
/// let mut groups = browser.browse(&CancellationToken::new())?;
/// for group in groups.by_ref() {
///     println!("{:?} {}", group.kind, group.assets[0].file_name);
/// }
/// groups.finish()?;
/// recorder.report();
/// # Ok(())
/// # }
/// ```
pub struct FolderBrowser {
    trees: Vec<SharedTree>,
    config: ImportConfig,
    filters: ScanFilters,
    albums: AlbumNamer,
    reader: Option<Arc<dyn MetadataReader>>,
    policy: LinkPolicy,
    recorder: Arc<dyn EventRecorder>,
}

impl FolderBrowser {
    /// Fails on an invalid configuration, before anything is scanned.
    pub fn new(
        config: &ImportConfig,
        recorder: Arc<dyn EventRecorder>,
        trees: Vec<SharedTree>,
    ) -> Result<Self> {
        let albums = config.album_namer()?;
        let filters = ScanFilters {
            recursive: config.recursive,
            banned: config.name_matcher()?,
            classifier: Arc::new(SupportedMedia::default()),
            ignore_sidecars: config.ignore_sidecar_files,
            included: config.included_extensions.clone(),
            excluded: config.excluded_extensions.clone(),
        };

        Ok(Self {
            trees,
            config: config.clone(),
            filters,
            albums,
            reader: Some(Arc::new(FilenameDateReader)),
            policy: LinkPolicy::default(),
            recorder,
        })
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.filters.classifier = classifier;
        self
    }

    /// Replace the metadata reader; `None` disables date handling.
    pub fn with_metadata_reader(mut self, reader: Option<Arc<dyn MetadataReader>>) -> Self {
        self.reader = reader;
        self
    }

    pub fn with_link_policy(mut self, policy: LinkPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn trees(&self) -> &[SharedTree] {
        &self.trees
    }

    /// Pass 1 over every tree, in order.
    pub fn catalog(&self, cancel: &CancellationToken) -> Result<ScanState> {
        let scanner = CatalogScanner::new(&self.filters, self.recorder.as_ref(), cancel);
        let mut state = ScanState::new();
        for tree in &self.trees {
            state.push(scanner.scan(tree)?);
        }
        Ok(state)
    }

    /// Catalog every tree, then stream the groups from a background thread.
    ///
    /// Pass-1 failures and cancellation are returned here. Later failures
    /// end the stream and are reported by [`GroupStream::finish`].
    pub fn browse(self, cancel: &CancellationToken) -> Result<GroupStream> {
        let state = self.catalog(cancel)?;

        let materializer = Materializer::new(
            self.reader,
            self.config.date_method,
            self.config.read_options(),
            self.config.date_range,
            Arc::clone(&self.recorder),
        );
        Grouper::new(
            state,
            self.filters.classifier,
            materializer,
            self.albums,
            self.recorder,
            cancel.clone(),
        )
        .with_policy(self.policy)
        .spawn()
    }
}
