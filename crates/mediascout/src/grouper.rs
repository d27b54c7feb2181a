//! Pass 2: link cataloged files into asset groups and stream them
//!
//! Trees are visited in the order they were given, directories in
//! lexicographic order, entries in key order. Groups are handed to the
//! consumer over a rendezvous channel, so the producer thread only runs
//! ahead by the group it is currently offering.

use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::album::AlbumNamer;
use crate::cancel::CancellationToken;
use crate::catalog::ScanState;
use crate::error::{Result, ScanError};
use crate::events::{reason, EventRecorder, FileEvent, FileRef};
use crate::linker::{FileLinks, LinkPolicy};
use crate::materialize::Materializer;
use crate::media::Classifier;
use crate::tree::SharedTree;
use crate::types::{AssetGroup, GroupKind, SidecarRef};

pub struct Grouper {
    state: ScanState,
    classifier: Arc<dyn Classifier>,
    policy: LinkPolicy,
    materializer: Materializer,
    albums: AlbumNamer,
    recorder: Arc<dyn EventRecorder>,
    cancel: CancellationToken,
}

impl Grouper {
    pub fn new(
        state: ScanState,
        classifier: Arc<dyn Classifier>,
        materializer: Materializer,
        albums: AlbumNamer,
        recorder: Arc<dyn EventRecorder>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            state,
            classifier,
            policy: LinkPolicy::default(),
            materializer,
            albums,
            recorder,
            cancel,
        }
    }

    pub fn with_policy(mut self, policy: LinkPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run Pass 2 on a background thread.
    pub fn spawn(self) -> Result<GroupStream> {
        let (tx, rx) = mpsc::sync_channel(0);
        let cancel = self.cancel.clone();
        let handle = thread::Builder::new()
            .name("mediascout-grouper".to_string())
            .spawn(move || self.run(tx))?;
        Ok(GroupStream {
            receiver: Some(rx),
            handle: Some(handle),
            cancel,
        })
    }

    /// Produce every group onto `tx`.
    ///
    /// Returns `Ok` when all trees are exhausted or the receiver hangs up
    /// without a cancellation request.
    pub fn run(mut self, tx: SyncSender<AssetGroup>) -> Result<()> {
        let mut emitted = 0usize;
        let catalogs = std::mem::take(&mut self.state).into_catalogs();
        tracing::info!(trees = catalogs.len(), "Grouping assets");

        for catalog in catalogs {
            let (tree, dirs) = catalog.into_parts();
            for (dir, files) in dirs {
                if files.is_empty() {
                    continue;
                }
                self.cancel.check()?;

                let outcome = self.policy.link(&files, self.classifier.as_ref());
                for orphan in &outcome.orphans {
                    self.recorder.record(
                        FileEvent::DiscoveredDiscarded,
                        FileRef::new(tree.name(), orphan),
                        Some(reason::ORPHAN_SIDECAR),
                    );
                }
                tracing::debug!(
                    tree = %tree.name(),
                    dir = %dir,
                    files = files.len(),
                    entries = outcome.links.len(),
                    "Directory linked"
                );

                for links in outcome.links.into_values() {
                    let Some(group) = self.resolve(&tree, &links)? else {
                        continue;
                    };
                    self.cancel.check()?;
                    if tx.send(group).is_err() {
                        self.cancel.check()?;
                        tracing::debug!(emitted, "Group consumer hung up");
                        return Ok(());
                    }
                    emitted += 1;
                }
            }
        }

        tracing::info!(emitted, "Grouping complete");
        Ok(())
    }

    /// Materialize the files of one entry into a group.
    ///
    /// `Ok(None)` when the primary asset is excluded by the date range.
    fn resolve(&self, tree: &SharedTree, links: &FileLinks) -> Result<Option<AssetGroup>> {
        let (primary_path, companion) = match (&links.image, &links.video) {
            (Some(image), video) => (image.as_str(), video.as_deref()),
            (None, Some(video)) => (video.as_str(), None),
            (None, None) => return Ok(None),
        };

        let primary = match self.materializer.materialize(tree, primary_path) {
            Ok(Some(asset)) => asset,
            Ok(None) => return Ok(None),
            Err(e) => {
                self.record_error(tree, primary_path, &e);
                return Err(e);
            }
        };

        let mut group = match companion {
            Some(video) => match self.materializer.materialize(tree, video) {
                Ok(Some(motion)) => AssetGroup::new(GroupKind::MotionPhoto, vec![primary, motion]),
                Ok(None) => AssetGroup::new(GroupKind::None, vec![primary]),
                Err(e) => {
                    self.record_error(tree, video, &e);
                    AssetGroup::new(GroupKind::None, vec![primary])
                }
            },
            None => AssetGroup::new(GroupKind::None, vec![primary]),
        };

        if let Some(sidecar) = &links.sidecar {
            self.recorder.record(
                FileEvent::AssociatedMetadata,
                FileRef::new(tree.name(), primary_path),
                Some(sidecar.as_str()),
            );
            group.sidecar = Some(SidecarRef {
                tree: Arc::clone(tree),
                file_name: sidecar.clone(),
            });
        }

        group.albums = self.albums.albums_for(tree.name(), primary_path);
        Ok(Some(group))
    }

    fn record_error(&self, tree: &SharedTree, path: &str, error: &ScanError) {
        self.recorder.record(
            FileEvent::Error,
            FileRef::new(tree.name(), path),
            Some(&error.to_string()),
        );
    }
}

/// Groups produced by a scan, in emission order.
///
/// Iteration ends when every tree is exhausted, the producer failed, or the
/// scan was cancelled. [`GroupStream::finish`] tells which.
pub struct GroupStream {
    receiver: Option<Receiver<AssetGroup>>,
    handle: Option<JoinHandle<Result<()>>>,
    cancel: CancellationToken,
}

impl GroupStream {
    /// Stop consuming and return the terminal result of the scan.
    pub fn finish(mut self) -> Result<()> {
        // Dropping the receiver releases a producer blocked on a send.
        self.receiver.take();
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ScanError::InvalidState("grouper thread panicked".to_string()))?,
            None => Ok(()),
        }
    }
}

impl Iterator for GroupStream {
    type Item = AssetGroup;

    fn next(&mut self) -> Option<AssetGroup> {
        if self.cancel.is_cancelled() {
            return None;
        }
        self.receiver.as_ref()?.recv().ok()
    }
}

impl Drop for GroupStream {
    fn drop(&mut self) {
        self.receiver.take();
        if let Some(handle) = self.handle.take() {
            if let Ok(Err(e)) = handle.join() {
                if !e.is_cancelled() {
                    tracing::warn!(error = %e, "Unfinished scan failed");
                }
            }
        }
    }
}
