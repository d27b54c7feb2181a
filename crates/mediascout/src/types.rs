//! Assets and asset groups produced by the browser

use serde::Serialize;
use std::fmt;
use std::io::{self, Read};

use crate::error::{Result, ScanError};
use crate::metadata::AssetMetadata;
use crate::tree::SharedTree;

/// Kind of an asset group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    /// A single photo or video
    None,
    /// A still image followed by its motion/live video
    MotionPhoto,
}

impl GroupKind {
    /// Number of assets a group of this kind holds.
    pub fn expected_len(&self) -> usize {
        match self {
            Self::None => 1,
            Self::MotionPhoto => 2,
        }
    }
}

/// A file of a tree, with its stat and metadata resolved.
///
/// The handle is owned by whoever holds it. Resources opened through it are
/// released when the reader and the handle are dropped.
pub struct AssetHandle {
    /// Path relative to the tree root
    pub file_name: String,
    /// Base name of the file
    pub title: String,
    pub tree: SharedTree,
    pub size: u64,
    pub metadata: AssetMetadata,
}

impl AssetHandle {
    pub fn tree_name(&self) -> &str {
        self.tree.name()
    }

    /// Open the asset content for reading.
    pub fn open(&self) -> io::Result<Box<dyn Read + Send>> {
        self.tree.open(&self.file_name)
    }

    /// Release the handle.
    pub fn close(self) {
        tracing::trace!(tree = %self.tree.name(), path = %self.file_name, "Asset released");
    }
}

impl fmt::Debug for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetHandle")
            .field("tree", &self.tree.name())
            .field("file_name", &self.file_name)
            .field("title", &self.title)
            .field("size", &self.size)
            .field("metadata", &self.metadata)
            .finish()
    }
}

/// Metadata sidecar attached to a group. Not materialized.
#[derive(Clone)]
pub struct SidecarRef {
    pub tree: SharedTree,
    /// Path relative to the tree root
    pub file_name: String,
}

impl SidecarRef {
    pub fn open(&self) -> io::Result<Box<dyn Read + Send>> {
        self.tree.open(&self.file_name)
    }
}

impl fmt::Debug for SidecarRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SidecarRef")
            .field("tree", &self.tree.name())
            .field("file_name", &self.file_name)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Album {
    pub title: String,
    /// Path of the asset the album was derived from
    pub path: String,
}

/// A primary asset with its companions, ready for import
#[derive(Debug)]
pub struct AssetGroup {
    pub kind: GroupKind,
    pub assets: Vec<AssetHandle>,
    pub cover_index: usize,
    pub sidecar: Option<SidecarRef>,
    pub albums: Vec<Album>,
}

impl AssetGroup {
    pub fn new(kind: GroupKind, assets: Vec<AssetHandle>) -> Self {
        Self {
            kind,
            assets,
            cover_index: 0,
            sidecar: None,
            albums: Vec::new(),
        }
    }

    /// The cover asset.
    pub fn primary(&self) -> Option<&AssetHandle> {
        self.assets.get(self.cover_index)
    }

    /// Check the kind/asset-count invariant.
    pub fn validate(&self) -> Result<()> {
        if self.assets.len() != self.kind.expected_len() {
            return Err(ScanError::InvalidState(format!(
                "{:?} group holds {} assets, expected {}",
                self.kind,
                self.assets.len(),
                self.kind.expected_len()
            )));
        }
        if self.cover_index >= self.assets.len() {
            return Err(ScanError::InvalidState(format!(
                "cover index {} out of bounds",
                self.cover_index
            )));
        }
        Ok(())
    }

    /// Release every asset of the group.
    pub fn close(self) {
        for asset in self.assets {
            asset.close();
        }
    }
}
