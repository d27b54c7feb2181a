//! Read-only virtual file trees.
//!
//! A tree yields `/`-separated paths relative to its root. The root itself is
//! `"."`; a file at the root is `"name.jpg"`, never `"./name.jpg"`.

mod archive;
mod dir;
mod index;

pub use archive::ZipTree;
pub use dir::DirTree;
pub use index::TreeIndex;

use chrono::{DateTime, Utc};
use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;

use crate::error::Result;

/// Path of the tree root.
pub const ROOT: &str = ".";

/// One entry produced by [`VirtualTree::walk`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: String,
    pub is_dir: bool,
    /// The native name was not valid UTF-8; `path` is a lossy rendering
    /// that cannot be used to stat or open the file.
    pub lossy: bool,
}

impl TreeEntry {
    pub fn dir(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_dir: true,
            lossy: false,
        }
    }

    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_dir: false,
            lossy: false,
        }
    }

    pub fn with_lossy(mut self, lossy: bool) -> Self {
        self.lossy = lossy;
        self
    }
}

/// Size and modification time of a file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileStat {
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

/// A named, immutable hierarchy of directories and files.
///
/// `walk` must yield the root first, every directory before its contents,
/// and siblings in a stable order. A non-recursive walk lists the root and
/// its direct children without descending into any sub-directory.
pub trait VirtualTree: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn walk(&self, recursive: bool) -> Box<dyn Iterator<Item = Result<TreeEntry>> + '_>;

    fn stat(&self, path: &str) -> io::Result<FileStat>;

    fn open(&self, path: &str) -> io::Result<Box<dyn Read + Send>>;
}

/// Trees are shared between the scanner, the grouper and the asset handles.
pub type SharedTree = Arc<dyn VirtualTree>;

/// Split a tree path into its parent directory and base name.
pub fn split_path(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(i) => (&path[..i], &path[i + 1..]),
        None => (ROOT, path),
    }
}

pub fn parent_dir(path: &str) -> &str {
    split_path(path).0
}

pub fn base_name(path: &str) -> &str {
    split_path(path).1
}

/// Path segments of a tree path, without empty and `.` segments.
///
/// Only `/` separates segments: a backslash is part of a file name.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|c| !c.is_empty() && *c != ".")
}

/// Normalize a caller-supplied path: forward slashes, no leading `./` or `/`.
pub fn clean_path(path: &str) -> String {
    let cleaned: Vec<&str> = path
        .split(['/', '\\'])
        .filter(|c| !c.is_empty() && *c != ".")
        .collect();
    if cleaned.is_empty() {
        ROOT.to_string()
    } else {
        cleaned.join("/")
    }
}

fn not_found(tree: &str, path: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{}: no such file '{}'", tree, path),
    )
}
