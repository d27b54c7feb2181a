use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{segments, FileStat, TreeEntry, VirtualTree, ROOT};
use crate::error::{Result, ScanError};

/// Normalize a relative path to use forward slashes consistently.
///
/// The flag is set when a component is not valid UTF-8 and had to be
/// converted lossily.
fn normalize_path_to_forward_slashes(path: &Path) -> (String, bool) {
    let mut lossy = false;
    let parts: Vec<_> = path
        .components()
        .map(|c| {
            let part = c.as_os_str();
            lossy |= part.to_str().is_none();
            part.to_string_lossy()
        })
        .collect();
    (parts.join("/"), lossy)
}

/// A directory of the local filesystem
#[derive(Debug, Clone)]
pub struct DirTree {
    root: PathBuf,
    name: String,
}

impl DirTree {
    /// Open a directory; fails when `root` is missing or not a directory.
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Not a directory: {}", root.display()),
            ));
        }
        let name = root
            .canonicalize()
            .unwrap_or_else(|_| root.clone())
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { root, name })
    }

    /// Override the tree name used for album titles.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, path: &str) -> PathBuf {
        let mut full = self.root.clone();
        full.extend(segments(path));
        full
    }
}

impl VirtualTree for DirTree {
    fn name(&self) -> &str {
        &self.name
    }

    fn walk(&self, recursive: bool) -> Box<dyn Iterator<Item = Result<TreeEntry>> + '_> {
        let mut walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name();
        if !recursive {
            walker = walker.max_depth(1);
        }

        Box::new(walker.into_iter().map(move |entry| {
            let entry = entry.map_err(ScanError::from)?;
            let (rel, lossy) = entry
                .path()
                .strip_prefix(&self.root)
                .map(normalize_path_to_forward_slashes)
                .unwrap_or_default();
            let path = if rel.is_empty() { ROOT.to_string() } else { rel };
            Ok(TreeEntry {
                path,
                is_dir: entry.file_type().is_dir(),
                lossy,
            })
        }))
    }

    fn stat(&self, path: &str) -> io::Result<FileStat> {
        let metadata = std::fs::metadata(self.full_path(path))?;
        Ok(FileStat {
            size: metadata.len(),
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        })
    }

    fn open(&self, path: &str) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(File::open(self.full_path(path))?))
    }
}
