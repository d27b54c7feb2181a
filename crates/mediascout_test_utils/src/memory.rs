use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Cursor, Read};
use std::sync::Arc;

use mediascout::{
    FileStat, Result, ScanError, SharedTree, TreeEntry, TreeIndex, VirtualTree,
};

/// In-memory tree for tests. Each file holds its own path as content.
#[derive(Debug, Clone)]
pub struct MemTree {
    name: String,
    index: TreeIndex,
    contents: BTreeMap<String, Vec<u8>>,
    broken: BTreeSet<String>,
    unreadable_dirs: BTreeSet<String>,
}

impl MemTree {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: TreeIndex::new(),
            contents: BTreeMap::new(),
            broken: BTreeSet::new(),
            unreadable_dirs: BTreeSet::new(),
        }
    }

    pub fn add_file(self, path: &str) -> Self {
        let content = path.as_bytes().to_vec();
        self.add_file_with(path, content, None)
    }

    pub fn add_file_with(
        mut self,
        path: &str,
        content: Vec<u8>,
        modified: Option<DateTime<Utc>>,
    ) -> Self {
        self.index.add_file(path, content.len() as u64, modified);
        self.contents.insert(path.to_string(), content);
        self
    }

    /// Make `stat` and `open` of a listed file fail.
    pub fn fail_stat(mut self, path: &str) -> Self {
        self.broken.insert(path.to_string());
        self
    }

    /// Make walking into `dir` fail, as an unreadable folder would.
    pub fn fail_walk(mut self, dir: &str) -> Self {
        self.index.add_dir(dir);
        self.unreadable_dirs.insert(dir.trim_end_matches('/').to_string());
        self
    }

    pub fn shared(self) -> SharedTree {
        Arc::new(self)
    }

    fn check(&self, path: &str) -> io::Result<()> {
        if self.broken.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{}: cannot access '{}'", self.name, path),
            ));
        }
        Ok(())
    }
}

impl VirtualTree for MemTree {
    fn name(&self) -> &str {
        &self.name
    }

    fn walk(&self, recursive: bool) -> Box<dyn Iterator<Item = Result<TreeEntry>> + '_> {
        Box::new(self.index.entries(recursive).into_iter().map(move |entry| {
            let unreadable = self
                .unreadable_dirs
                .iter()
                .find(|dir| entry.path.starts_with(&format!("{}/", dir)));
            match unreadable {
                Some(dir) => Err(ScanError::Io(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    format!("{}: cannot read directory '{}'", self.name, dir),
                ))),
                None => Ok(entry),
            }
        }))
    }

    fn stat(&self, path: &str) -> io::Result<FileStat> {
        self.check(path)?;
        self.index.stat(&self.name, path)
    }

    fn open(&self, path: &str) -> io::Result<Box<dyn Read + Send>> {
        self.check(path)?;
        let content = self.contents.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{}: no such file '{}'", self.name, path),
            )
        })?;
        Ok(Box::new(Cursor::new(content)))
    }
}
