use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::io;

use super::{clean_path, not_found, split_path, FileStat, TreeEntry, ROOT};

/// In-memory directory index for trees built from a flat file listing
/// (archives, manifests, test fixtures).
#[derive(Debug, Clone)]
pub struct TreeIndex {
    children: BTreeMap<String, BTreeSet<String>>,
    files: BTreeMap<String, FileStat>,
}

impl Default for TreeIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeIndex {
    pub fn new() -> Self {
        let mut children = BTreeMap::new();
        children.insert(ROOT.to_string(), BTreeSet::new());
        Self {
            children,
            files: BTreeMap::new(),
        }
    }

    /// Register a directory and all of its ancestors.
    pub fn add_dir(&mut self, path: &str) {
        let path = clean_path(path);
        self.register_dir(&path);
    }

    fn register_dir(&mut self, path: &str) {
        if self.children.contains_key(path) {
            return;
        }
        self.children.insert(path.to_string(), BTreeSet::new());
        let (parent, name) = split_path(path);
        self.register_dir(parent);
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.insert(name.to_string());
        }
    }

    /// Register a file. Adding the same path twice keeps the last stat.
    pub fn add_file(&mut self, path: &str, size: u64, modified: Option<DateTime<Utc>>) {
        let path = clean_path(path);
        if path == ROOT {
            return;
        }
        let (parent, name) = split_path(&path);
        let name = name.to_string();
        self.register_dir(parent);
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.insert(name);
        }
        self.files.insert(path, FileStat { size, modified });
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn contains_file(&self, path: &str) -> bool {
        self.files.contains_key(&clean_path(path))
    }

    pub fn stat(&self, tree: &str, path: &str) -> io::Result<FileStat> {
        self.files
            .get(&clean_path(path))
            .copied()
            .ok_or_else(|| not_found(tree, path))
    }

    /// Depth-first listing: root first, then each directory's children sorted
    /// by name, descending into directories as they are met. Without
    /// `recursive` only the root's direct children are listed.
    pub fn entries(&self, recursive: bool) -> Vec<TreeEntry> {
        let mut out = Vec::with_capacity(self.children.len() + self.files.len());
        out.push(TreeEntry::dir(ROOT));
        self.collect(ROOT, recursive, &mut out);
        out
    }

    fn collect(&self, dir: &str, recursive: bool, out: &mut Vec<TreeEntry>) {
        let Some(names) = self.children.get(dir) else {
            return;
        };
        for name in names {
            let path = if dir == ROOT {
                name.clone()
            } else {
                format!("{}/{}", dir, name)
            };
            if self.children.contains_key(&path) {
                out.push(TreeEntry::dir(path.clone()));
                if recursive {
                    self.collect(&path, recursive, out);
                }
            } else {
                out.push(TreeEntry::file(path));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_are_depth_first_and_sorted() {
        let mut index = TreeIndex::new();
        index.add_file("a b/x.jpg", 1, None);
        index.add_file("a/y.jpg", 2, None);
        index.add_file("root.jpg", 3, None);
        index.add_dir("empty/");

        let paths: Vec<(String, bool)> = index
            .entries(true)
            .into_iter()
            .map(|e| (e.path, e.is_dir))
            .collect();
        assert_eq!(
            paths,
            vec![
                (".".to_string(), true),
                ("a".to_string(), true),
                ("a/y.jpg".to_string(), false),
                ("a b".to_string(), true),
                ("a b/x.jpg".to_string(), false),
                ("empty".to_string(), true),
                ("root.jpg".to_string(), false),
            ]
        );
    }

    #[test]
    fn test_root_only_listing() {
        let mut index = TreeIndex::new();
        index.add_file("a/y.jpg", 2, None);
        index.add_file("root.jpg", 3, None);

        let entries = index.entries(false);
        assert_eq!(
            entries,
            vec![
                TreeEntry::dir("."),
                TreeEntry::dir("a"),
                TreeEntry::file("root.jpg"),
            ]
        );
    }

    #[test]
    fn test_stat() {
        let mut index = TreeIndex::new();
        index.add_file("./photos/img.jpg", 42, None);
        assert_eq!(index.stat("t", "photos/img.jpg").unwrap().size, 42);
        assert!(index.contains_file("photos/img.jpg"));
        assert_eq!(
            index.stat("t", "photos/missing.jpg").unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
        assert_eq!(index.file_count(), 1);
    }
}
