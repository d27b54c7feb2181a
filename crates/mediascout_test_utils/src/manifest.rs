//! Trees rebuilt from archive listings
//!
//! The listing is the concatenated output of `unzip -l` (or `tar -tvf`) for
//! every part of a takeout:
//!
//! ```text
//! Archive: takeout-001.zip
//!   2104348  07-20-2023 00:00   Takeout/Google Photos/2020 - Costa Rica/IMG_3235.MP4
//! ```
//!
//! Each `Archive:` header starts (or continues) a tree of that name. File
//! contents are zero bytes of the listed size.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::sync::LazyLock;

use mediascout::{FileStat, TreeEntry, TreeIndex, VirtualTree};

static LISTING_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(-rw-r--r-- 0/0\s+)?(\d+)\s+(.{16})\s+(.*)$").unwrap()
});

const ARCHIVE_HEADER: &str = "Archive:";

/// Tree holding the files listed under one `Archive:` header
#[derive(Debug, Clone)]
pub struct ManifestTree {
    name: String,
    index: TreeIndex,
}

impl ManifestTree {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: TreeIndex::new(),
        }
    }

    pub fn add_file(&mut self, path: &str, size: u64, modified: Option<DateTime<Utc>>) {
        if path.ends_with('/') {
            self.index.add_dir(path);
        } else {
            self.index.add_file(path, size, modified);
        }
    }

    pub fn file_count(&self) -> usize {
        self.index.file_count()
    }
}

impl VirtualTree for ManifestTree {
    fn name(&self) -> &str {
        &self.name
    }

    fn walk(
        &self,
        recursive: bool,
    ) -> Box<dyn Iterator<Item = mediascout::Result<TreeEntry>> + '_> {
        Box::new(self.index.entries(recursive).into_iter().map(Ok))
    }

    fn stat(&self, path: &str) -> io::Result<FileStat> {
        self.index.stat(&self.name, path)
    }

    fn open(&self, path: &str) -> io::Result<Box<dyn Read + Send>> {
        let stat = self.index.stat(&self.name, path)?;
        Ok(Box::new(io::repeat(0).take(stat.size)))
    }
}

/// Parse one listing line into (path, size, modification time).
fn parse_line(line: &str, date_format: &str) -> Option<(String, u64, Option<DateTime<Utc>>)> {
    if line.len() < 30 {
        return None;
    }
    let caps = LISTING_LINE.captures(line)?;
    let size = caps.get(2)?.as_str().parse().unwrap_or(0);
    let modified = NaiveDateTime::parse_from_str(caps.get(3)?.as_str().trim(), date_format)
        .ok()
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .map(|local| local.with_timezone(&Utc));
    let path = caps.get(4)?.as_str().trim_end();
    if path.is_empty() {
        return None;
    }
    Some((path.to_string(), size, modified))
}

/// Read a listing. `date_format` is a chrono format such as `%m-%d-%Y %H:%M`.
///
/// Trees are returned sorted by name.
pub fn scan_manifest<R: BufRead>(reader: R, date_format: &str) -> Result<Vec<ManifestTree>> {
    let mut trees: BTreeMap<String, ManifestTree> = BTreeMap::new();
    let mut current: Option<String> = None;

    for (number, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading listing line {}", number + 1))?;
        if let Some(name) = line.strip_prefix(ARCHIVE_HEADER) {
            let name = name.trim().to_string();
            trees
                .entry(name.clone())
                .or_insert_with(|| ManifestTree::new(name.clone()));
            current = Some(name);
            continue;
        }

        let Some((path, size, modified)) = parse_line(&line, date_format) else {
            continue;
        };
        match current.as_ref().and_then(|name| trees.get_mut(name)) {
            Some(tree) => tree.add_file(&path, size, modified),
            None => tracing::debug!(line = number + 1, "Listing entry before any archive header"),
        }
    }

    Ok(trees.into_values().collect())
}

pub fn scan_manifest_str(listing: &str, date_format: &str) -> Result<Vec<ManifestTree>> {
    scan_manifest(listing.as_bytes(), date_format)
}

pub fn scan_manifest_file(path: &Path, date_format: &str) -> Result<Vec<ManifestTree>> {
    let file = File::open(path).with_context(|| format!("opening listing {}", path.display()))?;
    scan_manifest(BufReader::new(file), date_format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    const LISTING: &str = "\
Archive: takeout-002.zip
  Length      Date    Time    Name
---------  ---------- -----   ----
     1024  07-20-2023 00:00   Takeout/Google Photos/Trip/IMG_2.jpg
Archive: takeout-001.zip
  2104348  07-20-2023 00:00   Takeout/Google Photos/Trip/IMG_1.MP4
      512  07-20-2023 00:00   Takeout/Google Photos/Trip/IMG_1.jpg
Archive: takeout-002.zip
      100  07-21-2023 10:30   Takeout/Google Photos/Trip/IMG_2.jpg.json
";

    #[test]
    fn test_scan_listing() {
        let trees = scan_manifest_str(LISTING, "%m-%d-%Y %H:%M").unwrap();
        let names: Vec<&str> = trees.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["takeout-001.zip", "takeout-002.zip"]);
        assert_eq!(trees[0].file_count(), 2);
        assert_eq!(trees[1].file_count(), 2);

        let stat = trees[0]
            .stat("Takeout/Google Photos/Trip/IMG_1.MP4")
            .unwrap();
        assert_eq!(stat.size, 2104348);
        assert_eq!(stat.modified.unwrap().year(), 2023);

        let mut content = Vec::new();
        trees[1]
            .open("Takeout/Google Photos/Trip/IMG_2.jpg.json")
            .unwrap()
            .read_to_end(&mut content)
            .unwrap();
        assert_eq!(content, vec![0u8; 100]);
    }

    #[test]
    fn test_tar_listing_line() {
        let (path, size, modified) = parse_line(
            "-rw-r--r-- 0/0          734 2023-08-01 10:15 Photos/IMG_3.jpg",
            "%Y-%m-%d %H:%M",
        )
        .unwrap();
        assert_eq!(path, "Photos/IMG_3.jpg");
        assert_eq!(size, 734);
        assert!(modified.is_some());
    }

    #[test]
    fn test_short_lines_are_skipped() {
        assert!(parse_line("---------  -------", "%Y").is_none());
    }
}
