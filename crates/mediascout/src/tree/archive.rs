use chrono::{DateTime, NaiveDate, Utc};
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use zip::{CompressionMethod, ZipArchive};

use super::{clean_path, FileStat, TreeEntry, TreeIndex, VirtualTree};
use crate::error::Result;

/// Upper bound of the buffer reserved up front for a compressed entry; the
/// size recorded in the archive header is not trusted beyond it.
const MAX_PREALLOC: u64 = 8 * 1024 * 1024;

/// A tree reconstructed from the central directory of a zip archive
/// (e.g. a Google Photos takeout part).
#[derive(Debug, Clone)]
pub struct ZipTree {
    archive: PathBuf,
    name: String,
    index: TreeIndex,
}

fn zip_time(dt: zip::DateTime) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(dt.year() as i32, dt.month() as u32, dt.day() as u32)?
        .and_hms_opt(dt.hour() as u32, dt.minute() as u32, dt.second() as u32)
        .map(|naive| naive.and_utc())
}

impl ZipTree {
    /// Read the archive listing. File contents are only read on `open`.
    pub fn open(archive: impl Into<PathBuf>) -> Result<Self> {
        let archive = archive.into();
        let mut zip = ZipArchive::new(File::open(&archive)?)?;
        let mut index = TreeIndex::new();

        for i in 0..zip.len() {
            let entry = zip.by_index(i)?;
            // Entries escaping the archive root ("../x") are not part of the tree
            let Some(path) = entry.enclosed_name() else {
                tracing::warn!(
                    archive = %archive.display(),
                    entry = %entry.name(),
                    "Skipping unsafe archive entry"
                );
                continue;
            };
            let path = clean_path(&path.to_string_lossy());
            if entry.is_dir() {
                index.add_dir(&path);
            } else {
                let modified = entry.last_modified().and_then(zip_time);
                index.add_file(&path, entry.size(), modified);
            }
        }

        let name = archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        tracing::debug!(
            archive = %archive.display(),
            files = index.file_count(),
            "Indexed zip archive"
        );

        Ok(Self {
            archive,
            name,
            index,
        })
    }

    pub fn archive(&self) -> &Path {
        &self.archive
    }
}

impl VirtualTree for ZipTree {
    fn name(&self) -> &str {
        &self.name
    }

    fn walk(&self, recursive: bool) -> Box<dyn Iterator<Item = Result<TreeEntry>> + '_> {
        Box::new(self.index.entries(recursive).into_iter().map(Ok))
    }

    fn stat(&self, path: &str) -> io::Result<FileStat> {
        self.index.stat(&self.name, path)
    }

    /// Stored entries are streamed straight from the archive file; compressed
    /// entries are inflated into memory.
    fn open(&self, path: &str) -> io::Result<Box<dyn Read + Send>> {
        self.index.stat(&self.name, path)?;
        let mut zip = ZipArchive::new(File::open(&self.archive)?).map_err(io::Error::from)?;
        let mut entry = zip.by_name(&clean_path(path)).map_err(io::Error::from)?;

        if entry.compression() == CompressionMethod::Stored && !entry.encrypted() {
            let (start, len) = (entry.data_start(), entry.compressed_size());
            drop(entry);
            let mut file = File::open(&self.archive)?;
            file.seek(SeekFrom::Start(start))?;
            return Ok(Box::new(file.take(len)));
        }

        let mut content = Vec::with_capacity(entry.size().min(MAX_PREALLOC) as usize);
        entry.read_to_end(&mut content)?;
        Ok(Box::new(Cursor::new(content)))
    }
}
