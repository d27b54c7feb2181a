use std::sync::Arc;

use crate::error::{Result, ScanError};
use crate::events::{reason, EventRecorder, FileEvent, FileRef};
use crate::filters::DateRange;
use crate::metadata::{AssetMetadata, DateMethod, MetadataReader, ReadOptions};
use crate::tree::{base_name, SharedTree};
use crate::types::AssetHandle;

/// Turns a file of a tree into an [`AssetHandle`].
///
/// Metadata comes from the reader (none when no reader is configured), the
/// size from a stat of the file. Assets outside the date range are soft
/// exclusions: a discard event is recorded and `Ok(None)` returned.
pub struct Materializer {
    reader: Option<Arc<dyn MetadataReader>>,
    method: DateMethod,
    read_options: ReadOptions,
    date_range: Option<DateRange>,
    recorder: Arc<dyn EventRecorder>,
}

impl Materializer {
    pub fn new(
        reader: Option<Arc<dyn MetadataReader>>,
        method: DateMethod,
        read_options: ReadOptions,
        date_range: Option<DateRange>,
        recorder: Arc<dyn EventRecorder>,
    ) -> Self {
        Self {
            reader,
            method,
            read_options,
            date_range,
            recorder,
        }
    }

    pub fn date_range(&self) -> Option<&DateRange> {
        self.date_range.as_ref()
    }

    pub fn materialize(&self, tree: &SharedTree, path: &str) -> Result<Option<AssetHandle>> {
        let metadata = match &self.reader {
            Some(reader) => reader
                .read_metadata(tree.as_ref(), path, self.method, &self.read_options)
                .map_err(|e| match e {
                    ScanError::Metadata { .. } => e,
                    other => ScanError::Metadata {
                        path: path.to_string(),
                        message: other.to_string(),
                    },
                })?,
            None => AssetMetadata::default(),
        };

        let stat = tree.stat(path)?;
        let asset = AssetHandle {
            file_name: path.to_string(),
            title: base_name(path).to_string(),
            tree: Arc::clone(tree),
            size: stat.size,
            metadata,
        };

        if let Some(range) = &self.date_range {
            if !range.contains(asset.metadata.date_taken.as_ref()) {
                self.recorder.record(
                    FileEvent::DiscoveredDiscarded,
                    FileRef::new(tree.name(), path),
                    Some(reason::OUTSIDE_DATE_RANGE),
                );
                asset.close();
                return Ok(None);
            }
        }
        Ok(Some(asset))
    }
}
