//! File events: the side channel reporting every classification, discard,
//! association and error decision the browser makes.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Discard reasons reported with [`FileEvent::DiscoveredDiscarded`]
pub mod reason {
    pub const BANNED: &str = "banned file";
    pub const INVALID_NAME: &str = "file name is not valid UTF-8";
    pub const UNSUPPORTED: &str = "unsupported file type";
    pub const SIDECAR_IGNORED: &str = "sidecar ignored";
    pub const NOT_INCLUDED: &str = "extension not included";
    pub const EXCLUDED: &str = "extension excluded";
    pub const OUTSIDE_DATE_RANGE: &str = "asset outside date range";
    pub const ORPHAN_SIDECAR: &str = "orphan sidecar";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FileEvent {
    DiscoveredImage,
    DiscoveredVideo,
    DiscoveredSidecar,
    DiscoveredUnsupported,
    DiscoveredDiscarded,
    AssociatedMetadata,
    Error,
}

impl FileEvent {
    pub const ALL: [FileEvent; 7] = [
        FileEvent::DiscoveredImage,
        FileEvent::DiscoveredVideo,
        FileEvent::DiscoveredSidecar,
        FileEvent::DiscoveredUnsupported,
        FileEvent::DiscoveredDiscarded,
        FileEvent::AssociatedMetadata,
        FileEvent::Error,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DiscoveredImage => "discovered image",
            Self::DiscoveredVideo => "discovered video",
            Self::DiscoveredSidecar => "discovered sidecar",
            Self::DiscoveredUnsupported => "discovered unsupported file",
            Self::DiscoveredDiscarded => "discarded",
            Self::AssociatedMetadata => "associated metadata",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for FileEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file of a named tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileRef<'a> {
    pub tree: &'a str,
    pub path: &'a str,
}

impl<'a> FileRef<'a> {
    pub fn new(tree: &'a str, path: &'a str) -> Self {
        Self { tree, path }
    }
}

impl fmt::Display for FileRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tree, self.path)
    }
}

/// Sink for file events.
///
/// `detail` is the discard reason, the associated sidecar name, or the
/// error message, depending on the event.
pub trait EventRecorder: Send + Sync {
    fn record(&self, event: FileEvent, file: FileRef<'_>, detail: Option<&str>);
}

/// Snapshot of per-event counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventCounts([u64; 7]);

impl EventCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, event: FileEvent, value: u64) -> Self {
        self.0[event.index()] = value;
        self
    }

    pub fn get(&self, event: FileEvent) -> u64 {
        self.0[event.index()]
    }

    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }
}

impl fmt::Display for EventCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = FileEvent::ALL
            .iter()
            .filter(|e| self.get(**e) > 0)
            .map(|e| format!("{}={}", e.as_str(), self.get(*e)))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

/// Default recorder: counts events and logs each one with `tracing`.
#[derive(Debug, Default)]
pub struct Recorder {
    counters: [AtomicU64; 7],
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counts(&self) -> EventCounts {
        let mut counts = EventCounts::new();
        for event in FileEvent::ALL {
            counts = counts.set(event, self.counters[event.index()].load(Ordering::Relaxed));
        }
        counts
    }

    /// Log the counters as one summary line.
    pub fn report(&self) {
        tracing::info!(counts = %self.counts(), "File event summary");
    }
}

impl EventRecorder for Recorder {
    fn record(&self, event: FileEvent, file: FileRef<'_>, detail: Option<&str>) {
        self.counters[event.index()].fetch_add(1, Ordering::Relaxed);

        let detail = detail.unwrap_or("");
        match event {
            FileEvent::DiscoveredImage
            | FileEvent::DiscoveredVideo
            | FileEvent::DiscoveredSidecar => {
                tracing::debug!(tree = %file.tree, path = %file.path, "{}", event);
            }
            FileEvent::DiscoveredUnsupported | FileEvent::DiscoveredDiscarded => {
                tracing::info!(tree = %file.tree, path = %file.path, reason = %detail, "{}", event);
            }
            FileEvent::AssociatedMetadata => {
                tracing::info!(
                    tree = %file.tree,
                    path = %file.path,
                    sidecar = %detail,
                    "{}",
                    event
                );
            }
            FileEvent::Error => {
                tracing::warn!(tree = %file.tree, path = %file.path, error = %detail, "{}", event);
            }
        }
    }
}
