//! Mediascout - Media Folder Browser
//!
//! Mediascout walks read-only file trees (directories, zip archives) and
//! rebuilds the asset groups a photo library importer uploads: a photo with
//! its motion/live video, its metadata sidecar, and the albums derived from
//! where it was found.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌───────────────┐
//! │    Trees    │     │   Pass 1    │     │   Pass 2    │     │  GroupStream  │
//! │ (dir / zip) │────▶│  (catalog   │────▶│  (link +    │────▶│  (consumer    │
//! │             │     │   filters)  │     │ materialize)│     │    thread)    │
//! └─────────────┘     └─────────────┘     └─────────────┘     └───────────────┘
//!                            │                   │
//!                            └──── EventRecorder ┘
//! ```
//!
//! # Core Concepts
//!
//! - **Tree**: a named, read-only hierarchy of files ([`VirtualTree`])
//! - **Catalog**: per-directory candidate files surviving the Pass-1 filters
//! - **LinkSet**: per-directory map from an anchor key to its image, video and sidecar
//! - **AssetGroup**: one photo or video, or a motion photo, with sidecar and albums

pub mod album;
pub mod browser;
pub mod cancel;
pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod filters;
pub mod grouper;
pub mod linker;
pub mod materialize;
pub mod media;
pub mod metadata;
pub mod patterns;
pub mod tree;
pub mod types;

// Re-exports for convenience
pub use album::{AlbumMode, AlbumNamer};
pub use browser::FolderBrowser;
pub use cancel::CancellationToken;
pub use catalog::{Catalog, CatalogScanner, ScanFilters, ScanState};
pub use config::ImportConfig;
pub use error::{Result, ScanError};
pub use events::{EventCounts, EventRecorder, FileEvent, FileRef, Recorder};
pub use filters::{DateRange, ExtensionList};
pub use grouper::{GroupStream, Grouper};
pub use linker::{FileLinks, LinkOutcome, LinkPolicy, LinkSet};
pub use materialize::Materializer;
pub use media::{Classifier, MediaKind, SupportedMedia};
pub use metadata::{
    AssetMetadata, DateMethod, FilenameDateReader, MetadataReader, ReadOptions, TimeZoneHint,
};
pub use patterns::NameMatcher;
pub use tree::{DirTree, FileStat, SharedTree, TreeEntry, TreeIndex, VirtualTree, ZipTree};
pub use types::{Album, AssetGroup, AssetHandle, GroupKind, SidecarRef};
