//! Media classification by file extension
//!
//! The classifier is the only place that decides whether a file is a still
//! image, a video, a metadata sidecar, or something the importer ignores.
//! Callers supply a [`Classifier`]; [`SupportedMedia::default`] carries the
//! built-in table.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Kind of media a file extension maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still photo, including camera RAW formats
    Image,
    /// Video, including motion/live photo companions
    Video,
    /// Metadata sidecar (XMP, JSON)
    Sidecar,
    /// Anything the importer does not handle
    Unsupported,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Sidecar => "sidecar",
            Self::Unsupported => "unsupported",
        }
    }
}

/// Maps a file extension to a [`MediaKind`].
pub trait Classifier: Send + Sync {
    /// `ext` is the raw extension including its leading dot (".JPG").
    fn kind_of(&self, ext: &str) -> MediaKind;
}

const IMAGE_EXTENSIONS: &[&str] = &[
    ".3fr", ".ari", ".arw", ".avif", ".bmp", ".cap", ".cin", ".cr2", ".cr3", ".crw", ".dcr",
    ".dng", ".erf", ".fff", ".gif", ".heic", ".heif", ".hif", ".iiq", ".insp", ".jpe", ".jpeg",
    ".jpg", ".jxl", ".k25", ".kdc", ".mrw", ".nef", ".orf", ".ori", ".pef", ".png", ".psd",
    ".raf", ".raw", ".rw2", ".rwl", ".sr2", ".srf", ".srw", ".tif", ".tiff", ".webp", ".x3f",
];

const VIDEO_EXTENSIONS: &[&str] = &[
    ".3gp", ".avi", ".flv", ".insv", ".m2t", ".m2ts", ".m4v", ".mkv", ".mov", ".mp", ".mp4",
    ".mpe", ".mpeg", ".mpg", ".mts", ".vob", ".webm", ".wmv",
];

const SIDECAR_EXTENSIONS: &[&str] = &[".xmp", ".json"];

/// Extension table used by the browser.
#[derive(Debug, Clone)]
pub struct SupportedMedia {
    table: HashMap<String, MediaKind>,
}

impl SupportedMedia {
    /// An empty table: every extension is unsupported.
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Register (or override) the kind of an extension.
    pub fn with(mut self, ext: &str, kind: MediaKind) -> Self {
        self.insert(ext, kind);
        self
    }

    pub fn insert(&mut self, ext: &str, kind: MediaKind) {
        self.table.insert(normalize_extension(ext), kind);
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Default for SupportedMedia {
    fn default() -> Self {
        let mut media = Self::empty();
        for ext in IMAGE_EXTENSIONS {
            media.insert(ext, MediaKind::Image);
        }
        for ext in VIDEO_EXTENSIONS {
            media.insert(ext, MediaKind::Video);
        }
        for ext in SIDECAR_EXTENSIONS {
            media.insert(ext, MediaKind::Sidecar);
        }
        media
    }
}

impl Classifier for SupportedMedia {
    fn kind_of(&self, ext: &str) -> MediaKind {
        self.table
            .get(&normalize_extension(ext))
            .copied()
            .unwrap_or(MediaKind::Unsupported)
    }
}

/// Lower-case an extension, ensure the leading dot, and fold numbered
/// duplicates such as Pixel's `.MP~2` onto their base extension.
pub fn normalize_extension(ext: &str) -> String {
    let mut ext = ext.trim().to_lowercase();
    if !ext.is_empty() && !ext.starts_with('.') {
        ext.insert(0, '.');
    }
    if let Some(pos) = ext.rfind('~') {
        let suffix = &ext[pos + 1..];
        if !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()) {
            ext.truncate(pos);
        }
    }
    ext
}

/// Extension of the last path element, dot included; empty when there is none.
pub fn extension(name: &str) -> &str {
    let start = name.rfind('/').map_or(0, |i| i + 1);
    match name[start..].rfind('.') {
        Some(i) => &name[start + i..],
        None => "",
    }
}

/// `name` without its [`extension`].
pub fn strip_extension(name: &str) -> &str {
    &name[..name.len() - extension(name).len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_helpers() {
        assert_eq!(extension("photos/img.jpg"), ".jpg");
        assert_eq!(extension("photos/img.jpg.xmp"), ".xmp");
        assert_eq!(extension("photos.d/readme"), "");
        assert_eq!(extension("a/.hidden"), ".hidden");
        assert_eq!(strip_extension("a/img.jpg.xmp"), "a/img.jpg");
        assert_eq!(strip_extension("a/PXL_1.MP~2"), "a/PXL_1");
        assert_eq!(strip_extension("noext"), "noext");
    }

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension(".JPG"), ".jpg");
        assert_eq!(normalize_extension("cr3"), ".cr3");
        assert_eq!(normalize_extension(".MP~2"), ".mp");
        assert_eq!(normalize_extension(".tar~x"), ".tar~x");
        assert_eq!(normalize_extension(""), "");
    }

    #[test]
    fn test_default_table() {
        let media = SupportedMedia::default();
        assert_eq!(media.kind_of(".JPG"), MediaKind::Image);
        assert_eq!(media.kind_of(".cr3"), MediaKind::Image);
        assert_eq!(media.kind_of(".MP4"), MediaKind::Video);
        assert_eq!(media.kind_of(".MP"), MediaKind::Video);
        assert_eq!(media.kind_of(".MP~2"), MediaKind::Video);
        assert_eq!(media.kind_of(".xmp"), MediaKind::Sidecar);
        assert_eq!(media.kind_of(".txt"), MediaKind::Unsupported);
        assert_eq!(media.kind_of(""), MediaKind::Unsupported);
    }

    #[test]
    fn test_custom_table_overrides() {
        let media = SupportedMedia::empty()
            .with("jpg", MediaKind::Image)
            .with(".json", MediaKind::Unsupported);
        assert_eq!(media.len(), 2);
        assert_eq!(media.kind_of(".jpg"), MediaKind::Image);
        assert_eq!(media.kind_of(".json"), MediaKind::Unsupported);
        assert_eq!(media.kind_of(".png"), MediaKind::Unsupported);
    }
}
