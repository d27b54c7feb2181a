//! Import configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::album::{AlbumMode, AlbumNamer};
use crate::error::{Result, ScanError};
use crate::filters::{DateRange, ExtensionList};
use crate::metadata::{DateMethod, ReadOptions, TimeZoneHint};
use crate::patterns::NameMatcher;

/// Files and folders NAS boxes, photo managers and macOS leave next to media
pub const DEFAULT_BANNED_FILES: &[&str] = &[
    "@eaDir/",
    "@__thumb/",          // QNAP
    "SYNOFILE_THUMB_*.*", // Synology
    "Lightroom Catalog/",
    "thumbnails/",
    ".DS_Store",
    "._*.*", // macOS resource forks
    ".photostructure/",
];

/// Options of a folder import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Descend into sub-folders
    #[serde(default = "default_recursive")]
    pub recursive: bool,

    /// Glob patterns of files to skip; a trailing `/` bans a whole folder
    #[serde(default = "default_banned_files")]
    pub banned_files: Vec<String>,

    /// When non-empty, only these extensions are imported
    #[serde(default)]
    pub included_extensions: ExtensionList,

    #[serde(default)]
    pub excluded_extensions: ExtensionList,

    /// Only import assets taken within this range of days
    #[serde(default)]
    pub date_range: Option<DateRange>,

    /// Where the capture date comes from
    #[serde(default)]
    pub date_method: DateMethod,

    /// Zone of dates found in file names
    #[serde(default)]
    pub filename_timezone: TimeZoneHint,

    /// Drop XMP/JSON sidecars instead of attaching them
    #[serde(default)]
    pub ignore_sidecar_files: bool,

    #[serde(default)]
    pub album_mode: AlbumMode,

    /// Joins path segments in `path` album mode
    #[serde(default = "default_album_path_separator")]
    pub album_path_separator: String,

    /// Put every asset in this album
    #[serde(default)]
    pub import_into_album: Option<String>,
}

fn default_recursive() -> bool {
    true
}

fn default_banned_files() -> Vec<String> {
    DEFAULT_BANNED_FILES.iter().map(|s| s.to_string()).collect()
}

fn default_album_path_separator() -> String {
    " ".to_string()
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            recursive: default_recursive(),
            banned_files: default_banned_files(),
            included_extensions: ExtensionList::default(),
            excluded_extensions: ExtensionList::default(),
            date_range: None,
            date_method: DateMethod::default(),
            filename_timezone: TimeZoneHint::default(),
            ignore_sidecar_files: false,
            album_mode: AlbumMode::default(),
            album_path_separator: default_album_path_separator(),
            import_into_album: None,
        }
    }
}

impl ImportConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: ImportConfig =
            toml::from_str(content).map_err(|e| ScanError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ScanError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject option combinations no scan can honor.
    pub fn validate(&self) -> Result<()> {
        self.album_namer()?;
        self.name_matcher()?;
        Ok(())
    }

    pub fn name_matcher(&self) -> Result<NameMatcher> {
        NameMatcher::new(&self.banned_files)
    }

    pub fn album_namer(&self) -> Result<AlbumNamer> {
        AlbumNamer::new(
            self.album_mode,
            self.album_path_separator.clone(),
            self.import_into_album.clone(),
        )
    }

    pub fn read_options(&self) -> ReadOptions {
        ReadOptions {
            filename_timezone: self.filename_timezone,
            ..ReadOptions::default()
        }
    }
}
