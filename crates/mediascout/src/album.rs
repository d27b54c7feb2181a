//! Album titles derived from asset paths

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};
use crate::tree::{split_path, ROOT};
use crate::types::Album;

/// How assets are assigned to albums
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlbumMode {
    /// No album
    #[default]
    None,
    /// Name of the parent folder
    Folder,
    /// Tree name followed by every folder of the path
    Path,
}

#[derive(Debug, Clone)]
pub struct AlbumNamer {
    mode: AlbumMode,
    separator: String,
    into_album: Option<String>,
}

impl AlbumNamer {
    /// A fixed album cannot be combined with a path-derived mode.
    pub fn new(
        mode: AlbumMode,
        separator: impl Into<String>,
        into_album: Option<String>,
    ) -> Result<Self> {
        let into_album = into_album.filter(|a| !a.is_empty());
        if into_album.is_some() && mode != AlbumMode::None {
            return Err(ScanError::Config(
                "cannot import into a fixed album and derive albums from folders".to_string(),
            ));
        }
        Ok(Self {
            mode,
            separator: separator.into(),
            into_album,
        })
    }

    pub fn mode(&self) -> AlbumMode {
        self.mode
    }

    pub fn albums_for(&self, tree_name: &str, asset_path: &str) -> Vec<Album> {
        let album = |title: String| Album {
            title,
            path: asset_path.to_string(),
        };

        if let Some(title) = &self.into_album {
            return vec![album(title.clone())];
        }

        let (dir, _) = split_path(asset_path);
        match self.mode {
            AlbumMode::None => Vec::new(),
            AlbumMode::Folder => {
                let title = if dir == ROOT {
                    tree_name
                } else {
                    split_path(dir).1
                };
                if title.is_empty() {
                    Vec::new()
                } else {
                    vec![album(title.to_string())]
                }
            }
            AlbumMode::Path => {
                let mut parts = vec![tree_name];
                if dir != ROOT {
                    parts.extend(dir.split('/'));
                }
                parts.retain(|p| !p.is_empty());
                vec![album(parts.join(&self.separator))]
            }
        }
    }
}
