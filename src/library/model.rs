use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Structural kind of an item, assigned when the item is constructed.
///
/// Only `Folder` is structurally special: folder items carry `children`.
/// The remaining kinds are display hints and do not affect playback.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    File,
    Folder,
    Document,
    Image,
    Video,
    Audio,
}

/// One entry in a playlist or item tree.
///
/// Items are built by the caller (scanner or embedding application) and not
/// mutated afterwards, except for the optional display metadata. A non-folder
/// item with an empty `path` is valid but cannot be played; the player treats
/// it as a no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioItem {
    /// Display name, typically including a file extension.
    pub name: String,
    pub kind: ItemKind,
    pub path: PathBuf,
    /// Ordered children; only meaningful when `kind` is `Folder`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<AudioItem>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
}

impl AudioItem {
    /// Create a leaf item.
    pub fn file(name: impl Into<String>, kind: ItemKind, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            kind,
            path: path.into(),
            children: Vec::new(),
            artist: None,
            album: None,
        }
    }

    /// Create a folder item holding `children`.
    pub fn folder(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        children: Vec<AudioItem>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: ItemKind::Folder,
            path: path.into(),
            children,
            artist: None,
            album: None,
        }
    }

    /// `name` with its final extension stripped; names without an extension
    /// come back unchanged.
    pub fn display_title(&self) -> &str {
        match self.name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.name,
        }
    }
}
