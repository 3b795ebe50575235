use std::path::Path;

use lofty::prelude::*;
use lofty::tag::ItemKey;
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::classify::{classify, kind_for_name};
use super::model::{AudioItem, ItemKind};
use super::TypeTag;

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Build a leaf item for a scanned file, reading artist/album tags for
/// audio files.
fn file_item(name: String, path: &Path) -> AudioItem {
    let kind = kind_for_name(&name);
    let mut item = AudioItem::file(name, kind, path.to_path_buf());

    if kind == ItemKind::Audio {
        if let Ok(tagged) = lofty::read_from_path(path) {
            if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                if let Some(v) = tag.get_string(&ItemKey::TrackArtist) {
                    let v = v.trim();
                    if !v.is_empty() {
                        item.artist = Some(v.to_string());
                    }
                }
                if let Some(v) = tag.get_string(&ItemKey::AlbumTitle) {
                    let v = v.trim();
                    if !v.is_empty() {
                        item.album = Some(v.to_string());
                    }
                }
            }
        }
    }

    item
}

/// Scan `dir` into an item tree rooted at a folder item.
///
/// Entries are visited in stable name order. A missing or unreadable
/// directory produces an empty root folder, never an error.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> AudioItem {
    let root_name = dir
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("library")
        .to_string();

    let mut walker = WalkDir::new(dir)
        .follow_links(settings.follow_links)
        .sort_by_file_name();

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    // Folders currently being assembled; index equals walkdir depth.
    let mut stack: Vec<AudioItem> = Vec::new();

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        // Entries arrive depth-first, so anything deeper than the current
        // entry is complete and can be folded into its parent.
        while stack.len() > entry.depth() {
            let done = stack.pop().expect("stack checked non-empty");
            match stack.last_mut() {
                Some(parent) => parent.children.push(done),
                None => return done,
            }
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type().is_dir() {
            stack.push(AudioItem::folder(name, entry.path().to_path_buf(), Vec::new()));
        } else {
            let item = file_item(name, entry.path());
            match stack.last_mut() {
                // Scanning a plain file path yields that single item.
                None => return item,
                Some(parent) => parent.children.push(item),
            }
        }
    }

    let mut root = match stack.pop() {
        Some(folder) => folder,
        None => return AudioItem::folder(root_name, dir.to_path_buf(), Vec::new()),
    };
    while let Some(mut parent) = stack.pop() {
        parent.children.push(root);
        root = parent;
    }
    root
}

/// Depth-first flattening of an item tree, keeping the non-folder items
/// whose classification matches `tag`.
///
/// This is the data source used to lazily populate an empty playlist.
pub fn flatten_items(root: &AudioItem, tag: TypeTag) -> Vec<AudioItem> {
    fn walk(item: &AudioItem, tag: TypeTag, out: &mut Vec<AudioItem>) {
        if item.kind == ItemKind::Folder {
            for child in &item.children {
                walk(child, tag, out);
            }
        } else if classify(item) == tag {
            out.push(item.clone());
        }
    }

    let mut out = Vec::new();
    walk(root, tag, &mut out);
    out
}
