use super::model::{AudioItem, ItemKind};

/// Coarse file-kind classification derived from an item's name.
///
/// Used for UTI-style interoperability with embedding applications, not for
/// playback decisions.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TypeTag {
    Folder,
    Archive,
    Image,
    Video,
    Audio,
    Document,
    SourceCode,
    Data,
}

/// Classify an item by its name's extension (case-insensitive).
///
/// Folders classify as `Folder` unconditionally, whatever their name looks
/// like. Unknown or missing extensions are not an error; they classify as
/// the generic `Data` tag.
pub fn classify(item: &AudioItem) -> TypeTag {
    if item.kind == ItemKind::Folder {
        return TypeTag::Folder;
    }
    match extension_of(&item.name) {
        Some(ext) => tag_for_extension(&ext),
        None => TypeTag::Data,
    }
}

/// Lowercased final extension of `name`, if any.
fn extension_of(name: &str) -> Option<String> {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
            Some(ext.to_ascii_lowercase())
        }
        _ => None,
    }
}

pub(super) fn tag_for_extension(ext: &str) -> TypeTag {
    match ext {
        "zip" => TypeTag::Archive,

        "png" | "jpg" | "jpeg" | "jp2" | "gif" | "ai" | "bmp" | "tif" | "tiff" => TypeTag::Image,

        "avi" | "vfw" | "mpg" | "mpeg" | "mp4" | "mpg4" | "3gp" | "3gpp" | "3g2" | "3gp2"
        | "wmv" | "mov" | "qt" => TypeTag::Video,

        "mp3" | "mpg3" | "m4a" | "wav" | "wma" | "aif" | "aifc" | "aiff" => TypeTag::Audio,

        "html" | "htm" | "xml" | "rtfd" | "txt" | "rtf" | "pdf" | "doc" | "xls" | "ppt" => {
            TypeTag::Document
        }

        "c" | "m" | "cpp" | "mm" | "h" | "hpp" | "java" | "s" | "r" | "js" | "json" | "sh"
        | "pl" | "py" | "rb" | "php" => TypeTag::SourceCode,

        _ => TypeTag::Data,
    }
}

/// `ItemKind` to assign to a scanned file with this name.
pub(super) fn kind_for_name(name: &str) -> ItemKind {
    let Some(ext) = extension_of(name) else {
        return ItemKind::File;
    };
    match tag_for_extension(&ext) {
        TypeTag::Audio => ItemKind::Audio,
        TypeTag::Image => ItemKind::Image,
        TypeTag::Video => ItemKind::Video,
        TypeTag::Document => ItemKind::Document,
        _ => ItemKind::File,
    }
}

impl AudioItem {
    /// Exact Uniform Type Identifier for the item, defaulting to
    /// `public.data` for anything the table does not cover.
    pub fn uti(&self) -> &'static str {
        if self.kind == ItemKind::Folder {
            return "public.folder";
        }
        let Some(ext) = extension_of(&self.name) else {
            return "public.data";
        };
        match ext.as_str() {
            "zip" => "com.pkware.zip-archive",

            "png" => "public.png",
            "jpg" | "jpeg" => "public.jpeg",
            "jp2" => "public.jpeg-2000",
            "gif" => "com.compuserve.gif",
            "ai" => "com.adobe.illustrator.ai-image",
            "bmp" => "com.microsoft.bmp",
            "tif" | "tiff" => "public.tiff",

            "avi" | "vfw" => "public.avi",
            "mpg" | "mpeg" => "public.mpeg",
            "mp4" | "mpg4" => "public.mpeg-4",
            "3gp" | "3gpp" => "public.3gpp",
            "3g2" | "3gp2" => "public.3gpp2",
            "wmv" => "com.microsoft.windows-media-wmv",
            "mov" | "qt" => "com.apple.quicktime-movie",

            "mp3" | "mpg3" => "public.mp3",
            "m4a" => "public.mpeg-4-audio",
            "wav" => "com.microsoft.waveform-audio",
            "wma" => "com.microsoft.windows-media-wma",
            "aif" | "aifc" => "public.aifc-audio",
            "aiff" => "public.aiff-audio",

            "html" | "htm" => "public.html",
            "xml" => "public.xml",
            "rtfd" => "com.apple.rtfd",
            "txt" => "public.plain-text",
            "rtf" => "public.rtf",
            "pdf" => "com.adobe.pdf",
            "doc" => "com.microsoft.word.doc",
            "xls" => "com.microsoft.excel.xls",
            "ppt" => "com.microsoft.powerpoint.ppt",

            "c" | "m" | "cpp" | "mm" | "h" | "hpp" | "java" | "s" | "r" | "js" | "json" | "sh"
            | "pl" | "py" | "rb" | "php" => "public.source-code",

            _ => "public.data",
        }
    }
}
