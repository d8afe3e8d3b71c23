// synothumb/src/core/media.rs
use std::path::{Path, PathBuf};

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tif", "tiff"];

pub const RAW_EXTENSIONS: &[&str] = &[
    "arw", "cr2", "cr3", "crw", "dng", "erf", "nef", "nrw", "orf", "pef", "raf", "raw", "rw2",
    "sr2", "srf", "x3f",
];

pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mov", "m4v", "mp4", "avi", "mkv", "mpg", "mpeg", "wmv", "3gp", "flv",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaCategory {
    Image,
    RawImage,
    Video,
    Ignored,
}

impl MediaCategory {
    pub fn is_media(self) -> bool {
        self != MediaCategory::Ignored
    }

    pub fn label(self) -> &'static str {
        match self {
            MediaCategory::Image => "image",
            MediaCategory::RawImage => "raw image",
            MediaCategory::Video => "video",
            MediaCategory::Ignored => "ignored",
        }
    }
}

/// Classifies a path by its extension alone. Matching is case-insensitive and
/// never touches the filesystem.
pub fn classify(path: &Path) -> MediaCategory {
    let Some(ext) = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
    else {
        return MediaCategory::Ignored;
    };

    let ext = ext.as_str();
    if IMAGE_EXTENSIONS.contains(&ext) {
        MediaCategory::Image
    } else if RAW_EXTENSIONS.contains(&ext) {
        MediaCategory::RawImage
    } else if VIDEO_EXTENSIONS.contains(&ext) {
        MediaCategory::Video
    } else {
        MediaCategory::Ignored
    }
}

/// A source file picked up by discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    path: PathBuf,
    category: MediaCategory,
}

impl MediaFile {
    pub fn new(path: PathBuf, category: MediaCategory) -> Self {
        Self { path, category }
    }

    /// Classifies `path`, returning `None` for anything ignored.
    pub fn from_path(path: PathBuf) -> Option<Self> {
        let category = classify(&path);
        category.is_media().then(|| Self { path, category })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn category(&self) -> MediaCategory {
        self.category
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}
