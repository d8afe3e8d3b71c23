// synothumb/src/processors/discover.rs
use crate::core::{MediaFile, Result, ThumbError};
use crate::processors::sidecar::{is_inside_sidecar, SIDECAR_DIR_NAME};
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Every media file under `root`, sorted by path. Sidecar directories are
/// pruned from the walk so generated thumbnails are never picked up as
/// sources.
pub fn discover(root: &Path) -> Result<Vec<MediaFile>> {
    let root = root.canonicalize().map_err(|e| ThumbError::fs(root, e))?;
    if is_inside_sidecar(&root) {
        log::warn!(
            "{} is inside a {} directory, nothing to scan",
            root.display(),
            SIDECAR_DIR_NAME
        );
        return Ok(Vec::new());
    }
    log::info!("Scanning {}", root.display());

    let files: Vec<MediaFile> = WalkDir::new(&root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_sidecar_dir(entry))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| MediaFile::from_path(entry.into_path()))
        .collect();

    log::info!("Found {} media files", files.len());
    Ok(files)
}

fn is_sidecar_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry.file_name() == SIDECAR_DIR_NAME
}
