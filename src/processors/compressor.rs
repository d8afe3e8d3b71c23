// synothumb/src/processors/compressor.rs
use crate::core::{Result, ThumbError};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::io::Cursor;
use std::path::{Path, PathBuf};

pub struct Compressor {
    quality: u8,
}

impl Compressor {
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn encode_jpeg(&self, image: &DynamicImage) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        let encoder = JpegEncoder::new_with_quality(&mut buffer, self.quality);

        match image {
            DynamicImage::ImageRgb8(_) => image.write_with_encoder(encoder)?,
            other => DynamicImage::ImageRgb8(other.to_rgb8()).write_with_encoder(encoder)?,
        }

        Ok(buffer.into_inner())
    }

    /// Encodes and writes `image`. The bytes land in a sibling `.tmp` file
    /// first and are renamed into place, so `path` is either absent or whole.
    pub fn save_jpeg(&self, image: &DynamicImage, path: &Path) -> Result<()> {
        log::debug!(
            "Saving {} with quality {}",
            path.display(),
            self.quality
        );

        let data = self.encode_jpeg(image)?;
        write_atomic(path, &data)?;

        log::debug!("Saved image: {} ({} bytes)", path.display(), data.len());
        Ok(())
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let staging = staging_path(path);
    std::fs::write(&staging, data).map_err(|e| ThumbError::fs(&staging, e))?;

    if let Err(e) = std::fs::rename(&staging, path) {
        let _ = std::fs::remove_file(&staging);
        return Err(ThumbError::fs(path, e));
    }

    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
