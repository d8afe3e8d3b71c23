// synothumb/src/processors/loader.rs
use crate::core::{MediaCategory, MediaFile, Result, ThumbError};
use crate::processors::metadata::Orientation;
use crate::processors::raw::RawDeveloper;
use image::{DynamicImage, ImageReader};
use std::path::Path;

/// A decoded raster plus the orientation its decoder found, if any.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub image: DynamicImage,
    pub orientation: Option<Orientation>,
}

/// Turns a source file into an 8-bit RGB raster.
#[derive(Clone, Default)]
pub struct Loader {
    raw: RawDeveloper,
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self, file: &MediaFile) -> Result<Decoded> {
        match file.category() {
            MediaCategory::RawImage => self.raw.develop(file.path()),
            _ => Ok(Decoded {
                image: self.load_plain(file.path())?,
                orientation: None,
            }),
        }
    }

    pub fn load_plain(&self, path: &Path) -> Result<DynamicImage> {
        log::debug!("Loading image from: {}", path.display());

        let decode_error = |source| ThumbError::Decode {
            path: path.to_path_buf(),
            source,
        };

        let image = ImageReader::open(path)
            .map_err(|e| ThumbError::fs(path, e))?
            .with_guessed_format()
            .map_err(|e| ThumbError::fs(path, e))?
            .decode()
            .map_err(decode_error)?;

        log::debug!(
            "Loaded image: {}x{} pixels, format: {:?}",
            image.width(),
            image.height(),
            image.color()
        );

        Ok(into_rgb(image))
    }
}

pub fn into_rgb(image: DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageRgb8(_) => image,
        other => DynamicImage::ImageRgb8(other.into_rgb8()),
    }
}
