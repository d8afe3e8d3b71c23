// synothumb/src/core/processor.rs
use super::{MediaFile, PreviewSpec, ProcessConfig, Result, ThumbnailSpec};
use crate::processors::{Compressor, Decoded, Loader, MetadataProcessor, Resizer, SidecarDir};
use image::DynamicImage;
use std::path::Path;

/// Renders the thumbnail family for still images and extracted video frames.
pub struct ImageProcessor<'a> {
    config: &'a ProcessConfig,
    loader: Loader,
    resizer: Resizer,
    thumbnail_compressor: Compressor,
    preview_compressor: Compressor,
    metadata_processor: MetadataProcessor,
}

impl<'a> ImageProcessor<'a> {
    pub fn new(config: &'a ProcessConfig) -> Self {
        Self {
            config,
            loader: Loader::new(),
            resizer: Resizer::default(),
            thumbnail_compressor: Compressor::new(config.thumbnail_quality),
            preview_compressor: Compressor::new(config.preview_quality),
            metadata_processor: MetadataProcessor::new(),
        }
    }

    /// Decodes `file` (plain or RAW), turns it upright and writes every
    /// rendition into its sidecar directory.
    pub fn process(&self, file: &MediaFile) -> Result<()> {
        let sidecar = SidecarDir::for_source(file.path())?;
        sidecar.ensure()?;

        let image = self.orient(self.loader.load(file)?, file.path());

        self.render(&image, &sidecar)
    }

    /// Uses the orientation the decoder reported, falling back to EXIF.
    fn orient(&self, decoded: Decoded, path: &Path) -> DynamicImage {
        match decoded.orientation {
            Some(orientation) => {
                log::debug!("Applying {:?} from RAW container to {}", orientation, path.display());
                orientation.apply(decoded.image)
            }
            None => self.metadata_processor.auto_orient(decoded.image, path),
        }
    }

    /// Renders from an already extracted still, such as a video frame.
    pub fn process_still(&self, still: &Path, sidecar: &SidecarDir) -> Result<()> {
        let image = self.loader.load_plain(still)?;
        self.render(&image, sidecar)
    }

    /// Writes the non-marker standard sizes, then the preview, then the
    /// marker. The marker is only written once everything else succeeded.
    pub fn render(&self, base: &DynamicImage, sidecar: &SidecarDir) -> Result<()> {
        let marker = self.config.marker();
        let mut first_error = None;

        for spec in self.config.thumbnails.iter().skip(1) {
            if let Err(e) = self.render_standard(base, spec, sidecar) {
                log::warn!("Failed to write {}: {}", sidecar.join(spec.name).display(), e);
                first_error.get_or_insert(e);
            }
        }

        if let Err(e) = self.render_preview(base, &self.config.preview, sidecar) {
            log::warn!(
                "Failed to write {}: {}",
                sidecar.join(self.config.preview.name).display(),
                e
            );
            first_error.get_or_insert(e);
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        self.render_standard(base, marker, sidecar)
    }

    fn render_standard(
        &self,
        base: &DynamicImage,
        spec: &ThumbnailSpec,
        sidecar: &SidecarDir,
    ) -> Result<()> {
        let thumbnail = self.resizer.fit_within(base, spec.width, spec.height);
        self.thumbnail_compressor
            .save_jpeg(&thumbnail, &sidecar.join(spec.name))
    }

    fn render_preview(
        &self,
        base: &DynamicImage,
        preview: &PreviewSpec,
        sidecar: &SidecarDir,
    ) -> Result<()> {
        let canvas = DynamicImage::ImageRgb8(self.resizer.letterbox(base, preview));
        self.preview_compressor
            .save_jpeg(&canvas, &sidecar.join(preview.name))
    }
}
