// synothumb/src/processors/metadata.rs
use exif::{Exif, In, Reader, Tag};
use image::DynamicImage;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// EXIF orientation, named by the transform that makes the raster upright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Normal,
    MirroredHorizontal,
    Rotate180,
    MirroredVertical,
    MirroredHorizontalAnd270CW,
    Rotate90CW,
    MirroredHorizontalAnd90CW,
    Rotate270CW,
}

impl Orientation {
    pub fn apply(self, image: DynamicImage) -> DynamicImage {
        match self {
            Orientation::Normal => image,
            Orientation::MirroredHorizontal => image.fliph(),
            Orientation::Rotate180 => image.rotate180(),
            Orientation::MirroredVertical => image.flipv(),
            Orientation::MirroredHorizontalAnd270CW => image.fliph().rotate270(),
            Orientation::Rotate90CW => image.rotate90(),
            Orientation::MirroredHorizontalAnd90CW => image.fliph().rotate90(),
            Orientation::Rotate270CW => image.rotate270(),
        }
    }
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            2 => Orientation::MirroredHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::MirroredVertical,
            5 => Orientation::MirroredHorizontalAnd270CW,
            6 => Orientation::Rotate90CW,
            7 => Orientation::MirroredHorizontalAnd90CW,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

pub struct MetadataProcessor;

impl MetadataProcessor {
    pub fn new() -> Self {
        Self
    }

    pub fn read_metadata(&self, path: &Path) -> Option<Exif> {
        let file = File::open(path).ok()?;
        let mut bufreader = BufReader::new(&file);

        match Reader::new().read_from_container(&mut bufreader) {
            Ok(exif) => {
                log::debug!("Found EXIF data in {}", path.display());
                Some(exif)
            }
            Err(exif::Error::NotFound(_)) => {
                log::debug!("No EXIF data found in {}", path.display());
                None
            }
            Err(e) => {
                log::debug!("Failed to read EXIF from {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Orientation recorded in the source file. Missing or unreadable
    /// metadata counts as upright.
    pub fn orientation(&self, path: &Path) -> Orientation {
        self.read_metadata(path)
            .and_then(|exif| {
                exif.get_field(Tag::Orientation, In::PRIMARY)
                    .and_then(|field| field.value.get_uint(0))
            })
            .map(Orientation::from)
            .unwrap_or_default()
    }

    pub fn auto_orient(&self, image: DynamicImage, path: &Path) -> DynamicImage {
        let orientation = self.orientation(path);
        if orientation != Orientation::Normal {
            log::debug!("Applying {:?} to {}", orientation, path.display());
        }
        orientation.apply(image)
    }
}

impl Default for MetadataProcessor {
    fn default() -> Self {
        Self::new()
    }
}
