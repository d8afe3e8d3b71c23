// synothumb/src/core/thumbnails.rs
use image::Rgb;

/// One standard rendition: fit within `width` x `height`, keep aspect ratio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailSpec {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
}

/// The padded square rendition. Output is always exactly `width` x `height`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSpec {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
    pub padding: Rgb<u8>,
}

/// The first entry doubles as the completion marker checked before processing.
pub const STANDARD_THUMBNAILS: &[ThumbnailSpec] = &[
    ThumbnailSpec { name: "SYNOPHOTO_THUMB_XL.jpg", width: 1280, height: 1280 },
    ThumbnailSpec { name: "SYNOPHOTO_THUMB_L.jpg", width: 800, height: 800 },
    ThumbnailSpec { name: "SYNOPHOTO_THUMB_B.jpg", width: 640, height: 640 },
    ThumbnailSpec { name: "SYNOPHOTO_THUMB_M.jpg", width: 320, height: 320 },
    ThumbnailSpec { name: "SYNOPHOTO_THUMB_S.jpg", width: 160, height: 160 },
];

pub const PREVIEW_THUMBNAIL: PreviewSpec = PreviewSpec {
    name: "SYNOPHOTO_THUMB_PREVIEW.jpg",
    width: 120,
    height: 120,
    padding: Rgb([0, 0, 0]),
};

pub const FILMSTRIP_NAME: &str = "SYNOPHOTO:FILM.flv";
